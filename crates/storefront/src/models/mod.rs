//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartEntry};
pub use category::Category;
pub use order::{NewOrder, Order, ShippingAddress};
pub use product::{Product, ProductDraft, ProductFilter, ProductImage};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
