//! Core types for the Fashion Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod size;
pub mod status;
pub mod stock;
pub mod time;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, format_inr};
pub use size::{ParseSizeError, Size};
pub use status::*;
pub use stock::{StockAdjustError, StockLevels, StockOperation};
pub use time::{format_ist, format_order_date};
