//! HTTP route handlers for the storefront.
//!
//! Handlers answer with JSON. Forms are `application/x-www-form-urlencoded`,
//! except image uploads, which are multipart.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Categories and featured products
//!
//! # Catalog
//! GET  /products               - Listing (category, search, min_price, max_price, size, color)
//! GET  /products/{id}          - Detail with related products
//!
//! # Auth
//! POST /auth/register          - Create a shopper account
//! POST /auth/login             - Login by username or email
//! POST /auth/logout            - Logout
//!
//! # Cart and checkout
//! GET  /cart                   - Cart with subtotal
//! POST /cart/add               - Add product_id, size, quantity
//! POST /cart/remove/{index}    - Remove one line
//! GET  /checkout               - Checkout summary (requires auth)
//! POST /checkout               - Place the order (requires auth)
//!
//! # Account (requires auth)
//! GET  /orders/{id}            - Order confirmation (owner only)
//! GET  /profile                - The caller's orders
//!
//! # Back-office (requires admin), see [`admin`]
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove/{index}", post(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout_page).post(cart::checkout))
        .route("/orders/{id}", get(orders::show))
        .route("/profile", get(orders::profile))
        .nest("/auth", auth_routes())
        .nest("/admin", admin::routes())
}
