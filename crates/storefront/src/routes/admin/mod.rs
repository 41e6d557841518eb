//! Back-office routes under `/admin`.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin), so a
//! non-admin never reaches one. The ledger and stock services check the role
//! again before writing.

pub mod catalog;
pub mod dashboard;
pub mod orders;
pub mod profile;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the back-office router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/profile", get(profile::show).post(profile::update))
        .route("/products", get(catalog::list_products).post(catalog::create_product))
        .route("/products/{id}", post(catalog::update_product))
        .route("/products/{id}/delete", post(catalog::delete_product))
        .route("/products/{id}/images", post(catalog::upload_images))
        .route("/products/{id}/stock", post(catalog::adjust_stock))
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/categories/{id}/delete", post(catalog::delete_category))
        .route("/users", get(dashboard::users))
}
