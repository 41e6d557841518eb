//! Dashboard and customer list.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use fashion_store_core::UserRole;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Order, User};
use crate::state::AppState;

/// Orders listed on the dashboard.
const RECENT_ORDERS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_users: i64,
    pub recent_orders: Vec<Order>,
}

/// Store totals and the latest orders.
#[instrument(skip(state, _admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<DashboardView>> {
    let orders = state.orders();
    Ok(Json(DashboardView {
        total_products: state.products().count().await?,
        total_orders: orders.count().await?,
        total_users: state.users().count_by_role(UserRole::User).await?,
        recent_orders: orders.recent(Some(RECENT_ORDERS)).await?,
    }))
}

/// Shopper accounts, newest first.
#[instrument(skip(state, _admin))]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users().list_by_role(UserRole::User).await?))
}
