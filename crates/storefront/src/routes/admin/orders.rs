//! Back-office order management.

use axum::{
    Form, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use fashion_store_core::{OrderId, OrderStatus};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Order;
use crate::state::{AppState, Stores};

/// Status form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Every order, newest first.
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().recent(None).await?))
}

#[instrument(skip(state, admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>> {
    let stores = Stores::new(&state);
    Ok(Json(stores.ledger().order_for_admin(&admin, order_id).await?))
}

/// Set an order's status and email its owner.
///
/// The posted string is stored untouched.
#[instrument(skip(state, admin, form))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Json<Order>> {
    let stores = Stores::new(&state);
    let order = stores
        .ledger()
        .update_status(&admin, order_id, OrderStatus::new(form.status))
        .await?;
    Ok(Json(order))
}
