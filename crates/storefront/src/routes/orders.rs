//! Shopper order pages.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use fashion_store_core::OrderId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Order};
use crate::state::{AppState, Stores};

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: CurrentUser,
    pub orders: Vec<Order>,
}

/// Order confirmation, for the shopper who placed it.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>> {
    let stores = Stores::new(&state);
    let order = stores.ledger().order_for_owner(&user, order_id).await?;
    Ok(Json(order))
}

/// The caller's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ProfileView>> {
    let orders = state.orders().list_for_user(user.id).await?;
    Ok(Json(ProfileView { user, orders }))
}
