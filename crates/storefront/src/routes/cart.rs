//! Cart and checkout.
//!
//! The cart lives in the session. Checkout hands it to the order ledger, which
//! empties it once the order is stored.

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use fashion_store_core::{ProductId, Size};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::ShippingAddress;
use crate::services::cart::{PricedCart, SessionCart, price_entries};
use crate::services::ledger::{Checkout, LedgerError};
use crate::state::{AppState, Stores};

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub size: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: PricedCart,
    pub item_count: u32,
}

async fn cart_view(state: &AppState, cart: &SessionCart) -> Result<CartView> {
    let cart = cart.load().await?;
    let priced = price_entries(&state.products(), cart.entries()).await?;
    Ok(CartView {
        item_count: cart.item_count(),
        cart: priced,
    })
}

/// The cart priced at current catalog prices.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = SessionCart::new(session);
    Ok(Json(cart_view(&state, &cart).await?))
}

/// Add a product and size to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Json<CartView>> {
    let size: Size = form
        .size
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid size".to_string()))?;
    if form.quantity == 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }

    let cart = SessionCart::new(session);
    cart.add(form.product_id, size, form.quantity).await?;
    tracing::debug!(product_id = %form.product_id, %size, quantity = form.quantity, "added to cart");

    Ok(Json(cart_view(&state, &cart).await?))
}

/// Remove the cart line at `index`.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(index): Path<usize>,
) -> Result<Json<CartView>> {
    let cart = SessionCart::new(session);
    cart.remove(index).await?;
    Ok(Json(cart_view(&state, &cart).await?))
}

/// Checkout summary. Requires a signed-in user and a non-empty cart.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn checkout_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Json<CartView>> {
    let cart = SessionCart::new(session);
    let view = cart_view(&state, &cart).await?;
    if view.cart.lines.is_empty() {
        return Err(LedgerError::EmptyCart.into());
    }
    Ok(Json(view))
}

/// Place the order for everything in the cart.
///
/// The total is the cart subtotal at current prices.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = SessionCart::new(session);
    let entries = cart.load().await?.into_entries();
    let priced = price_entries(&state.products(), &entries).await?;

    let checkout = Checkout {
        shipping_address: ShippingAddress {
            name: form.name,
            address: form.address,
            city: form.city,
            postal_code: form.postal_code,
            phone: form.phone,
        },
        payment_method: form.payment_method,
        total_amount: priced.subtotal,
    };

    let stores = Stores::new(&state);
    let order_id = stores
        .ledger()
        .place_order(&user, &mut cart, checkout)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully!",
            "order_id": order_id,
            "confirmation_url": format!("/orders/{order_id}"),
        })),
    )
        .into_response())
}
