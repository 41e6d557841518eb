//! Home page.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::models::{Category, Product};
use crate::state::AppState;

/// Featured products shown on the home page.
const FEATURED_LIMIT: i64 = 8;

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub categories: Vec<Category>,
    pub featured: Vec<Product>,
}

/// All categories and the newest featured products.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeView>> {
    let categories = state.categories().list().await?;
    let featured = state.products().featured(FEATURED_LIMIT).await?;
    Ok(Json(HomeView {
        categories,
        featured,
    }))
}
