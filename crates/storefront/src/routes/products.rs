//! Catalog listing and product detail.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fashion_store_core::{CategoryId, ProductId, Size};

use crate::error::{AppError, Result};
use crate::models::{Category, Product, ProductFilter};
use crate::state::AppState;

/// Related products shown under a product.
const RELATED_LIMIT: i64 = 4;

/// Listing query string. Values arrive as text so that blank or malformed
/// parameters drop out of the filter instead of failing the request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl From<ProductQuery> for ProductFilter {
    fn from(query: ProductQuery) -> Self {
        Self {
            category: non_blank(query.category)
                .and_then(|v| v.parse().ok())
                .map(CategoryId::new),
            search: non_blank(query.search),
            min_price: non_blank(query.min_price).and_then(|v| v.parse::<Decimal>().ok()),
            max_price: non_blank(query.max_price).and_then(|v| v.parse::<Decimal>().ok()),
            size: non_blank(query.size).and_then(|v| v.parse::<Size>().ok()),
            color: non_blank(query.color),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductListView {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailView {
    pub product: Product,
    pub sizes_in_stock: Vec<Size>,
    pub related: Vec<Product>,
}

/// Filtered product listing, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListView>> {
    let filter = ProductFilter::from(query);
    let products = state.products().list(&filter).await?;
    let categories = state.categories().list().await?;
    Ok(Json(ProductListView {
        products,
        categories,
    }))
}

/// One product and a few others from its category.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetailView>> {
    let products = state.products();
    let product = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let related = products.related(&product, RELATED_LIMIT).await?;
    Ok(Json(ProductDetailView {
        sizes_in_stock: product.sizes_in_stock().collect(),
        product,
        related,
    }))
}
