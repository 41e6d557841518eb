//! Back-office products, images, stock, and categories.

use axum::{
    Form, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use fashion_store_core::{CategoryId, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, Product, ProductFilter, ProductImage};
use crate::services::catalog::{self, CatalogError, ProductForm};
use crate::services::stock::AdjustRequest;
use crate::state::{AppState, Stores};

/// Multipart field carrying product images.
const IMAGE_FIELD: &str = "images";

#[derive(Debug, Serialize)]
pub struct ProductsView {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Stock form data. Parsed by the adjuster, not here.
#[derive(Debug, Deserialize)]
pub struct StockForm {
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct StockLevelView {
    pub product_id: ProductId,
    pub size: String,
    pub level: i64,
}

/// Category form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[instrument(skip(state, _admin))]
pub async fn list_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ProductsView>> {
    Ok(Json(ProductsView {
        products: state.products().list(&ProductFilter::default()).await?,
        categories: state.categories().list().await?,
    }))
}

#[instrument(skip(state, _admin, form))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let draft = form.into_draft()?;
    let product = state.products().create(&draft, &[]).await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)).into_response())
}

/// Replace a product's editable fields. Images are kept.
#[instrument(skip(state, _admin, form))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Json<Product>> {
    let draft = form.into_draft()?;
    let product = state.products().update(id, &draft).await?;
    tracing::info!(product_id = %product.id, "product updated");
    Ok(Json(product))
}

/// Delete a product, then its image files.
#[instrument(skip(state, _admin))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let product = state
        .products()
        .delete(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    catalog::remove_image_files(&product.images).await;
    tracing::info!(product_id = %id, images = product.images.len(), "product deleted");
    Ok(Json(json!({ "message": "Product deleted successfully!" })))
}

/// Store uploaded images and attach them to the product.
///
/// Files without a name or with a disallowed extension are skipped.
#[instrument(skip(state, _admin, multipart))]
pub async fn upload_images(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Json<Product>> {
    let products = state.products();
    if products.get(id).await?.is_none() {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    let uploads = &state.config().uploads;
    let mut stored: Vec<ProductImage> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart request: {e}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(original) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if original.is_empty() {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?;

        match catalog::save_image(uploads, &original, &bytes).await {
            Ok(image) => stored.push(image),
            Err(CatalogError::UnsupportedFile(name)) => {
                tracing::info!(filename = %name, "skipping upload with disallowed extension");
            }
            Err(e) => {
                catalog::remove_image_files(&stored).await;
                return Err(e.into());
            }
        }
    }

    let product = if stored.is_empty() {
        products.get(id).await?
    } else {
        Some(products.append_images(id, &stored).await?)
    }
    .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}

/// Guarded `set`, `inc`, or `dec` of one size counter.
#[instrument(skip(state, admin, form))]
pub async fn adjust_stock(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<StockForm>,
) -> Result<Json<StockLevelView>> {
    let stores = Stores::new(&state);
    let level = stores
        .adjuster()
        .adjust(
            &admin,
            id,
            AdjustRequest {
                size: &form.size,
                action: &form.action,
                value: &form.value,
            },
        )
        .await?;

    Ok(Json(StockLevelView {
        product_id: id,
        size: form.size,
        level,
    }))
}

#[instrument(skip(state, _admin))]
pub async fn list_categories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.categories().list().await?))
}

#[instrument(skip(state, _admin, form))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Category name is required".to_string()));
    }
    let category = state
        .categories()
        .create(name, form.description.trim())
        .await?;
    tracing::info!(category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)).into_response())
}

/// Delete a category, refused while any product uses it.
#[instrument(skip(state, _admin))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<serde_json::Value>> {
    catalog::delete_category(&state.categories(), id).await?;
    Ok(Json(json!({ "message": "Category deleted successfully!" })))
}
