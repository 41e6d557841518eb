//! Back-office catalog maintenance: product forms, image files, categories.

use std::io::ErrorKind;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use fashion_store_core::{CategoryId, Price, Size, StockLevels};

use crate::config::UploadConfig;
use crate::db::{CategoryStore, RepositoryError};
use crate::models::{ProductDraft, ProductImage, product::parse_colors};

/// Errors from catalog maintenance.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A category still has products filed under it. Nothing was deleted.
    #[error("category is used by {products} product(s)")]
    CategoryInUse { products: i64 },

    #[error("not found")]
    NotFound,

    /// A product form field did not parse.
    #[error("{0}")]
    InvalidForm(String),

    /// Upload with a missing or disallowed extension.
    #[error("file type not allowed: {0}")]
    UnsupportedFile(String),

    #[error("upload too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// The product form as posted by the back-office.
///
/// Every field arrives as text; [`ProductForm::into_draft`] does the parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    /// Empty for an uncategorized product.
    pub category_id: String,
    /// Comma-separated color tags.
    pub colors: String,
    #[serde(rename = "stock_S")]
    pub stock_s: String,
    #[serde(rename = "stock_M")]
    pub stock_m: String,
    #[serde(rename = "stock_L")]
    pub stock_l: String,
    #[serde(rename = "stock_XL")]
    pub stock_xl: String,
    /// Checkbox value; `"on"` when ticked.
    pub featured: Option<String>,
}

impl ProductForm {
    /// Validate and convert into a draft. Blank stock fields count as zero.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidForm` naming the first bad field.
    pub fn into_draft(self) -> Result<ProductDraft, CatalogError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(CatalogError::InvalidForm("Product name is required".into()));
        }

        let price: Decimal = self
            .price
            .trim()
            .parse()
            .map_err(|_| CatalogError::InvalidForm("Invalid price".into()))?;
        let price = Price::new(price);
        if price.is_negative() {
            return Err(CatalogError::InvalidForm("Price cannot be negative".into()));
        }

        let category_id = match self.category_id.trim() {
            "" => None,
            raw => Some(CategoryId::new(raw.parse().map_err(|_| {
                CatalogError::InvalidForm("Invalid category".into())
            })?)),
        };

        let mut stock = StockLevels::new();
        for (size, raw) in [
            (Size::S, &self.stock_s),
            (Size::M, &self.stock_m),
            (Size::L, &self.stock_l),
            (Size::XL, &self.stock_xl),
        ] {
            stock.set(size, parse_stock_field(size, raw)?);
        }

        Ok(ProductDraft {
            name,
            description: self.description.trim().to_owned(),
            price,
            category_id,
            colors: parse_colors(&self.colors),
            stock,
            featured: self.featured.as_deref() == Some("on"),
        })
    }
}

fn parse_stock_field(size: Size, raw: &str) -> Result<i64, CatalogError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    match raw.parse::<i64>() {
        Ok(level) if level >= 0 => Ok(level),
        _ => Err(CatalogError::InvalidForm(format!("Invalid stock for size {size}"))),
    }
}

/// Reduce an uploaded file name to a safe single path component.
///
/// Path separators become spaces, anything outside `[A-Za-z0-9._-]` is
/// dropped, runs of whitespace collapse to `_`, and leading or trailing `.`
/// and `_` are stripped. The result may be empty.
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_owned()
}

/// Stored name for an upload: `%Y%m%d_%H%M%S_` followed by the sanitized name.
#[must_use]
pub fn stored_filename(original: &str, at: DateTime<Utc>) -> Option<String> {
    let clean = sanitize_filename(original);
    if clean.is_empty() {
        return None;
    }
    Some(format!("{}_{clean}", at.format("%Y%m%d_%H%M%S")))
}

/// Write one uploaded image into the upload folder, unmodified.
///
/// # Errors
///
/// - `CatalogError::UnsupportedFile` for a disallowed extension or a name
///   that sanitizes to nothing.
/// - `CatalogError::TooLarge` above the configured limit.
/// - `CatalogError::Io` if the file cannot be written.
pub async fn save_image(
    uploads: &UploadConfig,
    original_name: &str,
    bytes: &[u8],
) -> Result<ProductImage, CatalogError> {
    if !uploads.is_allowed(original_name) {
        return Err(CatalogError::UnsupportedFile(original_name.to_owned()));
    }
    if bytes.len() > uploads.max_content_length {
        return Err(CatalogError::TooLarge {
            size: bytes.len(),
            limit: uploads.max_content_length,
        });
    }
    let filename = stored_filename(original_name, Utc::now())
        .ok_or_else(|| CatalogError::UnsupportedFile(original_name.to_owned()))?;

    tokio::fs::create_dir_all(&uploads.folder).await?;
    let image = ProductImage::stored_in(&uploads.folder, &filename);
    tokio::fs::write(&image.local_path, bytes).await?;

    tracing::info!(filename = %image.filename, size = bytes.len(), "product image stored");
    Ok(image)
}

/// Delete the files behind `images`. Failures are logged and skipped.
pub async fn remove_image_files(images: &[ProductImage]) {
    for image in images {
        match tokio::fs::remove_file(&image.local_path).await {
            Ok(()) => tracing::debug!(path = %image.local_path, "product image removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %image.local_path, error = %e, "failed to remove product image"),
        }
    }
}

/// Delete a category that no product references.
///
/// # Errors
///
/// - `CatalogError::CategoryInUse` while any product is filed under it.
/// - `CatalogError::NotFound` if the category does not exist.
#[tracing::instrument(skip(categories))]
pub async fn delete_category(
    categories: &dyn CategoryStore,
    id: CategoryId,
) -> Result<(), CatalogError> {
    let products = categories.count_products(id).await?;
    if products > 0 {
        tracing::info!(products, "category delete rejected, still referenced");
        return Err(CatalogError::CategoryInUse { products });
    }

    match categories.delete_unreferenced(id).await {
        Ok(()) => {
            tracing::info!("category deleted");
            Ok(())
        }
        // A product was filed under it between the count and the delete.
        Err(RepositoryError::Conflict(_)) => Err(CatalogError::CategoryInUse {
            products: categories.count_products(id).await?.max(1),
        }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::memory::MemoryStore;

    fn form() -> ProductForm {
        ProductForm {
            name: "  Linen Kurta ".into(),
            description: "Breathable".into(),
            price: "1499.00".into(),
            category_id: "3".into(),
            colors: "white, indigo".into(),
            stock_s: "4".into(),
            stock_m: String::new(),
            stock_l: "2".into(),
            stock_xl: "0".into(),
            featured: Some("on".into()),
        }
    }

    #[test]
    fn test_form_into_draft() {
        let draft = form().into_draft().unwrap();
        assert_eq!(draft.name, "Linen Kurta");
        assert_eq!(draft.price, "1499".parse::<Price>().unwrap());
        assert_eq!(draft.category_id, Some(CategoryId::new(3)));
        assert_eq!(draft.colors, vec!["white", "indigo"]);
        assert_eq!(draft.stock.get(Size::S), Some(4));
        assert_eq!(draft.stock.get(Size::M), Some(0));
        assert!(draft.featured);
    }

    #[test]
    fn test_form_rejects_bad_fields() {
        let bad_price = ProductForm {
            price: "cheap".into(),
            ..form()
        };
        assert!(matches!(bad_price.into_draft(), Err(CatalogError::InvalidForm(_))));

        let negative_stock = ProductForm {
            stock_l: "-2".into(),
            ..form()
        };
        assert!(matches!(
            negative_stock.into_draft(),
            Err(CatalogError::InvalidForm(msg)) if msg.contains('L')
        ));

        let unnamed = ProductForm {
            name: "   ".into(),
            ..form()
        };
        assert!(unnamed.into_draft().is_err());
    }

    #[test]
    fn test_blank_category_and_unticked_featured() {
        let draft = ProductForm {
            category_id: String::new(),
            featured: None,
            ..form()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.category_id, None);
        assert!(!draft.featured);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("My Summer Dress.JPG"), "My_Summer_Dress.JPG");
        assert_eq!(sanitize_filename("kurta (1).png"), "kurta_1.png");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn test_stored_filename_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 9, 5, 7).unwrap();
        assert_eq!(
            stored_filename("front view.webp", at).as_deref(),
            Some("20261014_090507_front_view.webp")
        );
        assert_eq!(stored_filename("///", at), None);
    }

    #[tokio::test]
    async fn test_save_image_checks_extension_first() {
        let uploads = UploadConfig {
            folder: std::env::temp_dir().join("fashion-store-never-created"),
            ..UploadConfig::default()
        };
        assert!(matches!(
            save_image(&uploads, "notes.txt", b"hello").await,
            Err(CatalogError::UnsupportedFile(_))
        ));
        assert!(!uploads.folder.exists());
    }

    #[tokio::test]
    async fn test_save_and_remove_image() {
        let uploads = UploadConfig {
            folder: std::env::temp_dir().join(format!("fashion-store-{}", uuid::Uuid::new_v4())),
            ..UploadConfig::default()
        };

        let image = save_image(&uploads, "tee.png", b"\x89PNG").await.unwrap();
        assert!(image.public_url.starts_with("/static/images/products/"));
        assert!(image.filename.ends_with("_tee.png"));
        assert_eq!(tokio::fs::read(&image.local_path).await.unwrap(), b"\x89PNG");

        remove_image_files(std::slice::from_ref(&image)).await;
        assert!(!std::path::Path::new(&image.local_path).exists());
        // A second removal is silent.
        remove_image_files(&[image]).await;

        tokio::fs::remove_dir(&uploads.folder).await.unwrap();
    }

    #[tokio::test]
    async fn test_referenced_category_is_kept() {
        let store = MemoryStore::new();
        let category = store.add_category("Kurtas").await;
        let product = store
            .add_product("Kurta", Price::ZERO, Some(category), StockLevels::zeroed())
            .await;

        assert!(matches!(
            delete_category(&store, category).await,
            Err(CatalogError::CategoryInUse { products: 1 })
        ));
        assert!(store.category(category).await.is_some());

        store.remove_product(product).await;
        delete_category(&store, category).await.unwrap();
        assert!(store.category(category).await.is_none());
        assert!(matches!(
            delete_category(&store, category).await,
            Err(CatalogError::NotFound)
        ));
    }
}
