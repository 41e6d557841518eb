//! Catalog products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fashion_store_core::{CategoryId, Price, ProductId, Size, StockLevels};

/// Public URL prefix uploaded product images are served under.
pub const IMAGE_URL_PREFIX: &str = "/static/images/products";

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price in rupees.
    pub price: Price,
    pub category_id: Option<CategoryId>,
    /// Free-form color tags (`"black"`, `"navy"`).
    pub colors: Vec<String>,
    /// Per-size counters. Checkout may drive these negative.
    pub stock: StockLevels,
    pub images: Vec<ProductImage>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Formatted unit price (`₹1,499.00`).
    #[must_use]
    pub fn display_price(&self) -> String {
        self.price.display_inr()
    }

    /// Sizes with at least one unit available.
    pub fn sizes_in_stock(&self) -> impl Iterator<Item = Size> + '_ {
        Size::ALL
            .into_iter()
            .filter(|size| self.stock.in_stock(*size))
    }
}

/// A stored product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Stored file name (timestamp-prefixed).
    pub filename: String,
    /// Location on disk, relative to the working directory.
    pub local_path: String,
    /// URL the image is served from.
    pub public_url: String,
}

impl ProductImage {
    /// Build the record for a file written into `folder`.
    #[must_use]
    pub fn stored_in(folder: &std::path::Path, filename: &str) -> Self {
        Self {
            filename: filename.to_owned(),
            local_path: folder.join(filename).to_string_lossy().into_owned(),
            public_url: format!("{IMAGE_URL_PREFIX}/{filename}"),
        }
    }
}

/// Editable product fields, as submitted by the back-office form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    pub colors: Vec<String>,
    pub stock: StockLevels,
    pub featured: bool,
}

/// Catalog listing filters. Every field is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    /// Case-insensitive match against name and description.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Only products with this size in stock.
    pub size: Option<Size>,
    /// Only products tagged with this color.
    pub color: Option<String>,
}

/// Split a comma-separated color field into trimmed, non-empty tags.
#[must_use]
pub fn parse_colors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|color| !color.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colors_drops_blanks() {
        assert_eq!(
            parse_colors("black, navy ,, maroon"),
            vec!["black", "navy", "maroon"]
        );
        assert!(parse_colors("  ").is_empty());
    }

    #[test]
    fn test_image_record_paths() {
        let image = ProductImage::stored_in(
            std::path::Path::new("static/images/products"),
            "20261014_101500_kurta.jpg",
        );
        assert_eq!(
            image.public_url,
            "/static/images/products/20261014_101500_kurta.jpg"
        );
        assert!(image.local_path.ends_with("20261014_101500_kurta.jpg"));
    }

    #[test]
    fn test_sizes_in_stock_skips_empty_and_negative() {
        let product = Product {
            id: ProductId::new(1),
            name: "Linen Shirt".to_owned(),
            description: String::new(),
            price: "1499".parse().unwrap(),
            category_id: None,
            colors: vec![],
            stock: [(Size::S, 2), (Size::M, 0), (Size::L, -1)]
                .into_iter()
                .collect(),
            images: vec![],
            featured: false,
            created_at: Utc::now(),
        };
        assert_eq!(product.sizes_in_stock().collect::<Vec<_>>(), vec![Size::S]);
        assert_eq!(product.display_price(), "₹1,499.00");
    }
}
