//! Product categories.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fashion_store_core::CategoryId;

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
