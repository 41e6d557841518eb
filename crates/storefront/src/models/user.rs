//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fashion_store_core::{Email, UserId, UserRole};

/// A store account (shopper or back-office).
///
/// The password hash is never carried on this type; the user repository
/// returns it alongside the user only for login and password changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique.
    pub username: String,
    /// Contact address, unique when present. Order emails go here.
    pub email: Option<Email>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
