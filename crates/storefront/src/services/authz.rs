//! The admin access check.
//!
//! Every back-office mutation goes through [`require_admin`]: the
//! `RequireAdmin` extractor calls it for the whole `/admin` tree, and the order
//! ledger and stock adjuster call it again before they change anything.

use thiserror::Error;

use crate::models::CurrentUser;

/// The caller is authenticated but not an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("admin access required")]
pub struct Forbidden;

/// Allow the call only for admin accounts.
///
/// # Errors
///
/// Returns [`Forbidden`] for any other role.
pub fn require_admin(user: &CurrentUser) -> Result<(), Forbidden> {
    if user.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id, "admin access denied");
        Err(Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use fashion_store_core::{UserId, UserRole};

    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "meera".to_owned(),
            email: None,
            role,
        }
    }

    #[test]
    fn test_only_admins_pass() {
        assert_eq!(require_admin(&user(UserRole::Admin)), Ok(()));
        assert_eq!(require_admin(&user(UserRole::User)), Err(Forbidden));
    }
}
