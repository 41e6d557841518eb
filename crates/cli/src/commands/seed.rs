//! Seed an empty database.
//!
//! Inserts the sample categories when there are none, and a default admin
//! account (`admin` / `admin123`) when no admin exists. Safe to re-run.

use fashion_store_core::{Email, UserRole};
use fashion_store_storefront::db::CategoryRepository;
use fashion_store_storefront::db::UserRepository;
use fashion_store_storefront::services::auth::hash_password;
use tracing::info;

use super::connect;
use super::admin::insert_admin;

const SAMPLE_CATEGORIES: &[(&str, &str)] = &[
    ("Sarees", "Traditional Indian sarees"),
    ("Kurtas", "Comfortable and stylish kurtas"),
    ("Lehengas", "Beautiful lehengas for special occasions"),
    ("Dresses", "Western style dresses"),
    ("Accessories", "Jewelry, bags, and more"),
];

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_EMAIL: &str = "admin@fashionstore.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Seed categories and the default admin account.
///
/// # Errors
///
/// Returns an error if environment variables are missing or database
/// operations fail.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    let categories = CategoryRepository::new(&pool);
    if categories.count().await? == 0 {
        for (name, description) in SAMPLE_CATEGORIES {
            categories.create(name, description).await?;
        }
        info!(count = SAMPLE_CATEGORIES.len(), "Seeded sample categories");
    } else {
        info!("Categories already present, skipping");
    }

    let users = UserRepository::new(&pool);
    if users.count_by_role(UserRole::Admin).await? == 0 {
        let email = Email::parse(DEFAULT_ADMIN_EMAIL)?;
        let id = insert_admin(
            &pool,
            DEFAULT_ADMIN_USERNAME,
            &email,
            &hash_password(DEFAULT_ADMIN_PASSWORD)?,
        )
        .await?;
        info!(user_id = %id, "Created default admin {DEFAULT_ADMIN_USERNAME} / {DEFAULT_ADMIN_PASSWORD}; change this password");
    } else {
        info!("Admin account already present, skipping");
    }

    info!("Seeding complete!");
    Ok(())
}
