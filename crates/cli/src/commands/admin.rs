//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account
//! fs-cli admin create -e owner@example.com -p 'long-password' -u owner
//!
//! # Force the `admin` account back to known credentials
//! fs-cli admin reset -u admin -e admin@example.com -p admin123
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use sqlx::PgPool;
use thiserror::Error;

use fashion_store_core::{Email, EmailError, UserId, UserRole};
use fashion_store_storefront::services::auth::{AuthError, hash_password, validate_password};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password rejected or not hashable.
    #[error("{0}")]
    Password(#[from] AuthError),

    /// An account already uses this email or username.
    #[error("An account already exists with email {email} or username {username}")]
    UserExists { email: String, username: String },
}

/// Create a new admin account.
///
/// The username defaults to the local part of `email`.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `AdminError::UserExists` if the email or username is taken.
pub async fn create_user(
    email: &str,
    password: &str,
    username: Option<&str>,
) -> Result<UserId, AdminError> {
    let email = Email::parse_strict(email)?;
    validate_password(password)?;
    let username = username
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| email.local_part())
        .to_owned();

    let pool = connect().await?;

    if find_account(&pool, &username, &email).await?.is_some() {
        return Err(AdminError::UserExists {
            email: email.into_inner(),
            username,
        });
    }

    tracing::info!("Creating admin account: {username} ({email})");
    let id = insert_admin(&pool, &username, &email, &hash_password(password)?).await?;

    tracing::info!("Admin account created with ID: {id}");
    Ok(id)
}

/// Reset an account to role `admin` with a fresh password.
///
/// Matches on username or email. A missing account is created.
///
/// # Errors
///
/// Returns an error if the inputs are invalid or the database fails.
pub async fn reset_user(username: &str, email: &str, password: &str) -> Result<UserId, AdminError> {
    let email = Email::parse(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let pool = connect().await?;

    let id = match find_account(&pool, username, &email).await? {
        Some(id) => {
            sqlx::query(
                r"
                UPDATE store.users
                SET username = $2, email = $3, password_hash = $4, role = $5
                WHERE id = $1
                ",
            )
            .bind(id)
            .bind(username)
            .bind(email.as_str())
            .bind(&password_hash)
            .bind(UserRole::Admin)
            .execute(&pool)
            .await?;
            tracing::info!("Admin account {id} reset");
            id
        }
        None => {
            let id = insert_admin(&pool, username, &email, &password_hash).await?;
            tracing::info!("Admin account created with ID: {id}");
            id
        }
    };

    tracing::info!("Log in as {username} ({email})");
    Ok(id)
}

async fn find_account(
    pool: &PgPool,
    username: &str,
    email: &Email,
) -> Result<Option<UserId>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM store.users WHERE username = $1 OR lower(email) = lower($2) ORDER BY id LIMIT 1",
    )
    .bind(username)
    .bind(email.as_str())
    .fetch_optional(pool)
    .await
}

pub(crate) async fn insert_admin(
    pool: &PgPool,
    username: &str,
    email: &Email,
    password_hash: &str,
) -> Result<UserId, sqlx::Error> {
    sqlx::query_scalar(
        r"
        INSERT INTO store.users (username, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        ",
    )
    .bind(username)
    .bind(email.as_str())
    .bind(password_hash)
    .bind(UserRole::Admin)
    .fetch_one(pool)
    .await
}
