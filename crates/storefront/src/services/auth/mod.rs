//! Authentication service.
//!
//! Password accounts only. Hashes are Argon2id PHC strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use sqlx::PgPool;

use fashion_store_core::{Email, UserId, UserRole};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Fields of the admin profile form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub current_password: String,
    /// New password; blank keeps the current one.
    pub password: String,
    pub confirm_password: String,
}

/// Authentication service.
///
/// Handles registration, login, and profile changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a shopper account with role `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` for a blank username.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is taken.
    #[tracing::instrument(skip(self, email, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("Username is required"));
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        if self.users.identity_taken(username, &email, None).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(NewUser {
                username,
                email: &email,
                password_hash: &password_hash,
                role: UserRole::User,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Login with a username or an email address.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no account matches or the
    /// password is wrong.
    #[tracing::instrument(skip(self, login, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<User, AuthError> {
        let login = login.trim();
        if login.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let (user, password_hash) = self
            .users
            .find_login(login)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash).inspect_err(|_| {
            tracing::info!(user_id = %user.id, "login rejected");
        })?;

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(user)
    }

    /// Apply a profile form for `user_id` and return the refreshed account.
    ///
    /// # Errors
    ///
    /// Returns the first failed check from [`validate_profile_fields`] or
    /// [`check_password_change`], `AuthError::UserAlreadyExists` if the
    /// username or email belongs to another account, and
    /// `AuthError::UserNotFound` if the account is gone.
    #[tracing::instrument(skip(self, form))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        form: &ProfileUpdate,
    ) -> Result<User, AuthError> {
        let (username, email) = validate_profile_fields(form)?;

        if self
            .users
            .identity_taken(username, &email, Some(user_id))
            .await?
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let new_hash = if form.password.is_empty() {
            None
        } else {
            let stored = self
                .users
                .get_password_hash(user_id)
                .await?
                .ok_or(AuthError::UserNotFound)?;
            check_password_change(form, &stored)?;
            Some(hash_password(&form.password)?)
        };

        let user = self
            .users
            .update_profile(user_id, username, &email, new_hash.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(password_changed = new_hash.is_some(), "profile updated");
        Ok(user)
    }
}

/// Trimmed username and parsed email from a profile form.
///
/// # Errors
///
/// Returns `AuthError::MissingField` if either is blank and
/// `AuthError::InvalidEmail` if the email does not parse.
pub fn validate_profile_fields(form: &ProfileUpdate) -> Result<(&str, Email), AuthError> {
    let username = form.username.trim();
    if username.is_empty() || form.email.trim().is_empty() {
        return Err(AuthError::MissingField("Username and email are required"));
    }
    Ok((username, Email::parse(&form.email)?))
}

/// Check a requested password change against the stored hash.
///
/// Order: current password, new password length, confirmation.
///
/// # Errors
///
/// Returns `AuthError::IncorrectCurrentPassword`, `AuthError::WeakPassword`
/// or `AuthError::PasswordMismatch`.
pub fn check_password_change(form: &ProfileUpdate, stored_hash: &str) -> Result<(), AuthError> {
    verify_password(&form.current_password, stored_hash)
        .map_err(|_| AuthError::IncorrectCurrentPassword)?;
    validate_password(&form.password)?;
    if form.password != form.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }
    Ok(())
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` below [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unreadable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
