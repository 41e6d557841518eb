//! Registration, login, and logout.
//!
//! Login accepts a username or an email in the `username` field.

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

/// Create a shopper account. The new user still has to log in.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let user = AuthService::new(state.pool())
        .register(&form.username, &form.email, &form.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful! Please login.",
            "user": user,
        })),
    )
        .into_response())
}

/// Check credentials and store the identity in the session.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Json<CurrentUser>> {
    let user = AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await?;

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await.map_err(|e| {
        tracing::error!(error = %e, "failed to store session user");
        AppError::Internal("session".to_string())
    })?;
    set_sentry_user(&current.id, current.email.as_ref().map(|e| e.as_str()));

    Ok(Json(current))
}

/// Forget the signed-in identity.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session).await.map_err(|e| {
        tracing::error!(error = %e, "failed to clear session user");
        AppError::Internal("session".to_string())
    })?;
    clear_sentry_user();

    Ok(Json(json!({ "message": "You have been logged out" })))
}
