//! The signed-in admin's own account.

use axum::{Form, Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthService, ProfileUpdate};
use crate::state::AppState;

#[instrument(skip(state, admin), fields(user_id = %admin.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<User>> {
    let user = state
        .users()
        .get(admin.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;
    Ok(Json(user))
}

/// Change username, email, and optionally the password; then refresh the
/// session identity.
#[instrument(skip(state, admin, session, form), fields(user_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Form(form): Form<ProfileUpdate>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .update_profile(admin.id, &form)
        .await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to refresh session user");
            AppError::Internal("session".to_string())
        })?;

    Ok(Json(user))
}
