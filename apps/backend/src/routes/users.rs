//! User registration and profile endpoints

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::{RegisterRequest, RegisterResponse, UpdateProfileInput, UserProfile};
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/users/register
/// Creates a new user and returns the token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Option<RegisterRequest>>,
) -> Result<Json<RegisterResponse>> {
    let username = payload.and_then(|p| p.username);
    let user = state.db.create_user(username.as_deref()).await?;

    tracing::info!("Registered new user: {}", user.id);

    Ok(Json(RegisterResponse {
        user_id: user.id,
        token: user.token,
    }))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<UserProfile>> {
    let user = state
        .db
        .get_user_by_token(&auth.token)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.to_profile()))
}

/// PUT /api/users/me
/// Updates username, languages and prompt presets
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<UserProfile>> {
    input.validate()?;

    let user = state
        .db
        .update_user_profile(auth.user_id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::debug!("Updated profile for user {}", user.id);

    Ok(Json(user.to_profile()))
}
