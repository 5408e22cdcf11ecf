use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::require_manager;
use super::{ApiError, ApiResponse, AppState, CreatedDto};
use crate::models::user::{AuthenticatedUser, Role};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// POST /users
/// Any logged-in user can open a regular account; only managers can create
/// other managers.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedDto>>), ApiError> {
    if payload.role == Role::Manager {
        require_manager(&user)?;
    }

    let id = state
        .auth_service()
        .register(payload.email.trim(), &payload.password, payload.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedDto { id })),
    ))
}
