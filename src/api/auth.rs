use axum::{
    Extension, Json,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse, TotpSetupDto, UserDto};
use crate::constants::session::{PENDING_TOTP_KEY, USER_KEY};
use crate::models::user::AuthenticatedUser;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub totp: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    /// `true` enables 2FA with the pending secret from `/auth/totp/setup`,
    /// `false` disables it, absent leaves it unchanged.
    #[serde(default)]
    pub enable_totp: Option<bool>,
}

#[derive(Deserialize)]
pub struct ConfirmTotpRequest {
    pub code: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects requests without a logged-in session and hands the session's
/// identity to handlers as an `Extension<AuthenticatedUser>`.
pub async fn auth_middleware(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = session_user(&session).await?;

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub fn require_manager(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if user.is_manager() {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let totp = payload.totp.as_deref().filter(|code| !code.trim().is_empty());
    let user = state
        .auth_service()
        .authenticate(&payload.email, &payload.password, totp)
        .await?;

    // Fresh session id on login
    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to rotate session: {e}")))?;
    session
        .insert(USER_KEY, &user)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    let totp_enabled = state
        .auth_service()
        .get_totp_secret(user.id)
        .await?
        .is_some();

    Ok(Json(ApiResponse::success(UserDto {
        id: user.id,
        email: user.email,
        role: user.role,
        totp_enabled,
    })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to end session: {e}")))?;

    Ok(Json(ApiResponse::success(MessageResponse::new("Logged out"))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let totp_enabled = state
        .auth_service()
        .get_totp_secret(user.id)
        .await?
        .is_some();

    Ok(Json(ApiResponse::success(UserDto {
        id: user.id,
        email: user.email,
        role: user.role,
        totp_enabled,
    })))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let pending = if payload.enable_totp == Some(true) {
        Some(pending_secret(&session).await?)
    } else {
        None
    };

    state
        .auth_service()
        .change_password(&user.email, &payload.old_password, &payload.new_password)
        .await?;

    match payload.enable_totp {
        Some(true) => {
            state
                .auth_service()
                .set_totp_secret(&user.email, pending.as_deref())
                .await?;
            clear_pending_secret(&session).await;
        }
        Some(false) => {
            state.auth_service().set_totp_secret(&user.email, None).await?;
        }
        None => {}
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// GET /auth/totp/setup
/// Generates a secret and keeps it in the session until it is confirmed.
pub async fn totp_setup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<TotpSetupDto>>, ApiError> {
    let (secret, provisioning_uri) = state.auth_service().generate_totp_secret(&user.email);

    session
        .insert(PENDING_TOTP_KEY, &secret)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Json(ApiResponse::success(TotpSetupDto {
        secret,
        provisioning_uri,
    })))
}

/// POST /auth/totp
pub async fn totp_confirm(
    State(state): State<Arc<AppState>>,
    session: Session,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<ConfirmTotpRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let secret = pending_secret(&session).await?;

    if !state.auth_service().verify_totp(&secret, &payload.code) {
        return Err(ApiError::validation("Invalid verification code"));
    }

    state
        .auth_service()
        .set_totp_secret(&user.email, Some(&secret))
        .await?;
    clear_pending_secret(&session).await;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Two-factor authentication enabled",
    ))))
}

/// DELETE /auth/totp
pub async fn totp_disable(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service().set_totp_secret(&user.email, None).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Two-factor authentication disabled",
    ))))
}

// ============================================================================
// Helpers
// ============================================================================

async fn session_user(session: &Session) -> Result<AuthenticatedUser, ApiError> {
    session
        .get::<AuthenticatedUser>(USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
}

async fn pending_secret(session: &Session) -> Result<String, ApiError> {
    session
        .get::<String>(PENDING_TOTP_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::validation("No pending TOTP secret; call /auth/totp/setup first"))
}

async fn clear_pending_secret(session: &Session) {
    if let Err(e) = session.remove::<String>(PENDING_TOTP_KEY).await {
        tracing::warn!("Failed to clear pending TOTP secret: {e}");
    }
}
