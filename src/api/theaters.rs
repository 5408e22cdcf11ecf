use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::require_manager;
use super::validation::{validate_capacity, validate_id, validate_required};
use super::{ApiError, ApiResponse, AppState, CreatedDto, TheaterDetailDto};
use crate::models::theater::Theater;
use crate::models::user::AuthenticatedUser;

#[derive(Deserialize)]
pub struct CreateTheaterRequest {
    pub name: String,
    pub capacity: i32,
}

pub async fn list_theaters(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<Theater>>>, ApiError> {
    require_manager(&user)?;

    let theaters = state.booking_service().list_theaters().await?;
    Ok(Json(ApiResponse::success(theaters)))
}

pub async fn create_theater(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateTheaterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedDto>>), ApiError> {
    require_manager(&user)?;
    let name = validate_required("Name", &payload.name)?;
    let capacity = validate_capacity(payload.capacity)?;

    let id = state.booking_service().create_theater(name, capacity).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedDto { id })),
    ))
}

pub async fn get_theater(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TheaterDetailDto>>, ApiError> {
    require_manager(&user)?;
    let id = validate_id("theater", id)?;

    let theater = state.booking_service().get_theater(id).await?;
    let shows = state.booking_service().list_show_details(Some(id)).await?;

    Ok(Json(ApiResponse::success(TheaterDetailDto { theater, shows })))
}
