use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::require_manager;
use super::validation::{parse_show_datetime, validate_id, validate_required};
use super::{
    ApiError, ApiResponse, AppState, BookingCreatedDto, CreatedDto, MessageResponse,
    ShowDetailDto,
};
use crate::models::show::ShowDetails;
use crate::models::user::AuthenticatedUser;

#[derive(Deserialize)]
pub struct ShowsQuery {
    pub theater_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct CreateShowRequest {
    pub name: String,
    pub theater_id: i32,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
    #[serde(default)]
    pub description: String,
}

pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShowsQuery>,
) -> Result<Json<ApiResponse<Vec<ShowDetails>>>, ApiError> {
    let theater_id = query
        .theater_id
        .map(|id| validate_id("theater", id))
        .transpose()?;

    let shows = state.booking_service().list_show_details(theater_id).await?;
    Ok(Json(ApiResponse::success(shows)))
}

pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateShowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedDto>>), ApiError> {
    require_manager(&user)?;
    let name = validate_required("Name", &payload.name)?;
    let theater_id = validate_id("theater", payload.theater_id)?;
    let date = parse_show_datetime(&payload.date, &payload.time)?;

    let id = state
        .booking_service()
        .create_show(name, theater_id, date, &payload.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedDto { id })),
    ))
}

pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ShowDetailDto>>, ApiError> {
    let id = validate_id("show", id)?;

    let show = state.booking_service().get_show_details(id).await?;
    let spectators = if user.is_manager() {
        Some(state.booking_service().spectators_of(id).await?)
    } else {
        None
    };

    Ok(Json(ApiResponse::success(ShowDetailDto { show, spectators })))
}

pub async fn delete_show(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_manager(&user)?;
    let id = validate_id("show", id)?;

    if !state.booking_service().delete_show(id).await? {
        return Err(ApiError::not_found("Show", id));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Show {id} deleted"
    )))))
}

/// POST /shows/{id}/bookings
/// Books one seat for the logged-in user.
pub async fn book_show(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreatedDto>>), ApiError> {
    let show_id = validate_id("show", id)?;

    let booking_id = state.booking_service().book(show_id, user.id).await?;
    let available = state.booking_service().available_seats(show_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BookingCreatedDto {
            id: booking_id,
            show_id,
            available,
        })),
    ))
}
