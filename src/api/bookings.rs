use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::booking::BookingDetails;
use crate::models::user::AuthenticatedUser;

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<BookingDetails>>>, ApiError> {
    let bookings = state.booking_service().list_bookings(user.id).await?;
    Ok(Json(ApiResponse::success(bookings)))
}

/// DELETE /bookings/{id}
/// Owners and managers may cancel. A booking that is already gone counts as
/// cancelled.
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("booking", id)?;

    if let Some(booking) = state.booking_service().get_booking(id).await? {
        if booking.user_id != user.id && !user.is_manager() {
            return Err(ApiError::Forbidden(
                "Cannot cancel another user's booking".to_string(),
            ));
        }
        state.booking_service().cancel_booking(id).await?;
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Booking {id} cancelled"
    )))))
}
