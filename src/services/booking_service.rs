//! Domain service for theaters, shows and bookings.
//!
//! The ledger's one invariant: the bookings for a show never outnumber the
//! seats of the theater hosting it, even when many users book at once.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::booking::{Booking, BookingDetails, Spectator};
use crate::models::show::{Show, ShowDetails};
use crate::models::theater::Theater;

/// Errors specific to booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Theater not found: {0}")]
    UnknownTheater(i32),

    #[error("Show not found: {0}")]
    UnknownShow(i32),

    #[error("Show {show_id} is full ({capacity} seats)")]
    CapacityExceeded { show_id: i32, capacity: i32 },

    #[error("User {user_id} already holds a booking for show {show_id}")]
    AlreadyBooked { show_id: i32, user_id: i32 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for BookingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for the booking ledger.
#[async_trait::async_trait]
pub trait BookingService: Send + Sync {
    /// Creates a theater. Names need not be unique.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] for a name shorter than three
    /// characters or a negative capacity.
    async fn create_theater(&self, name: &str, capacity: i32) -> Result<i32, BookingError>;

    async fn get_theater(&self, theater_id: i32) -> Result<Theater, BookingError>;

    async fn list_theaters(&self) -> Result<Vec<Theater>, BookingError>;

    /// # Errors
    ///
    /// Returns [`BookingError::UnknownTheater`] if `theater_id` does not exist.
    async fn create_show(
        &self,
        name: &str,
        theater_id: i32,
        date: NaiveDateTime,
        description: &str,
    ) -> Result<i32, BookingError>;

    async fn get_show(&self, show_id: i32) -> Result<Show, BookingError>;

    /// The show with its theater, capacity and current occupancy.
    async fn get_show_details(&self, show_id: i32) -> Result<ShowDetails, BookingError>;

    async fn list_shows(&self, theater_id: Option<i32>) -> Result<Vec<Show>, BookingError>;

    async fn list_show_details(
        &self,
        theater_id: Option<i32>,
    ) -> Result<Vec<ShowDetails>, BookingError>;

    /// Reserves one seat of `show_id` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UnknownShow`] if the show does not exist,
    /// [`BookingError::CapacityExceeded`] if it is full, and
    /// [`BookingError::AlreadyBooked`] when multiple bookings per user are
    /// disabled and the user already holds one.
    async fn book(&self, show_id: i32, user_id: i32) -> Result<i32, BookingError>;

    /// Removes a booking. Cancelling a booking that does not exist is a no-op.
    async fn cancel_booking(&self, booking_id: i32) -> Result<(), BookingError>;

    async fn get_booking(&self, booking_id: i32) -> Result<Option<Booking>, BookingError>;

    /// Deletes the show and all its bookings atomically.
    /// Returns false if the show did not exist.
    async fn delete_show(&self, show_id: i32) -> Result<bool, BookingError>;

    /// Capacity minus current bookings.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UnknownShow`] if the show does not exist.
    async fn available_seats(&self, show_id: i32) -> Result<i64, BookingError>;

    async fn count_bookings(&self, show_id: i32) -> Result<i64, BookingError>;

    async fn list_bookings(&self, user_id: i32) -> Result<Vec<BookingDetails>, BookingError>;

    async fn spectators_of(&self, show_id: i32) -> Result<Vec<Spectator>, BookingError>;
}
