//! `SeaORM` implementation of the `BookingService` trait.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::config::BookingConfig;
use crate::constants::limits::{MAX_NAME_LENGTH, MIN_NAME_LENGTH};
use crate::db::Store;
use crate::models::booking::{Booking, BookingDetails, Spectator};
use crate::models::show::{NewShow, Show, ShowDetails};
use crate::models::theater::Theater;
use crate::services::booking_service::{BookingError, BookingService};
use crate::services::show_locks::ShowLocks;

pub struct SeaOrmBookingService {
    store: Store,
    locks: ShowLocks,
    config: BookingConfig,
}

impl SeaOrmBookingService {
    #[must_use]
    pub fn new(store: Store, config: BookingConfig) -> Self {
        Self {
            store,
            locks: ShowLocks::new(),
            config,
        }
    }

    fn validate_name(kind: &str, name: &str) -> Result<String, BookingError> {
        let name = name.trim();
        let len = name.chars().count();

        if len < MIN_NAME_LENGTH {
            return Err(BookingError::Validation(format!(
                "{kind} name must be at least {MIN_NAME_LENGTH} characters"
            )));
        }
        if len > MAX_NAME_LENGTH {
            return Err(BookingError::Validation(format!(
                "{kind} name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }

        Ok(name.to_string())
    }

    async fn show_with_theater(&self, show_id: i32) -> Result<(Show, Theater), BookingError> {
        self.store
            .show_repo()
            .get_with_theater(show_id)
            .await?
            .ok_or(BookingError::UnknownShow(show_id))
    }

    /// Works out why the conditional insert admitted nothing.
    /// Must run while the show's lock is held.
    async fn rejection_reason(&self, show_id: i32, user_id: i32) -> BookingError {
        let (_, theater) = match self.show_with_theater(show_id).await {
            Ok(found) => found,
            Err(e) => return e,
        };

        if !self.config.allow_multiple_per_user {
            match self
                .store
                .booking_repo()
                .exists_for_user(show_id, user_id)
                .await
            {
                Ok(true) => return BookingError::AlreadyBooked { show_id, user_id },
                Ok(false) => {}
                Err(e) => return e.into(),
            }
        }

        BookingError::CapacityExceeded {
            show_id,
            capacity: theater.capacity,
        }
    }
}

#[async_trait]
impl BookingService for SeaOrmBookingService {
    async fn create_theater(&self, name: &str, capacity: i32) -> Result<i32, BookingError> {
        let name = Self::validate_name("Theater", name)?;
        if capacity < 0 {
            return Err(BookingError::Validation(
                "Capacity must not be negative".to_string(),
            ));
        }

        Ok(self.store.theater_repo().create(&name, capacity).await?)
    }

    async fn get_theater(&self, theater_id: i32) -> Result<Theater, BookingError> {
        self.store
            .theater_repo()
            .get(theater_id)
            .await?
            .ok_or(BookingError::UnknownTheater(theater_id))
    }

    async fn list_theaters(&self) -> Result<Vec<Theater>, BookingError> {
        Ok(self.store.theater_repo().list().await?)
    }

    async fn create_show(
        &self,
        name: &str,
        theater_id: i32,
        date: NaiveDateTime,
        description: &str,
    ) -> Result<i32, BookingError> {
        let name = Self::validate_name("Show", name)?;

        let show = NewShow {
            name,
            theater_id,
            date,
            description: description.trim().to_string(),
        };

        self.store
            .show_repo()
            .create(&show)
            .await?
            .ok_or(BookingError::UnknownTheater(theater_id))
    }

    async fn get_show(&self, show_id: i32) -> Result<Show, BookingError> {
        self.store
            .show_repo()
            .get(show_id)
            .await?
            .ok_or(BookingError::UnknownShow(show_id))
    }

    async fn get_show_details(&self, show_id: i32) -> Result<ShowDetails, BookingError> {
        let (show, theater) = self.show_with_theater(show_id).await?;
        let booked = self.store.booking_repo().count_for_show(show_id).await?;

        Ok(ShowDetails::new(show, theater.name, theater.capacity, booked))
    }

    async fn list_shows(&self, theater_id: Option<i32>) -> Result<Vec<Show>, BookingError> {
        let rows = self.store.show_repo().list_with_theater(theater_id).await?;
        Ok(rows.into_iter().map(|(show, _)| show).collect())
    }

    async fn list_show_details(
        &self,
        theater_id: Option<i32>,
    ) -> Result<Vec<ShowDetails>, BookingError> {
        let rows = self.store.show_repo().list_with_theater(theater_id).await?;
        let counts = self.store.booking_repo().counts_by_show().await?;

        Ok(rows
            .into_iter()
            .map(|(show, theater)| {
                let booked = counts.get(&show.id).copied().unwrap_or(0);
                ShowDetails::new(show, theater.name, theater.capacity, booked)
            })
            .collect())
    }

    async fn book(&self, show_id: i32, user_id: i32) -> Result<i32, BookingError> {
        let _guard = self.locks.acquire(show_id).await;

        let inserted = self
            .store
            .booking_repo()
            .insert_if_available(user_id, show_id, self.config.allow_multiple_per_user)
            .await?;

        if let Some(booking_id) = inserted {
            metrics::counter!("bookings_created_total").increment(1);
            return Ok(booking_id);
        }

        let reason = self.rejection_reason(show_id, user_id).await;
        match &reason {
            BookingError::CapacityExceeded { capacity, .. } => {
                metrics::counter!("bookings_rejected_total", "reason" => "capacity").increment(1);
                warn!(show_id, user_id, capacity, "Booking rejected: show is full");
            }
            BookingError::AlreadyBooked { .. } => {
                metrics::counter!("bookings_rejected_total", "reason" => "duplicate")
                    .increment(1);
                warn!(show_id, user_id, "Booking rejected: already booked");
            }
            _ => {}
        }
        Err(reason)
    }

    async fn cancel_booking(&self, booking_id: i32) -> Result<(), BookingError> {
        self.store.booking_repo().delete(booking_id).await?;
        Ok(())
    }

    async fn get_booking(&self, booking_id: i32) -> Result<Option<Booking>, BookingError> {
        Ok(self.store.booking_repo().get(booking_id).await?)
    }

    async fn delete_show(&self, show_id: i32) -> Result<bool, BookingError> {
        let guard = self.locks.acquire(show_id).await;
        let (removed, _) = self.store.show_repo().delete_with_bookings(show_id).await?;
        drop(guard);

        if removed {
            self.locks.forget(show_id).await;
        }
        Ok(removed)
    }

    async fn available_seats(&self, show_id: i32) -> Result<i64, BookingError> {
        let (_, theater) = self.show_with_theater(show_id).await?;
        let booked = self.store.booking_repo().count_for_show(show_id).await?;

        Ok(i64::from(theater.capacity) - booked)
    }

    async fn count_bookings(&self, show_id: i32) -> Result<i64, BookingError> {
        Ok(self.store.booking_repo().count_for_show(show_id).await?)
    }

    async fn list_bookings(&self, user_id: i32) -> Result<Vec<BookingDetails>, BookingError> {
        Ok(self.store.booking_repo().list_detailed_for_user(user_id).await?)
    }

    async fn spectators_of(&self, show_id: i32) -> Result<Vec<Spectator>, BookingError> {
        if self.store.show_repo().get(show_id).await?.is_none() {
            return Err(BookingError::UnknownShow(show_id));
        }
        Ok(self.store.booking_repo().spectators(show_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(
            SeaOrmBookingService::validate_name("Theater", "  Main Hall ").unwrap(),
            "Main Hall"
        );
        assert!(SeaOrmBookingService::validate_name("Theater", "ab").is_err());
        assert!(SeaOrmBookingService::validate_name("Theater", "  ab  ").is_err());
        assert!(SeaOrmBookingService::validate_name("Show", &"x".repeat(201)).is_err());
    }
}
