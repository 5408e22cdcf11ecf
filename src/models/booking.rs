use chrono::NaiveDateTime;
use sea_orm::FromQueryResult;
use serde::Serialize;

use crate::entities::bookings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub show_id: i32,
}

impl From<bookings::Model> for Booking {
    fn from(model: bookings::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            show_id: model.show_id,
        }
    }
}

/// A user's booking with the show and theater it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct BookingDetails {
    pub id: i32,
    pub show_id: i32,
    pub show_name: String,
    pub date: NaiveDateTime,
    pub description: String,
    pub theater_name: String,
}

/// A booking on a show, with the email of the user holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct Spectator {
    pub booking_id: i32,
    pub user_id: i32,
    pub email: String,
}
