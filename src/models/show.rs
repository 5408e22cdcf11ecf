use chrono::NaiveDateTime;
use serde::Serialize;

use crate::entities::shows;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Show {
    pub id: i32,
    pub name: String,
    pub theater_id: i32,
    pub date: NaiveDateTime,
    pub description: String,
}

impl From<shows::Model> for Show {
    fn from(model: shows::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            theater_id: model.theater_id,
            date: model.date,
            description: model.description,
        }
    }
}

/// Input for creating a show.
#[derive(Debug, Clone)]
pub struct NewShow {
    pub name: String,
    pub theater_id: i32,
    pub date: NaiveDateTime,
    pub description: String,
}

/// A show joined with its theater and current occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowDetails {
    pub id: i32,
    pub name: String,
    pub date: NaiveDateTime,
    pub description: String,
    pub theater_id: i32,
    pub theater_name: String,
    pub capacity: i32,
    pub booked: i64,
    pub available: i64,
}

impl ShowDetails {
    #[must_use]
    pub fn new(show: Show, theater_name: String, capacity: i32, booked: i64) -> Self {
        Self {
            id: show.id,
            name: show.name,
            date: show.date,
            description: show.description,
            theater_id: show.theater_id,
            theater_name,
            capacity,
            booked,
            available: i64::from(capacity) - booked,
        }
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.available <= 0
    }
}
