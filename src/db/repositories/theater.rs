use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::info;

use crate::entities::{prelude::*, theaters};
use crate::models::theater::Theater;

pub struct TheaterRepository {
    conn: DatabaseConnection,
}

impl TheaterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str, capacity: i32) -> Result<i32> {
        let result = Theaters::insert(theaters::ActiveModel {
            name: Set(name.to_string()),
            capacity: Set(capacity),
            ..Default::default()
        })
        .exec(&self.conn)
        .await
        .context("Failed to insert theater")?;

        info!(theater_id = result.last_insert_id, capacity, "Created theater: {}", name);
        Ok(result.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Theater>> {
        let theater = Theaters::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query theater")?;

        Ok(theater.map(Theater::from))
    }

    pub async fn list(&self) -> Result<Vec<Theater>> {
        let rows = Theaters::find()
            .order_by_asc(theaters::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list theaters")?;

        Ok(rows.into_iter().map(Theater::from).collect())
    }
}
