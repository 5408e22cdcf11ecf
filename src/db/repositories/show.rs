use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use tracing::info;

use crate::entities::{bookings, prelude::*, shows, theaters};
use crate::models::show::{NewShow, Show};
use crate::models::theater::Theater;

pub struct ShowRepository {
    conn: DatabaseConnection,
}

impl ShowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a show. Returns `None` if the theater does not exist.
    pub async fn create(&self, show: &NewShow) -> Result<Option<i32>> {
        let active = shows::ActiveModel {
            name: Set(show.name.clone()),
            theater_id: Set(show.theater_id),
            date: Set(show.date),
            description: Set(show.description.clone()),
            ..Default::default()
        };

        match Shows::insert(active).exec(&self.conn).await {
            Ok(result) => {
                info!(
                    show_id = result.last_insert_id,
                    theater_id = show.theater_id,
                    "Created show: {}",
                    show.name
                );
                Ok(Some(result.last_insert_id))
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to insert show"),
        }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Show>> {
        let show = Shows::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query show")?;

        Ok(show.map(Show::from))
    }

    pub async fn get_with_theater(&self, id: i32) -> Result<Option<(Show, Theater)>> {
        let row = Shows::find_by_id(id)
            .find_also_related(theaters::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query show with theater")?;

        Ok(row.and_then(|(show, theater)| Some((Show::from(show), Theater::from(theater?)))))
    }

    /// Shows with their theater, ordered by show id, optionally for one theater.
    pub async fn list_with_theater(&self, theater_id: Option<i32>) -> Result<Vec<(Show, Theater)>> {
        let mut query = Shows::find();
        if let Some(theater_id) = theater_id {
            query = query.filter(shows::Column::TheaterId.eq(theater_id));
        }

        let rows = query
            .order_by_asc(shows::Column::Id)
            .find_also_related(theaters::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list shows")?;

        Ok(rows
            .into_iter()
            .filter_map(|(show, theater)| Some((Show::from(show), Theater::from(theater?))))
            .collect())
    }

    /// Delete a show and all of its bookings in one transaction.
    /// Returns (`show_removed`, `bookings_removed`).
    pub async fn delete_with_bookings(&self, id: i32) -> Result<(bool, u64)> {
        let txn = self.conn.begin().await?;

        let bookings_removed = bookings::Entity::delete_many()
            .filter(bookings::Column::ShowId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete bookings for show")?
            .rows_affected;

        let result = Shows::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete show")?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(show_id = id, bookings_removed, "Deleted show");
        }
        Ok((removed, bookings_removed))
    }
}
