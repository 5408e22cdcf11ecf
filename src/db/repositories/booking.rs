use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Statement,
    TransactionTrait, Value,
};
use std::collections::HashMap;
use tracing::info;

use crate::entities::{bookings, prelude::*, shows, theaters, users};
use crate::models::booking::{Booking, BookingDetails, Spectator};

/// Admits a booking only while the show's count is below its theater's
/// capacity. Check and insert run as one statement, so the write lock is
/// held across both and concurrent writers cannot both slip under the limit.
const INSERT_IF_AVAILABLE: &str = r"
INSERT INTO bookings (user_id, show_id)
SELECT ?, shows.id
FROM shows
JOIN theaters ON theaters.id = shows.theater_id
WHERE shows.id = ?
  AND (SELECT COUNT(*) FROM bookings WHERE bookings.show_id = shows.id) < theaters.capacity";

const AND_NOT_ALREADY_BOOKED: &str = r"
  AND NOT EXISTS (
    SELECT 1 FROM bookings
    WHERE bookings.show_id = shows.id AND bookings.user_id = ?
  )";

#[derive(Debug, FromQueryResult)]
struct ShowCount {
    show_id: i32,
    booked: i64,
}

pub struct BookingRepository {
    conn: DatabaseConnection,
}

impl BookingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Try to insert a booking. Returns `None` when nothing was inserted:
    /// the show is missing, full, or (with `allow_multiple == false`) the user
    /// already holds a seat. The caller tells those cases apart.
    pub async fn insert_if_available(
        &self,
        user_id: i32,
        show_id: i32,
        allow_multiple: bool,
    ) -> Result<Option<i32>> {
        let backend = self.conn.get_database_backend();

        let statement = if allow_multiple {
            Statement::from_sql_and_values(
                backend,
                INSERT_IF_AVAILABLE,
                [Value::from(user_id), Value::from(show_id)],
            )
        } else {
            Statement::from_sql_and_values(
                backend,
                format!("{INSERT_IF_AVAILABLE}{AND_NOT_ALREADY_BOOKED}"),
                [
                    Value::from(user_id),
                    Value::from(show_id),
                    Value::from(user_id),
                ],
            )
        };

        let txn = self.conn.begin().await?;
        let result = txn
            .execute(statement)
            .await
            .context("Failed to insert booking")?;
        txn.commit().await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let booking_id = i32::try_from(result.last_insert_id())
            .context("Booking id out of range")?;

        info!(booking_id, show_id, user_id, "Created booking");
        Ok(Some(booking_id))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Booking>> {
        let booking = Bookings::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query booking")?;

        Ok(booking.map(Booking::from))
    }

    /// Returns true if a row was deleted.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Bookings::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete booking")?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(booking_id = id, "Cancelled booking");
        }
        Ok(removed)
    }

    pub async fn count_for_show(&self, show_id: i32) -> Result<i64> {
        let count = Bookings::find()
            .filter(bookings::Column::ShowId.eq(show_id))
            .count(&self.conn)
            .await
            .context("Failed to count bookings")?;

        i64::try_from(count).context("Booking count out of range")
    }

    /// Number of bookings per show, for every show that has at least one.
    pub async fn counts_by_show(&self) -> Result<HashMap<i32, i64>> {
        let rows = Bookings::find()
            .select_only()
            .column(bookings::Column::ShowId)
            .column_as(bookings::Column::Id.count(), "booked")
            .group_by(bookings::Column::ShowId)
            .into_model::<ShowCount>()
            .all(&self.conn)
            .await
            .context("Failed to count bookings per show")?;

        Ok(rows.into_iter().map(|r| (r.show_id, r.booked)).collect())
    }

    pub async fn exists_for_user(&self, show_id: i32, user_id: i32) -> Result<bool> {
        let count = Bookings::find()
            .filter(bookings::Column::ShowId.eq(show_id))
            .filter(bookings::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to query user bookings")?;

        Ok(count > 0)
    }

    pub async fn list_detailed_for_user(&self, user_id: i32) -> Result<Vec<BookingDetails>> {
        Bookings::find()
            .select_only()
            .column(bookings::Column::Id)
            .column(bookings::Column::ShowId)
            .column_as(shows::Column::Name, "show_name")
            .column(shows::Column::Date)
            .column(shows::Column::Description)
            .column_as(theaters::Column::Name, "theater_name")
            .join(JoinType::InnerJoin, bookings::Relation::Shows.def())
            .join(JoinType::InnerJoin, shows::Relation::Theaters.def())
            .filter(bookings::Column::UserId.eq(user_id))
            .order_by_asc(bookings::Column::Id)
            .into_model::<BookingDetails>()
            .all(&self.conn)
            .await
            .context("Failed to list bookings for user")
    }

    pub async fn spectators(&self, show_id: i32) -> Result<Vec<Spectator>> {
        Bookings::find()
            .select_only()
            .column_as(bookings::Column::Id, "booking_id")
            .column(bookings::Column::UserId)
            .column(users::Column::Email)
            .join(JoinType::InnerJoin, bookings::Relation::Users.def())
            .filter(bookings::Column::ShowId.eq(show_id))
            .order_by_asc(bookings::Column::Id)
            .into_model::<Spectator>()
            .all(&self.conn)
            .await
            .context("Failed to list spectators")
    }
}
