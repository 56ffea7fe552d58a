//! Booking repository implementation

use costera_core::{
    models::{Booking, BookingStatus},
    traits::BookingRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Column list shared by every booking query
pub const BOOKING_COLUMNS: &str = r#"
    id, reservation_id, room_id,
    check_in, check_out, occupants, status,
    created_at, updated_at
"#;

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_reservation(&self, reservation_id: Uuid) -> AppResult<Vec<Booking>> {
        debug!("Finding bookings for reservation: {}", reservation_id);

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE reservation_id = $1
            ORDER BY created_at
            "#,
            BOOKING_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding bookings: {}", e);
            AppError::Database(format!("Failed to find bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub room_id: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub occupants: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            reservation_id: row.reservation_id,
            room_id: row.room_id,
            check_in: row.check_in,
            check_out: row.check_out,
            occupants: row.occupants,
            status: BookingStatus::from_str(&row.status).unwrap_or(BookingStatus::Confirmed),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion() {
        let now = Utc::now();
        let row = BookingRow {
            id: Uuid::new_v4(),
            reservation_id: Uuid::new_v4(),
            room_id: 7,
            check_in: "2026-09-01".parse().unwrap(),
            check_out: "2026-09-05".parse().unwrap(),
            occupants: 2,
            status: "cancelled".to_string(),
            created_at: now,
            updated_at: now,
        };

        let booking: Booking = row.into();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.room_id, 7);
    }
}
