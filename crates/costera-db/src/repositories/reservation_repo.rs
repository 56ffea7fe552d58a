//! Reservation repository implementation
//!
//! Provides PostgreSQL-backed reads for reservations. Mutations happen in
//! service-owned transactions so the ledger writes stay atomic.

use costera_core::{
    models::{PaymentStatus, Reservation, ReservationStatus, RoomCategory},
    traits::ReservationRepository,
    AppError, AppResult, Role,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of ReservationRepository
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new reservation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Column list shared by every reservation query
pub const RESERVATION_COLUMNS: &str = r#"
    id, user_id, branch_id, category,
    check_in, check_out, occupants, room_count,
    booked_as, status, payment_status,
    discount_percent, nightly_rate, remaining_balance,
    created_at, updated_at
"#;

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        debug!("Finding reservation by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding reservation {}: {}", id, e);
            AppError::Database(format!("Failed to find reservation: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        debug!(
            "Listing reservations for user {} limit {} offset {}",
            user_id, limit, offset
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(&format!(
            r#"
            SELECT {}
            FROM reservations
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing reservations: {}", e);
            AppError::Database(format!("Failed to list reservations: {}", e))
        })?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reservations WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting reservations: {}", e);
                    AppError::Database(format!("Failed to count reservations: {}", e))
                })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping database rows
///
/// Public so services can reuse the mapping for rows fetched inside their
/// own transactions (e.g. `SELECT ... FOR UPDATE`).
#[derive(Debug, sqlx::FromRow)]
pub struct ReservationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub branch_id: i32,
    pub category: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub occupants: i32,
    pub room_count: i32,
    pub booked_as: String,
    pub status: String,
    pub payment_status: String,
    pub discount_percent: Decimal,
    pub nightly_rate: Decimal,
    pub remaining_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            branch_id: row.branch_id,
            category: RoomCategory::from_str(&row.category).unwrap_or(RoomCategory::Single),
            check_in: row.check_in,
            check_out: row.check_out,
            occupants: row.occupants,
            room_count: row.room_count,
            booked_as: Role::from_str(&row.booked_as).unwrap_or(Role::Customer),
            status: ReservationStatus::from_str(&row.status)
                .unwrap_or(ReservationStatus::Pending),
            payment_status: PaymentStatus::from_str(&row.payment_status)
                .unwrap_or(PaymentStatus::Unpaid),
            discount_percent: row.discount_percent,
            nightly_rate: row.nightly_rate,
            remaining_balance: row.remaining_balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_conversion() {
        let now = Utc::now();
        let row = ReservationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            branch_id: 2,
            category: "suite".to_string(),
            check_in: "2026-09-01".parse().unwrap(),
            check_out: "2026-09-11".parse().unwrap(),
            occupants: 2,
            room_count: 1,
            booked_as: "customer".to_string(),
            status: "pending".to_string(),
            payment_status: "unpaid".to_string(),
            discount_percent: dec!(3),
            nightly_rate: dec!(200),
            remaining_balance: dec!(1940),
            created_at: now,
            updated_at: now,
        };

        let reservation: Reservation = row.into();
        assert_eq!(reservation.category, RoomCategory::Suite);
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.payment_status, PaymentStatus::Unpaid);
        assert_eq!(reservation.stay_days(), 10);
    }
}
