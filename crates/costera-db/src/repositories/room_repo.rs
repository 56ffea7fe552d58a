//! Room repository implementation
//!
//! The free-room query is the heart of the availability check: a room
//! qualifies when its status is available and no confirmed booking
//! overlaps the requested half-open date range.

use costera_core::{
    models::{Room, RoomCategory, RoomStatus},
    traits::RoomRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of RoomRepository
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new room repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Free-room predicate shared with the writer's locked variant.
/// Ordering by room id keeps the result deterministic regardless of how
/// the selection is iterated afterwards.
pub const FREE_ROOMS_SQL: &str = r#"
    SELECT r.id, r.branch_id, r.category, r.status, r.nightly_rate
    FROM rooms r
    WHERE r.branch_id = $1
      AND r.category = $2
      AND r.status = 'available'
      AND NOT EXISTS (
          SELECT 1
          FROM bookings b
          WHERE b.room_id = r.id
            AND b.status = 'confirmed'
            AND b.check_in < $4
            AND b.check_out > $3
      )
    ORDER BY r.id
    LIMIT $5
"#;

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self))]
    async fn find_free(
        &self,
        branch_id: i32,
        category: RoomCategory,
        check_in: NaiveDate,
        check_out: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<Room>> {
        debug!(
            "Finding free {} rooms in branch {} for [{}, {})",
            category, branch_id, check_in, check_out
        );

        let rows = sqlx::query_as::<sqlx::Postgres, RoomRow>(FREE_ROOMS_SQL)
            .bind(branch_id)
            .bind(category.to_string())
            .bind(check_in)
            .bind(check_out)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding free rooms: {}", e);
                AppError::Database(format!("Failed to find free rooms: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
pub struct RoomRow {
    pub id: i32,
    pub branch_id: i32,
    pub category: String,
    pub status: String,
    pub nightly_rate: Decimal,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: row.id,
            branch_id: row.branch_id,
            category: RoomCategory::from_str(&row.category).unwrap_or(RoomCategory::Single),
            status: RoomStatus::from_str(&row.status).unwrap_or(RoomStatus::Available),
            nightly_rate: row.nightly_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_conversion() {
        let row = RoomRow {
            id: 12,
            branch_id: 3,
            category: "double".to_string(),
            status: "occupied".to_string(),
            nightly_rate: dec!(100),
        };

        let room: Room = row.into();
        assert_eq!(room.category, RoomCategory::Double);
        assert_eq!(room.status, RoomStatus::Occupied);
        assert_eq!(room.nightly_rate, dec!(100));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_find_free_deterministic_order() {
        use costera_core::config::DatabaseConfig;

        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/costera_portal".to_string());
        let pool = crate::create_pool(&DatabaseConfig {
            url,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        })
        .await
        .unwrap();

        // use a branch id no fixture touches
        let branch_id = 9901;
        let mut inserted = Vec::new();
        for _ in 0..3 {
            let row: (i32,) = sqlx::query_as(
                "INSERT INTO rooms (branch_id, category, status, nightly_rate)
                 VALUES ($1, 'single', 'available', 75) RETURNING id",
            )
            .bind(branch_id)
            .fetch_one(&pool)
            .await
            .unwrap();
            inserted.push(row.0);
        }

        let repo = PgRoomRepository::new(pool.clone());
        let check_in: NaiveDate = "2026-10-01".parse().unwrap();
        let check_out: NaiveDate = "2026-10-04".parse().unwrap();

        // repeated queries hand back the same rooms in id order, so the
        // result depends only on the free set, not on scan order
        let first = repo
            .find_free(branch_id, RoomCategory::Single, check_in, check_out, 10)
            .await
            .unwrap();
        let second = repo
            .find_free(branch_id, RoomCategory::Single, check_in, check_out, 10)
            .await
            .unwrap();

        let first_ids: Vec<i32> = first.iter().map(|r| r.id).collect();
        let second_ids: Vec<i32> = second.iter().map(|r| r.id).collect();
        let mut expected = inserted.clone();
        expected.sort_unstable();
        assert_eq!(first_ids, expected);
        assert_eq!(first_ids, second_ids);

        sqlx::query("DELETE FROM rooms WHERE branch_id = $1")
            .bind(branch_id)
            .execute(&pool)
            .await
            .unwrap();
    }
}
