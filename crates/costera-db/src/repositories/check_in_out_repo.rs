//! Check-in/out record repository implementation

use costera_core::{models::CheckInOutRecord, traits::CheckInOutRepository, AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of CheckInOutRepository
pub struct PgCheckInOutRepository {
    pool: PgPool,
}

impl PgCheckInOutRepository {
    /// Create a new check-in/out repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInOutRepository for PgCheckInOutRepository {
    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<CheckInOutRecord>> {
        debug!("Finding check-in/out record for booking: {}", booking_id);

        let result = sqlx::query_as::<sqlx::Postgres, CheckInOutRow>(
            r#"
            SELECT id, booking_id, check_in_at, check_out_at, created_at, updated_at
            FROM check_in_out
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding check-in/out record: {}", e);
            AppError::Database(format!("Failed to find check-in/out record: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
pub struct CheckInOutRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub check_in_at: Option<DateTime<Utc>>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CheckInOutRow> for CheckInOutRecord {
    fn from(row: CheckInOutRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            check_in_at: row.check_in_at,
            check_out_at: row.check_out_at,
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
        let row = CheckInOutRow {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            check_in_at: Some(now),
            check_out_at: None,
            created_at: now,
            updated_at: now,
        };

        let record: CheckInOutRecord = row.into();
        assert!(record.is_checked_in());
        assert!(!record.is_checked_out());
    }
}
