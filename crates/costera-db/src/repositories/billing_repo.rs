//! Billing charge repository implementation

use costera_core::{
    models::{BillingCharge, BillingStatus, ServiceType},
    traits::BillingRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of BillingRepository
pub struct PgBillingRepository {
    pool: PgPool,
}

impl PgBillingRepository {
    /// Create a new billing repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Column list shared by every billing query
pub const BILLING_COLUMNS: &str =
    "id, reservation_id, service_type, fee, status, created_at, updated_at";

#[async_trait]
impl BillingRepository for PgBillingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<BillingCharge>> {
        debug!("Finding billing charge by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BillingRow>(&format!(
            "SELECT {} FROM billings WHERE id = $1",
            BILLING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding billing charge {}: {}", id, e);
            AppError::Database(format!("Failed to find billing charge: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_by_reservation(&self, reservation_id: Uuid) -> AppResult<Vec<BillingCharge>> {
        debug!("Listing charges for reservation: {}", reservation_id);

        let rows = sqlx::query_as::<sqlx::Postgres, BillingRow>(&format!(
            r#"
            SELECT {}
            FROM billings
            WHERE reservation_id = $1
            ORDER BY created_at
            "#,
            BILLING_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing charges: {}", e);
            AppError::Database(format!("Failed to list charges: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
pub struct BillingRow {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub service_type: String,
    pub fee: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BillingRow> for BillingCharge {
    fn from(row: BillingRow) -> Self {
        Self {
            id: row.id,
            reservation_id: row.reservation_id,
            service_type: ServiceType::from_str(&row.service_type)
                .unwrap_or(ServiceType::RoomService),
            fee: row.fee,
            status: BillingStatus::from_str(&row.status).unwrap_or(BillingStatus::Pending),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
