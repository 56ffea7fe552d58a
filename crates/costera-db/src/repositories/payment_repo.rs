//! Payment repository implementation

use costera_core::{
    models::{Payment, PaymentMethod, PaymentRecordStatus},
    traits::PaymentRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of PaymentRepository
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    #[instrument(skip(self))]
    async fn find_by_reservation(&self, reservation_id: Uuid) -> AppResult<Vec<Payment>> {
        debug!("Finding payments for reservation: {}", reservation_id);

        let rows = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            SELECT id, reservation_id, amount, method, card_suffix, status, created_at
            FROM payments
            WHERE reservation_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding payments: {}", e);
            AppError::Database(format!("Failed to find payments: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub card_suffix: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            reservation_id: row.reservation_id,
            amount: row.amount,
            method: PaymentMethod::from_str(&row.method).unwrap_or(PaymentMethod::CreditCard),
            card_suffix: row.card_suffix,
            status: PaymentRecordStatus::from_str(&row.status)
                .unwrap_or(PaymentRecordStatus::Pending),
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_conversion() {
        let row = PaymentRow {
            id: Uuid::new_v4(),
            reservation_id: Uuid::new_v4(),
            amount: dec!(70),
            method: "credit_card".to_string(),
            card_suffix: Some("1111".to_string()),
            status: "completed".to_string(),
            created_at: Utc::now(),
        };

        let payment: Payment = row.into();
        assert_eq!(payment.method, PaymentMethod::CreditCard);
        assert_eq!(payment.status, PaymentRecordStatus::Completed);
        assert_eq!(payment.card_suffix.as_deref(), Some("1111"));
    }
}
