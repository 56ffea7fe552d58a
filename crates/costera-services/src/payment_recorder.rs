//! Payment recorder
//!
//! Settles the flat reservation fee. A card payment charges the fee
//! immediately and confirms the reservation; pay-at-checkout defers the
//! whole amount and is blocked during the evening restriction window.
//!
//! One payment row per reservation, immutable after creation.

use chrono::{NaiveDate, NaiveTime, Timelike, Utc};
use costera_core::{
    models::{PaymentMethod, PaymentRecordStatus, Reservation, ReservationStatus},
    AppError, AppResult, RequestContext,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::card::{validate_card_at, CardDetails};
use crate::constants::{CASH_CUTOFF_END_HOUR, CASH_CUTOFF_START_HOUR, PROPERTY_TZ};
use crate::reservation_writer::lock_reservation;

/// Outcome of a fee settlement
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub payment_id: Uuid,
    pub method: PaymentMethod,
    pub status: PaymentRecordStatus,
    /// What was actually charged now; zero for pay-at-checkout
    pub amount_charged: Decimal,
    /// What remains due at checkout
    pub balance_due: Decimal,
    pub card_suffix: Option<String>,
}

/// Pay-at-checkout is refused during the 19:00-23:59 property-local
/// window. Business policy, enforced identically everywhere.
pub fn cash_blocked_at(time: NaiveTime) -> bool {
    (CASH_CUTOFF_START_HOUR..=CASH_CUTOFF_END_HOUR).contains(&time.hour())
}

/// Settle the fee inside an already-open transaction
///
/// Shared by the standalone payment endpoint and the reservation writer,
/// which settles card payments in the same transaction as the insert.
pub(crate) async fn settle_fee_tx(
    tx: &mut Transaction<'_, Postgres>,
    reservation: &Reservation,
    method: PaymentMethod,
    card: Option<&CardDetails>,
    today: NaiveDate,
    local_time: NaiveTime,
) -> AppResult<PaymentOutcome> {
    let fee = reservation.reservation_fee();

    let (status, amount_charged, balance_due, card_suffix) = match method {
        PaymentMethod::CreditCard => {
            let card = card.ok_or_else(|| {
                AppError::validation("Card details are required for credit card payment")
            })?;
            let validated = validate_card_at(card, today)?;
            (
                PaymentRecordStatus::Completed,
                fee,
                reservation.remaining_balance,
                Some(validated.suffix),
            )
        }
        PaymentMethod::WithoutCreditCard => {
            if cash_blocked_at(local_time) {
                warn!(
                    "Refused pay-at-checkout for reservation {} at {}",
                    reservation.id, local_time
                );
                return Err(AppError::TimeWindowRestriction(format!(
                    "Pay-at-checkout is unavailable between {}:00 and {}:59",
                    CASH_CUTOFF_START_HOUR, CASH_CUTOFF_END_HOUR
                )));
            }
            (
                PaymentRecordStatus::Pending,
                Decimal::ZERO,
                reservation.remaining_balance + fee,
                None,
            )
        }
    };

    let payment_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO payments (id, reservation_id, amount, method, card_suffix, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        "#,
    )
    .bind(payment_id)
    .bind(reservation.id)
    .bind(fee)
    .bind(method.to_string())
    .bind(card_suffix.as_deref())
    .bind(status.to_string())
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert payment: {}", e)))?;

    if status == PaymentRecordStatus::Completed {
        // a settled fee also confirms a still-pending reservation
        sqlx::query(
            r#"
            UPDATE reservations
            SET payment_status = 'paid',
                status = CASE WHEN status = 'pending' THEN 'confirmed' ELSE status END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(reservation.id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update payment status: {}", e)))?;
    }

    Ok(PaymentOutcome {
        payment_id,
        method,
        status,
        amount_charged,
        balance_due,
        card_suffix,
    })
}

/// Records reservation-fee payments
pub struct PaymentRecorder {
    pool: PgPool,
}

impl PaymentRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settle the reservation fee for an existing reservation
    #[instrument(skip(self, ctx, card))]
    pub async fn record(
        &self,
        ctx: &RequestContext,
        reservation_id: Uuid,
        method: PaymentMethod,
        card: Option<&CardDetails>,
    ) -> AppResult<PaymentOutcome> {
        let now_local = Utc::now().with_timezone(&PROPERTY_TZ);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        let reservation = lock_reservation(&mut tx, reservation_id).await?;
        ctx.authorize_owner(reservation.user_id)?;

        if reservation.status == ReservationStatus::Cancelled {
            return Err(AppError::Authorization(
                "Cancelled reservations cannot be paid".to_string(),
            ));
        }

        let existing: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM payments WHERE reservation_id = $1")
                .bind(reservation_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| AppError::Database(format!("Failed to check payments: {}", e)))?;
        if existing.0 > 0 {
            return Err(AppError::Conflict(
                "A payment has already been recorded for this reservation".to_string(),
            ));
        }

        let outcome = settle_fee_tx(
            &mut tx,
            &reservation,
            method,
            card,
            now_local.date_naive(),
            now_local.time(),
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        info!(
            "Recorded {} payment {} for reservation {}: charged {}, due {}",
            method, outcome.payment_id, reservation_id, outcome.amount_charged, outcome.balance_due
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_cash_window_boundaries() {
        assert!(!cash_blocked_at(time(18, 59)));
        assert!(cash_blocked_at(time(19, 0)));
        assert!(cash_blocked_at(time(21, 30)));
        assert!(cash_blocked_at(time(23, 59)));
        // midnight reopens the window
        assert!(!cash_blocked_at(time(0, 0)));
        assert!(!cash_blocked_at(time(9, 15)));
    }
}
