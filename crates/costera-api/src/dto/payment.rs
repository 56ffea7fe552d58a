//! Payment DTOs

use chrono::{DateTime, Utc};
use costera_core::models::Payment;
use costera_services::card::CardDetails;
use costera_services::payment_recorder::PaymentOutcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settle the reservation fee
#[derive(Debug, Deserialize)]
pub struct PayReservationRequest {
    pub payment_method: String,
    pub card: Option<CardDetails>,
}

/// Outcome of a fee settlement
#[derive(Debug, Serialize)]
pub struct PaymentOutcomeResponse {
    pub payment_id: Uuid,
    pub method: String,
    pub status: String,
    pub amount_charged: Decimal,
    pub balance_due: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_suffix: Option<String>,
}

impl From<PaymentOutcome> for PaymentOutcomeResponse {
    fn from(o: PaymentOutcome) -> Self {
        Self {
            payment_id: o.payment_id,
            method: o.method.to_string(),
            status: o.status.to_string(),
            amount_charged: o.amount_charged,
            balance_due: o.balance_due,
            card_suffix: o.card_suffix,
        }
    }
}

/// Stored payment row
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_suffix: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            reservation_id: p.reservation_id,
            amount: p.amount,
            method: p.method.to_string(),
            card_suffix: p.card_suffix,
            status: p.status.to_string(),
            created_at: p.created_at,
        }
    }
}
