//! Billing DTOs

use chrono::{DateTime, Utc};
use costera_core::{
    models::{BillingCharge, BillingStatus, ServiceType},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Add an ad-hoc service charge
#[derive(Debug, Deserialize)]
pub struct AddChargeRequest {
    pub service_type: String,
    pub fee: Decimal,
}

impl AddChargeRequest {
    pub fn parse_service_type(&self) -> AppResult<ServiceType> {
        ServiceType::from_str(&self.service_type)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown service type: {}", self.service_type)))
    }
}

/// Clerk status transition on a charge
#[derive(Debug, Deserialize)]
pub struct MarkBillingStatusRequest {
    pub status: String,
}

impl MarkBillingStatusRequest {
    pub fn parse_status(&self) -> AppResult<BillingStatus> {
        BillingStatus::from_str(&self.status)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown billing status: {}", self.status)))
    }
}

/// Billing charge response DTO
#[derive(Debug, Serialize)]
pub struct BillingResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub service_type: String,
    pub fee: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BillingCharge> for BillingResponse {
    fn from(c: BillingCharge) -> Self {
        Self {
            id: c.id,
            reservation_id: c.reservation_id,
            service_type: c.service_type.to_string(),
            fee: c.fee,
            status: c.status.to_string(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Itemized statement for one reservation
#[derive(Debug, Serialize)]
pub struct StatementResponse {
    pub reservation_id: Uuid,
    pub charges: Vec<BillingResponse>,
    /// Sum of still-pending charges
    pub pending_total: Decimal,
    /// Balance currently carried on the reservation
    pub remaining_balance: Decimal,
}
