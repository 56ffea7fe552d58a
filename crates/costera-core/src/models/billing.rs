//! Billing charge model
//!
//! Ad-hoc service charges and late-checkout surcharges accumulate onto the
//! parent reservation's remaining balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Chargeable service kinds
///
/// `LateCheckout` is reserved for the reconciler's surcharge path; ad-hoc
/// charge requests must use one of the six service kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Restaurant,
    RoomService,
    Laundry,
    Telephone,
    KeyIssuing,
    ClubFacility,
    LateCheckout,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Restaurant => write!(f, "restaurant"),
            ServiceType::RoomService => write!(f, "room_service"),
            ServiceType::Laundry => write!(f, "laundry"),
            ServiceType::Telephone => write!(f, "telephone"),
            ServiceType::KeyIssuing => write!(f, "key_issuing"),
            ServiceType::ClubFacility => write!(f, "club_facility"),
            ServiceType::LateCheckout => write!(f, "late_checkout"),
        }
    }
}

impl ServiceType {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "restaurant" => Some(ServiceType::Restaurant),
            "room_service" => Some(ServiceType::RoomService),
            "laundry" => Some(ServiceType::Laundry),
            "telephone" => Some(ServiceType::Telephone),
            "key_issuing" => Some(ServiceType::KeyIssuing),
            "club_facility" => Some(ServiceType::ClubFacility),
            "late_checkout" => Some(ServiceType::LateCheckout),
            _ => None,
        }
    }

    /// Whether guests/clerks may request this charge directly
    pub fn is_ad_hoc(&self) -> bool {
        !matches!(self, ServiceType::LateCheckout)
    }
}

/// Billing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingStatus::Pending => write!(f, "pending"),
            BillingStatus::Paid => write!(f, "paid"),
            BillingStatus::Overdue => write!(f, "overdue"),
        }
    }
}

impl BillingStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BillingStatus::Pending),
            "paid" => Some(BillingStatus::Paid),
            "overdue" => Some(BillingStatus::Overdue),
            _ => None,
        }
    }
}

/// Billing charge entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingCharge {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Parent reservation
    pub reservation_id: Uuid,

    /// What was charged
    pub service_type: ServiceType,

    /// Fee amount; surcharge rows accumulate across late checkouts
    pub fee: Decimal,

    /// Settlement status
    pub status: BillingStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl BillingCharge {
    /// Create a new pending charge
    pub fn new(reservation_id: Uuid, service_type: ServiceType, fee: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reservation_id,
            service_type,
            fee,
            status: BillingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
