//! Check-in/out DTOs

use chrono::{DateTime, NaiveDate, Utc};
use costera_core::models::{Booking, CheckInOutRecord};
use costera_services::checkinout::{CheckoutOutcome, ExtensionOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Move a booking's departure date
#[derive(Debug, Deserialize)]
pub struct UpdateCheckoutRequest {
    pub new_check_out: NaiveDate,
}

/// Booking response DTO
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub room_id: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub occupants: i32,
    pub status: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            reservation_id: b.reservation_id,
            room_id: b.room_id,
            check_in: b.check_in,
            check_out: b.check_out,
            occupants: b.occupants,
            status: b.status.to_string(),
        }
    }
}

/// Arrival/departure record response
#[derive(Debug, Serialize)]
pub struct CheckInOutResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub check_in_at: Option<DateTime<Utc>>,
    pub check_out_at: Option<DateTime<Utc>>,
}

impl From<CheckInOutRecord> for CheckInOutResponse {
    fn from(r: CheckInOutRecord) -> Self {
        Self {
            id: r.id,
            booking_id: r.booking_id,
            check_in_at: r.check_in_at,
            check_out_at: r.check_out_at,
        }
    }
}

/// Check-out result, including any late-departure surcharge
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub booking_id: Uuid,
    pub surcharge_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Decimal>,
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(o: CheckoutOutcome) -> Self {
        Self {
            booking_id: o.booking_id,
            surcharge_applied: o.surcharge.is_some(),
            surcharge: o.surcharge,
        }
    }
}

/// Checkout-date extension result
#[derive(Debug, Serialize)]
pub struct ExtensionResponse {
    pub booking_id: Uuid,
    pub new_check_out: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge: Option<Decimal>,
}

impl From<ExtensionOutcome> for ExtensionResponse {
    fn from(o: ExtensionOutcome) -> Self {
        Self {
            booking_id: o.booking_id,
            new_check_out: o.new_check_out,
            charge: o.charge,
        }
    }
}
