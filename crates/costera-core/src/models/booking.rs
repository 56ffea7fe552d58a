//! Booking and check-in/out models
//!
//! A booking ties a reservation's date range to one physical room. It is
//! the unit overlap detection runs against and the anchor for arrival and
//! departure records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BookingStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// Room assignment for a reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Parent reservation
    pub reservation_id: Uuid,

    /// Assigned physical room
    pub room_id: i32,

    /// Arrival date (inclusive)
    pub check_in: NaiveDate,

    /// Departure date (exclusive)
    pub check_out: NaiveDate,

    /// Occupants assigned to this room
    pub occupants: i32,

    /// Booking status
    pub status: BookingStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Arrival/departure record for one booking
///
/// Created on first check-in. The check-out timestamp is set once and
/// never reset; that write is the idempotency boundary for the
/// late-checkout surcharge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInOutRecord {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub check_in_at: Option<DateTime<Utc>>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckInOutRecord {
    /// Guest has arrived and not yet departed
    pub fn is_checked_in(&self) -> bool {
        self.check_in_at.is_some() && self.check_out_at.is_none()
    }

    /// Departure recorded; terminal state
    pub fn is_checked_out(&self) -> bool {
        self.check_out_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_out_state() {
        let mut rec = CheckInOutRecord {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            check_in_at: None,
            check_out_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!rec.is_checked_in());
        assert!(!rec.is_checked_out());

        rec.check_in_at = Some(Utc::now());
        assert!(rec.is_checked_in());

        rec.check_out_at = Some(Utc::now());
        assert!(!rec.is_checked_in());
        assert!(rec.is_checked_out());
    }
}
