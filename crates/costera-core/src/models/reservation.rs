//! Reservation model
//!
//! A reservation is the billing anchor: it carries the discounted
//! room-nights balance that service charges and surcharges accumulate onto.

use crate::context::Role;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Room category offered by every branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    Single,
    Double,
    Suite,
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomCategory::Single => write!(f, "single"),
            RoomCategory::Double => write!(f, "double"),
            RoomCategory::Suite => write!(f, "suite"),
        }
    }
}

impl RoomCategory {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" => Some(RoomCategory::Single),
            "double" => Some(RoomCategory::Double),
            "suite" => Some(RoomCategory::Suite),
            _ => None,
        }
    }

    /// Flat up-front reservation fee per room, never discounted
    pub fn reservation_fee(&self) -> Decimal {
        match self {
            RoomCategory::Single => Decimal::from(30),
            RoomCategory::Double => Decimal::from(50),
            RoomCategory::Suite => Decimal::from(70),
        }
    }
}

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Created, still editable and cancellable
    #[default]
    Pending,
    /// Fee paid, locked in
    Confirmed,
    /// Cancelled by the owner; rooms released, row kept
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl ReservationStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ReservationStatus::Pending),
            "confirmed" => Some(ReservationStatus::Confirmed),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }

    /// Edit and cancel are only allowed before confirmation
    pub fn is_mutable(&self) -> bool {
        matches!(self, ReservationStatus::Pending)
    }
}

/// Payment status of the reservation fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::Paid => write!(f, "paid"),
        }
    }
}

impl PaymentStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

/// Reservation entity
///
/// Lifecycle:
/// 1. Created on booking request (pending, bookings allocated)
/// 2. Confirmed when the reservation fee is paid
/// 3. Balance accumulates service charges and surcharges until checkout
/// 4. Cancellation is a status change, never a physical delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Branch where the rooms are located
    pub branch_id: i32,

    /// Room category for all rooms in this reservation
    pub category: RoomCategory,

    /// Arrival date (inclusive)
    pub check_in: NaiveDate,

    /// Departure date (exclusive)
    pub check_out: NaiveDate,

    /// Number of occupants
    pub occupants: i32,

    /// Number of rooms reserved
    pub room_count: i32,

    /// Role the reservation was booked under. Discount tiers key off the
    /// booker, so edits reprice with this role, not the editor's.
    pub booked_as: Role,

    /// Lifecycle status
    pub status: ReservationStatus,

    /// Whether the reservation fee has been paid
    pub payment_status: PaymentStatus,

    /// Applied discount percentage (0-25)
    pub discount_percent: Decimal,

    /// Nightly rate snapshot taken at booking time
    pub nightly_rate: Decimal,

    /// Discounted room-nights cost plus accumulated charges, due at checkout
    pub remaining_balance: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Stay length in whole days (date-only arithmetic)
    #[inline]
    pub fn stay_days(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Undiscounted room-nights cost
    pub fn base_amount(&self) -> Decimal {
        self.nightly_rate * Decimal::from(self.stay_days()) * Decimal::from(self.room_count)
    }

    /// Total flat reservation fee (per room, by category)
    pub fn reservation_fee(&self) -> Decimal {
        self.category.reservation_fee() * Decimal::from(self.room_count)
    }

    /// One night for all rooms at the discounted rate; the basis of the
    /// late-checkout surcharge and checkout-date extensions
    pub fn discounted_night(&self) -> Decimal {
        let factor = Decimal::ONE - self.discount_percent / Decimal::from(100);
        self.nightly_rate * Decimal::from(self.room_count) * factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reservation(rate: Decimal, days: i64, rooms: i32, discount: Decimal) -> Reservation {
        let check_in = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        Reservation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            branch_id: 1,
            category: RoomCategory::Suite,
            check_in,
            check_out: check_in + chrono::Duration::days(days),
            occupants: 2,
            room_count: rooms,
            booked_as: Role::Customer,
            status: ReservationStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            discount_percent: discount,
            nightly_rate: rate,
            remaining_balance: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stay_days() {
        let r = reservation(dec!(200), 10, 1, dec!(3));
        assert_eq!(r.stay_days(), 10);
    }

    #[test]
    fn test_base_amount() {
        let r = reservation(dec!(100), 8, 4, dec!(10));
        assert_eq!(r.base_amount(), dec!(3200));
    }

    #[test]
    fn test_reservation_fee_per_category() {
        assert_eq!(RoomCategory::Single.reservation_fee(), dec!(30));
        assert_eq!(RoomCategory::Double.reservation_fee(), dec!(50));
        assert_eq!(RoomCategory::Suite.reservation_fee(), dec!(70));

        let r = reservation(dec!(200), 10, 3, dec!(0));
        assert_eq!(r.reservation_fee(), dec!(210));
    }

    #[test]
    fn test_discounted_night() {
        // single room at $80, no discount: one late night costs 80
        let mut r = reservation(dec!(80), 3, 1, dec!(0));
        r.category = RoomCategory::Single;
        assert_eq!(r.discounted_night(), dec!(80));

        // 4 rooms at $100 with 10% discount
        let r = reservation(dec!(100), 8, 4, dec!(10));
        assert_eq!(r.discounted_night(), dec!(360.0));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(ReservationStatus::from_str(&status.to_string()), Some(status));
        }
        assert!(ReservationStatus::Pending.is_mutable());
        assert!(!ReservationStatus::Confirmed.is_mutable());
    }

    #[test]
    fn test_category_round_trip() {
        for cat in [RoomCategory::Single, RoomCategory::Double, RoomCategory::Suite] {
            assert_eq!(RoomCategory::from_str(&cat.to_string()), Some(cat));
        }
        assert_eq!(RoomCategory::from_str("penthouse"), None);
    }
}
