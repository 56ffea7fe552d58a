//! Business logic services for the Costera reservation engine
//!
//! This crate contains all the business logic that orchestrates the
//! reservation lifecycle and billing reconciliation.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service owns its dependencies (repositories, pool)
//! - Services are wrapped in Arc for safe sharing across async tasks
//! - All operations are instrumented with tracing
//! - Multi-write operations run inside a single database transaction:
//!   every ledger write commits together or not at all
//!
//! # Services
//!
//! - `discount` - Pure stay/volume discount tables
//! - `card` - Structural card validation (Luhn, brand, expiry, CVC)
//! - `AvailabilityMatcher` - Overlap-free room matching
//! - `ReservationWriter` - Reservation create/edit/cancel orchestration
//! - `PaymentRecorder` - Reservation-fee payment recording
//! - `BillingReconciler` - Service charges, surcharges, billing statements
//! - `CheckInOutTracker` - Arrival/departure state machine

pub mod availability;
pub mod billing_reconciler;
pub mod card;
pub mod checkinout;
pub mod discount;
pub mod payment_recorder;
pub mod reservation_writer;

pub use availability::AvailabilityMatcher;
pub use billing_reconciler::BillingReconciler;
pub use checkinout::CheckInOutTracker;
pub use payment_recorder::{PaymentOutcome, PaymentRecorder};
pub use reservation_writer::{ReservationQuote, ReservationRequest, ReservationWriter};

/// Business logic constants
pub mod constants {
    use chrono_tz::Tz;

    /// Minimum rooms on a single reservation
    pub const MIN_ROOMS_PER_RESERVATION: i32 = 1;

    /// Maximum rooms on a single reservation
    pub const MAX_ROOMS_PER_RESERVATION: i32 = 10;

    /// Hour of day (local property time) from which pay-at-checkout is
    /// blocked, inclusive
    pub const CASH_CUTOFF_START_HOUR: u32 = 19;

    /// Hour of day up to which the block applies, inclusive
    pub const CASH_CUTOFF_END_HOUR: u32 = 23;

    /// Cards expiring further out than this are rejected as implausible
    pub const MAX_CARD_EXPIRY_YEARS: i32 = 10;

    /// Timezone all branch properties operate in; business-hour rules and
    /// "today" comparisons evaluate against this zone
    pub const PROPERTY_TZ: Tz = chrono_tz::Asia::Kolkata;
}
