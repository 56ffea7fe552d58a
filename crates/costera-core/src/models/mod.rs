//! Domain models for the Costera reservation engine
//!
//! This module contains all the core domain models used throughout the application.

pub mod billing;
pub mod booking;
pub mod payment;
pub mod reservation;
pub mod room;

pub use billing::{BillingCharge, BillingStatus, ServiceType};
pub use booking::{Booking, BookingStatus, CheckInOutRecord};
pub use payment::{Payment, PaymentMethod, PaymentRecordStatus};
pub use reservation::{PaymentStatus, Reservation, ReservationStatus, RoomCategory};
pub use room::{Room, RoomStatus};
