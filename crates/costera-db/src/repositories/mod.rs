//! Repository implementations
//!
//! This module contains concrete implementations of the repository traits
//! defined in costera-core, using sqlx for PostgreSQL access.

pub mod billing_repo;
pub mod booking_repo;
pub mod check_in_out_repo;
pub mod payment_repo;
pub mod reservation_repo;
pub mod room_repo;

pub use billing_repo::PgBillingRepository;
pub use booking_repo::PgBookingRepository;
pub use check_in_out_repo::PgCheckInOutRepository;
pub use payment_repo::PgPaymentRepository;
pub use reservation_repo::PgReservationRepository;
pub use room_repo::PgRoomRepository;
