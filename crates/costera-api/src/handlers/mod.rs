//! HTTP request handlers

pub mod availability;
pub mod billing;
pub mod checkinout;
pub mod payment;
pub mod report;
pub mod reservation;

pub use availability::configure as configure_availability;
pub use billing::configure as configure_billings;
pub use checkinout::configure as configure_bookings;
pub use report::configure as configure_reports;
pub use reservation::configure as configure_reservations;
