//! API layer for the Costera reservation engine
//!
//! HTTP handlers for availability, reservations, payments, billing and
//! check-in/out operations.

#![forbid(unsafe_code)]

pub mod dto;
pub mod extract;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};
pub use extract::Caller;

// Re-export handler configuration functions
pub use handlers::{
    configure_availability, configure_billings, configure_bookings, configure_reports,
    configure_reservations,
};
