//! Data Transfer Objects (DTOs) for API requests and responses

pub mod billing;
pub mod checkinout;
pub mod common;
pub mod payment;
pub mod report;
pub mod reservation;

pub use billing::*;
pub use checkinout::*;
pub use common::*;
pub use payment::*;
pub use report::*;
pub use reservation::*;
