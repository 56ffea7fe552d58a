//! Costera Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Costera reservation and billing engine. It includes:
//!
//! - Domain models (Reservation, Booking, Room, Payment, BillingCharge, etc.)
//! - Common traits for repositories
//! - Unified error handling with HTTP response mapping
//! - Request context carrying the authenticated caller
//! - Application configuration

pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use context::{RequestContext, Role};
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
