//! Costera Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the Costera reservation engine. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for all domain entities
//! - Overlap-aware free-room queries with half-open interval semantics
//! - Transaction support for atomic ledger operations

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use costera_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
