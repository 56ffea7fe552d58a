//! Unified error handling for the Costera engine
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Validation Errors ====================
    /// Field-level validation failures, reported together rather than
    /// failing fast on the first one.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Business Logic Errors ====================
    #[error("Insufficient rooms: requested {needed}, available {available}")]
    Availability { needed: i32, available: i64 },

    #[error("Unsupported card type: {0}")]
    UnsupportedCardType(String),

    #[error("Card validation failed: {}", .0.join("; "))]
    CardValidation(Vec<String>),

    #[error("Payment window restriction: {0}")]
    TimeWindowRestriction(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Billing charge not found: {0}")]
    BillingNotFound(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Convenience constructor for a single validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::CardValidation(_)
            | AppError::UnsupportedCardType(_) => StatusCode::BAD_REQUEST,

            // 403 Forbidden
            AppError::Authorization(_) | AppError::TimeWindowRestriction(_) => {
                StatusCode::FORBIDDEN
            }

            // 404 Not Found
            AppError::ReservationNotFound(_)
            | AppError::BookingNotFound(_)
            | AppError::BillingNotFound(_)
            | AppError::RoomNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Conflict(_) | AppError::Availability { .. } => StatusCode::CONFLICT,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Availability { .. } => "insufficient_rooms",
            AppError::UnsupportedCardType(_) => "unsupported_card_type",
            AppError::CardValidation(_) => "card_validation_error",
            AppError::TimeWindowRestriction(_) => "time_window_restriction",
            AppError::Authorization(_) => "not_authorized",
            AppError::ReservationNotFound(_) => "reservation_not_found",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::BillingNotFound(_) => "billing_not_found",
            AppError::RoomNotFound(_) => "room_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Details payload for list-style errors, `None` otherwise
    fn details(&self) -> Option<Vec<String>> {
        match self {
            AppError::Validation(items) | AppError::CardValidation(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Persistence failures are logged in full but surfaced generically.
        let message = match self {
            AppError::Database(_) | AppError::Pool(_) | AppError::Transaction(_) => {
                tracing::error!("storage failure: {}", self);
                "A storage error occurred, please retry later".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "error": self.error_code(),
            "message": message,
            "status": status.as_u16(),
        });

        if let Some(details) = self.details() {
            body["details"] = json!(details);
        }

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |e| match &e.message {
                        Some(msg) => format!("{}: {}", field, msg),
                        None => format!("{}: invalid value", field),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        AppError::Validation(messages)
    }
}
