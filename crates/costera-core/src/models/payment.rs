//! Payment model
//!
//! One payment row per reservation-fee charge. Rows are immutable after
//! creation; there is no void or refund flow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// How the reservation fee is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Fee charged up front against a validated card
    CreditCard,
    /// Full balance due at checkout
    WithoutCreditCard,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CreditCard => write!(f, "credit_card"),
            PaymentMethod::WithoutCreditCard => write!(f, "without_credit_card"),
        }
    }
}

impl PaymentMethod {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "credit_card" => Some(PaymentMethod::CreditCard),
            "without_credit_card" => Some(PaymentMethod::WithoutCreditCard),
            _ => None,
        }
    }
}

/// Status of a recorded payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentRecordStatus {
    /// Card payment, settled
    Completed,
    /// Pay-at-checkout, still owed
    Pending,
}

impl fmt::Display for PaymentRecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentRecordStatus::Completed => write!(f, "completed"),
            PaymentRecordStatus::Pending => write!(f, "pending"),
        }
    }
}

impl PaymentRecordStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "completed" => Some(PaymentRecordStatus::Completed),
            "pending" => Some(PaymentRecordStatus::Pending),
            _ => None,
        }
    }
}

/// Payment entity, tied to exactly one reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Parent reservation
    pub reservation_id: Uuid,

    /// Amount charged (the reservation fee, never the stay balance)
    pub amount: Decimal,

    /// Payment method
    pub method: PaymentMethod,

    /// Last four digits of the card, when paid by card
    pub card_suffix: Option<String>,

    /// Payment status
    pub status: PaymentRecordStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Mask a card number down to its stored suffix
    pub fn mask_card(number: &str) -> Option<String> {
        let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= 4 {
            Some(digits[digits.len() - 4..].to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_card() {
        assert_eq!(
            Payment::mask_card("4111 1111 1111 1111"),
            Some("1111".to_string())
        );
        assert_eq!(
            Payment::mask_card("378282246310005"),
            Some("0005".to_string())
        );
        assert_eq!(Payment::mask_card("12"), None);
    }

    #[test]
    fn test_method_round_trip() {
        for method in [PaymentMethod::CreditCard, PaymentMethod::WithoutCreditCard] {
            assert_eq!(PaymentMethod::from_str(&method.to_string()), Some(method));
        }
        assert_eq!(PaymentMethod::from_str("barter"), None);
    }
}
