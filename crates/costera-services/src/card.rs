//! Card validation
//!
//! Brand detection, Luhn checksum and expiry/CVV checks. Nothing here
//! talks to a payment gateway, the checks are purely structural.

use chrono::{Datelike, NaiveDate};
use costera_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MAX_CARD_EXPIRY_YEARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardBrand::Visa => write!(f, "visa"),
            CardBrand::Mastercard => write!(f, "mastercard"),
            CardBrand::Amex => write!(f, "amex"),
            CardBrand::Discover => write!(f, "discover"),
        }
    }
}

impl CardBrand {
    pub fn cvv_length(&self) -> usize {
        match self {
            CardBrand::Amex => 4,
            _ => 3,
        }
    }
}

/// Raw card details as submitted by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub holder_name: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
}

/// A card that passed every structural check
#[derive(Debug, Clone)]
pub struct ValidatedCard {
    pub brand: CardBrand,
    /// Last four digits, the only part of the number ever stored
    pub suffix: String,
}

/// Luhn checksum over the card digits
pub fn luhn_valid(digits: &[u8]) -> bool {
    if digits.is_empty() {
        return false;
    }
    let mut sum = 0u32;
    let mut double = false;
    for &d in digits.iter().rev() {
        let mut v = u32::from(d);
        if double {
            v *= 2;
            if v > 9 {
                v -= 9;
            }
        }
        sum += v;
        double = !double;
    }
    sum % 10 == 0
}

/// Brand from prefix and length, `None` when no issuer matches
pub fn detect_brand(digits: &[u8]) -> Option<CardBrand> {
    let len = digits.len();
    match digits {
        [4, ..] if len == 13 || len == 16 => Some(CardBrand::Visa),
        [5, b, ..] if (1..=5).contains(b) && len == 16 => Some(CardBrand::Mastercard),
        [3, 4, ..] | [3, 7, ..] if len == 15 => Some(CardBrand::Amex),
        [6, 0, 1, 1, ..] | [6, 5, ..] if len == 16 => Some(CardBrand::Discover),
        _ => None,
    }
}

/// Validate a card against a reference date
///
/// Failures are collected rather than returned on first hit, so the
/// caller sees every problem at once. An unrecognised issuer short
/// circuits since the remaining checks are brand dependent.
pub fn validate_card_at(card: &CardDetails, today: NaiveDate) -> AppResult<ValidatedCard> {
    let number: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::CardValidation(vec![
            "Card number must contain only digits".to_string(),
        ]));
    }
    let digits: Vec<u8> = number.bytes().map(|b| b - b'0').collect();

    let brand = detect_brand(&digits).ok_or_else(|| {
        // never echo the full number back
        let prefix: String = number.chars().take(2).collect();
        AppError::UnsupportedCardType(format!("no issuer matches prefix {}*", prefix))
    })?;

    let mut errors = Vec::new();

    if !luhn_valid(&digits) {
        errors.push("Card number failed checksum verification".to_string());
    }

    if card.holder_name.trim().is_empty() {
        errors.push("Cardholder name is required".to_string());
    }

    if !(1..=12).contains(&card.expiry_month) {
        errors.push("Expiry month must be between 1 and 12".to_string());
    } else {
        let expired = card.expiry_year < today.year()
            || (card.expiry_year == today.year() && card.expiry_month < today.month());
        if expired {
            errors.push("Card is expired".to_string());
        } else if card.expiry_year > today.year() + MAX_CARD_EXPIRY_YEARS {
            errors.push(format!(
                "Expiry year cannot be more than {} years in the future",
                MAX_CARD_EXPIRY_YEARS
            ));
        }
    }

    if card.cvv.len() != brand.cvv_length() || !card.cvv.chars().all(|c| c.is_ascii_digit()) {
        errors.push(format!("CVV must be {} digits for {}", brand.cvv_length(), brand));
    }

    if !errors.is_empty() {
        return Err(AppError::CardValidation(errors));
    }

    let suffix = number[number.len() - 4..].to_string();
    Ok(ValidatedCard { brand, suffix })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn digits(s: &str) -> Vec<u8> {
        s.bytes().map(|b| b - b'0').collect()
    }

    fn card(number: &str) -> CardDetails {
        CardDetails {
            number: number.to_string(),
            holder_name: "Priya Sharma".to_string(),
            expiry_month: 12,
            expiry_year: 2030,
            cvv: "123".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_luhn_known_numbers() {
        assert!(luhn_valid(&digits("4532015112830366")));
        assert!(luhn_valid(&digits("5425233430109903")));
        assert!(luhn_valid(&digits("374245455400126")));
        assert!(!luhn_valid(&digits("4532015112830367")));
        assert!(!luhn_valid(&[]));
    }

    #[test]
    fn test_brand_detection() {
        assert_eq!(detect_brand(&digits("4532015112830366")), Some(CardBrand::Visa));
        assert_eq!(detect_brand(&digits("4222222222222")), Some(CardBrand::Visa));
        assert_eq!(detect_brand(&digits("5425233430109903")), Some(CardBrand::Mastercard));
        assert_eq!(detect_brand(&digits("374245455400126")), Some(CardBrand::Amex));
        assert_eq!(detect_brand(&digits("6011000990139424")), Some(CardBrand::Discover));
        assert_eq!(detect_brand(&digits("6500000000000002")), Some(CardBrand::Discover));
        // right prefix, wrong length
        assert_eq!(detect_brand(&digits("45320151128303")), None);
        assert_eq!(detect_brand(&digits("9999999999999999")), None);
    }

    #[test]
    fn test_validate_happy_path() {
        let validated = validate_card_at(&card("4532015112830366"), today()).unwrap();
        assert_eq!(validated.brand, CardBrand::Visa);
        assert_eq!(validated.suffix, "0366");
    }

    #[test]
    fn test_unsupported_brand() {
        let err = validate_card_at(&card("9999999999999999"), today()).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedCardType(_)));
    }

    #[test]
    fn test_errors_are_collected() {
        let mut c = card("4532015112830367");
        c.holder_name = "  ".to_string();
        c.expiry_year = 2024;
        let err = validate_card_at(&c, today()).unwrap_err();
        match err {
            AppError::CardValidation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_expiry_window() {
        let mut c = card("4532015112830366");
        c.expiry_month = 2;
        c.expiry_year = 2026;
        assert!(validate_card_at(&c, today()).is_err());

        // same month as today still passes
        c.expiry_month = 3;
        assert!(validate_card_at(&c, today()).is_ok());

        c.expiry_year = 2037;
        c.expiry_month = 12;
        assert!(validate_card_at(&c, today()).is_err());
    }

    #[test]
    fn test_amex_cvv_length() {
        let mut c = card("374245455400126");
        assert!(validate_card_at(&c, today()).is_err());
        c.cvv = "1234".to_string();
        assert!(validate_card_at(&c, today()).is_ok());
    }

    proptest! {
        /// Mutating any single digit of a Luhn-valid number breaks the
        /// checksum.
        #[test]
        fn prop_luhn_detects_single_digit_mutation(pos in 0usize..16, delta in 1u8..10) {
            let mut ds = digits("4532015112830366");
            ds[pos] = (ds[pos] + delta) % 10;
            prop_assert!(!luhn_valid(&ds));
        }

        /// Valid brands survive re-detection after whitespace insertion
        /// in the submitted number.
        #[test]
        fn prop_whitespace_is_ignored(split in 1usize..15) {
            let raw = "4532015112830366";
            let spaced = format!("{} {}", &raw[..split], &raw[split..]);
            let validated = validate_card_at(&card(&spaced), today()).unwrap();
            prop_assert_eq!(validated.brand, CardBrand::Visa);
        }
    }
}
