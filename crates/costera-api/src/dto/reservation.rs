//! Reservation DTOs

use chrono::{DateTime, NaiveDate, Utc};
use costera_core::{
    models::{PaymentMethod, Reservation, RoomCategory},
    AppError, AppResult,
};
use costera_services::card::CardDetails;
use costera_services::reservation_writer::{ReservationQuote, ReservationRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create a reservation
///
/// Enumerated fields arrive as strings and are validated at this boundary
/// before they reach any persistence logic.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub branch_id: i32,
    pub category: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub occupants: i32,
    pub room_count: i32,
    pub payment_method: String,
    pub card: Option<CardDetails>,
}

impl CreateReservationRequest {
    pub fn parse(&self) -> AppResult<(ReservationRequest, PaymentMethod)> {
        let category = parse_category(&self.category)?;
        let method = parse_method(&self.payment_method)?;
        Ok((
            ReservationRequest {
                branch_id: self.branch_id,
                category,
                check_in: self.check_in,
                check_out: self.check_out,
                occupants: self.occupants,
                room_count: self.room_count,
            },
            method,
        ))
    }
}

/// Edit a pending reservation
#[derive(Debug, Deserialize)]
pub struct EditReservationRequest {
    pub branch_id: i32,
    pub category: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub occupants: i32,
    pub room_count: i32,
}

impl EditReservationRequest {
    pub fn parse(&self) -> AppResult<ReservationRequest> {
        Ok(ReservationRequest {
            branch_id: self.branch_id,
            category: parse_category(&self.category)?,
            check_in: self.check_in,
            check_out: self.check_out,
            occupants: self.occupants,
            room_count: self.room_count,
        })
    }
}

pub(crate) fn parse_category(raw: &str) -> AppResult<RoomCategory> {
    RoomCategory::from_str(raw)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown room category: {}", raw)))
}

pub(crate) fn parse_method(raw: &str) -> AppResult<PaymentMethod> {
    PaymentMethod::from_str(raw)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown payment method: {}", raw)))
}

/// Reservation response DTO
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub branch_id: i32,
    pub category: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub occupants: i32,
    pub room_count: i32,
    pub status: String,
    pub payment_status: String,
    pub discount_percent: Decimal,
    pub nightly_rate: Decimal,
    pub remaining_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            branch_id: r.branch_id,
            category: r.category.to_string(),
            check_in: r.check_in,
            check_out: r.check_out,
            occupants: r.occupants,
            room_count: r.room_count,
            status: r.status.to_string(),
            payment_status: r.payment_status.to_string(),
            discount_percent: r.discount_percent,
            nightly_rate: r.nightly_rate,
            remaining_balance: r.remaining_balance,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Priced breakdown returned alongside create and edit responses
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub stay_days: i64,
    pub base_amount: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub balance: Decimal,
    pub reservation_fee: Decimal,
}

impl From<ReservationQuote> for QuoteResponse {
    fn from(q: ReservationQuote) -> Self {
        Self {
            stay_days: q.stay_days,
            base_amount: q.base_amount,
            discount_percent: q.discount_percent,
            discount_amount: q.discount_amount,
            balance: q.balance,
            reservation_fee: q.reservation_fee,
        }
    }
}

/// Availability query parameters
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub branch_id: i32,
    pub category: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Rooms wanted; availability is reported against this target
    pub rooms: i32,
}

/// Availability response
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    /// Free rooms found, capped at the requested count
    pub free_rooms: i64,
    pub requested: i32,
}
