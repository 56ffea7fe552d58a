//! Common traits for repositories
//!
//! Defines abstractions for database access. Multi-write mutations run as
//! raw SQL inside service-owned transactions; these traits cover the reads
//! and single-row updates shared across services and handlers.

use crate::error::AppError;
use crate::models::{
    BillingCharge, Booking, CheckInOutRecord, Payment, Reservation, Room, RoomCategory,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Reservation repository
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Find reservation by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, AppError>;

    /// List a user's reservations, newest first, with total count
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Reservation>, i64), AppError>;
}

/// Room repository
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Rooms free for the requested range: status available and no
    /// confirmed booking overlapping the half-open interval.
    /// Result is capped at `limit`.
    async fn find_free(
        &self,
        branch_id: i32,
        category: RoomCategory,
        check_in: NaiveDate,
        check_out: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Room>, AppError>;
}

/// Booking repository
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find booking by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// All bookings belonging to a reservation
    async fn find_by_reservation(&self, reservation_id: Uuid) -> Result<Vec<Booking>, AppError>;
}

/// Billing charge repository
#[async_trait]
pub trait BillingRepository: Send + Sync {
    /// Find charge by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BillingCharge>, AppError>;

    /// All charges on a reservation, oldest first
    async fn list_by_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Vec<BillingCharge>, AppError>;
}

/// Payment repository
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// All payments on a reservation
    async fn find_by_reservation(&self, reservation_id: Uuid) -> Result<Vec<Payment>, AppError>;

}

/// Check-in/out record repository
#[async_trait]
pub trait CheckInOutRepository: Send + Sync {
    /// Find the record for a booking, if any
    async fn find_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<CheckInOutRecord>, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10); // page 0 becomes 1
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 2000); // per_page capped at 1000
        assert_eq!(p.per_page, 1000);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);
    }
}
