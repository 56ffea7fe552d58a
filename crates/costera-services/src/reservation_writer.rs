//! Reservation writer
//!
//! Orchestrates create, edit and cancel. Each mutation runs in a single
//! transaction: the availability re-check locks the candidate room rows,
//! so the check and the insert cannot be split by a concurrent writer.
//!
//! Edit recomputes the balance from scratch and overwrites it. Service
//! charges accumulate onto the balance instead. The two mutation modes
//! stay separate on purpose.

use chrono::{NaiveDate, Utc};
use costera_core::{
    models::{
        PaymentMethod, PaymentStatus, Reservation, ReservationStatus, Room, RoomCategory,
    },
    AppError, AppResult, RequestContext, Role,
};
use costera_db::repositories::reservation_repo::{ReservationRow, RESERVATION_COLUMNS};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::availability::{lock_free_rooms, validate_stay_dates};
use crate::card::CardDetails;
use crate::constants::{MAX_ROOMS_PER_RESERVATION, MIN_ROOMS_PER_RESERVATION, PROPERTY_TZ};
use crate::discount;
use crate::payment_recorder::{self, PaymentOutcome};

/// Parameters for creating or editing a reservation
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub branch_id: i32,
    pub category: RoomCategory,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub occupants: i32,
    pub room_count: i32,
}

/// Priced breakdown of a reservation request
#[derive(Debug, Clone, Serialize)]
pub struct ReservationQuote {
    pub stay_days: i64,
    pub base_amount: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    /// Discounted room-nights cost, the initial remaining balance
    pub balance: Decimal,
    /// Flat fee across all rooms, excluded from the balance
    pub reservation_fee: Decimal,
}

/// Result of a successful create
#[derive(Debug)]
pub struct CreatedReservation {
    pub reservation: Reservation,
    pub room_ids: Vec<i32>,
    pub quote: ReservationQuote,
    /// Present when a credit-card fee payment accompanied the request
    pub payment: Option<PaymentOutcome>,
}

/// Result of a successful edit
#[derive(Debug)]
pub struct EditedReservation {
    pub reservation: Reservation,
    pub room_ids: Vec<i32>,
    pub quote: ReservationQuote,
}

/// Price a request at a given nightly rate for the caller's role
pub fn quote_for(role: Role, req: &ReservationRequest, nightly_rate: Decimal) -> ReservationQuote {
    let stay_days = (req.check_out - req.check_in).num_days();
    let base_amount = nightly_rate * Decimal::from(stay_days) * Decimal::from(req.room_count);
    let discount_percent =
        discount::stay_discount_percent(role, req.category, stay_days, req.room_count);
    let discount_amount = discount::discount_amount(base_amount, discount_percent);

    ReservationQuote {
        stay_days,
        base_amount,
        discount_percent,
        discount_amount,
        balance: base_amount - discount_amount,
        reservation_fee: req.category.reservation_fee() * Decimal::from(req.room_count),
    }
}

/// Reprice an existing reservation from new parameters
///
/// The discount tier follows the role the reservation was booked under,
/// never the editor's: a clerk adjusting a travel company's block must not
/// strip its volume tier.
pub fn requote(
    existing: &Reservation,
    req: &ReservationRequest,
    nightly_rate: Decimal,
) -> ReservationQuote {
    quote_for(existing.booked_as, req, nightly_rate)
}

/// Field checks common to create and edit, collected rather than
/// fail-fast so the caller sees every problem at once
pub fn validate_request(req: &ReservationRequest, today: NaiveDate) -> Vec<String> {
    let mut errors = validate_stay_dates(req.check_in, req.check_out, today);

    if !(MIN_ROOMS_PER_RESERVATION..=MAX_ROOMS_PER_RESERVATION).contains(&req.room_count) {
        errors.push(format!(
            "Room count must be between {} and {}",
            MIN_ROOMS_PER_RESERVATION, MAX_ROOMS_PER_RESERVATION
        ));
    }
    if req.occupants < 1 {
        errors.push("At least one occupant is required".to_string());
    }
    errors
}

/// Reservation row fetched and locked inside a transaction
pub(crate) async fn lock_reservation(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> AppResult<Reservation> {
    let row = sqlx::query_as::<Postgres, ReservationRow>(&format!(
        "SELECT {} FROM reservations WHERE id = $1 FOR UPDATE",
        RESERVATION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| AppError::Database(format!("Failed to lock reservation: {}", e)))?;

    row.map(Into::into)
        .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))
}

/// Creates, edits and cancels reservations
pub struct ReservationWriter {
    pool: PgPool,
}

impl ReservationWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a reservation with its room bookings
    ///
    /// A credit-card method settles the reservation fee in the same
    /// transaction and confirms the reservation; pay-at-checkout leaves
    /// it pending and unpaid.
    #[instrument(skip(self, ctx, card))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: &ReservationRequest,
        method: PaymentMethod,
        card: Option<&CardDetails>,
    ) -> AppResult<CreatedReservation> {
        let now_local = Utc::now().with_timezone(&PROPERTY_TZ);
        let today = now_local.date_naive();

        let errors = validate_request(req, today);
        if !errors.is_empty() {
            warn!("Rejected reservation request: {:?}", errors);
            return Err(AppError::Validation(errors));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        let rooms = lock_free_rooms(
            &mut tx,
            req.branch_id,
            req.category,
            req.check_in,
            req.check_out,
            req.room_count,
        )
        .await?;

        // all rooms of a category in a branch share one rate
        let nightly_rate = rooms[0].nightly_rate;
        let quote = quote_for(ctx.role, req, nightly_rate);

        let reservation =
            insert_reservation(&mut tx, ctx.user_id, ctx.role, req, nightly_rate, &quote).await?;
        let room_ids = claim_rooms(&mut tx, &reservation, &rooms).await?;

        let payment = match method {
            PaymentMethod::CreditCard => Some(
                payment_recorder::settle_fee_tx(
                    &mut tx,
                    &reservation,
                    method,
                    card,
                    today,
                    now_local.time(),
                )
                .await?,
            ),
            PaymentMethod::WithoutCreditCard => None,
        };

        tx.commit()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        info!(
            "Created reservation {} for user {}: {} {} room(s), [{}, {}), balance {}",
            reservation.id,
            ctx.user_id,
            req.room_count,
            req.category,
            req.check_in,
            req.check_out,
            quote.balance
        );

        // the settled payment flipped the row after insert
        let reservation = match &payment {
            Some(_) => Reservation {
                status: ReservationStatus::Confirmed,
                payment_status: PaymentStatus::Paid,
                ..reservation
            },
            None => reservation,
        };

        Ok(CreatedReservation {
            reservation,
            room_ids,
            quote,
            payment,
        })
    }

    /// Rewrite a pending reservation from new parameters
    ///
    /// The balance is recomputed from scratch, so any charges added since
    /// creation are dropped from it. Rooms are re-allocated: the old
    /// bookings are cancelled first and their rooms become candidates for
    /// the new range within the same transaction.
    #[instrument(skip(self, ctx))]
    pub async fn edit(
        &self,
        ctx: &RequestContext,
        reservation_id: Uuid,
        req: &ReservationRequest,
    ) -> AppResult<EditedReservation> {
        let today = Utc::now().with_timezone(&PROPERTY_TZ).date_naive();

        let errors = validate_request(req, today);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        let existing = lock_reservation(&mut tx, reservation_id).await?;
        ctx.authorize_owner(existing.user_id)?;
        if !existing.status.is_mutable() {
            return Err(AppError::Authorization(format!(
                "Reservation is {} and can no longer be edited",
                existing.status
            )));
        }

        release_bookings(&mut tx, reservation_id).await?;

        let rooms = lock_free_rooms(
            &mut tx,
            req.branch_id,
            req.category,
            req.check_in,
            req.check_out,
            req.room_count,
        )
        .await?;
        let nightly_rate = rooms[0].nightly_rate;
        let quote = requote(&existing, req, nightly_rate);

        let row = sqlx::query_as::<Postgres, ReservationRow>(&format!(
            r#"
            UPDATE reservations
            SET branch_id = $2, category = $3,
                check_in = $4, check_out = $5,
                occupants = $6, room_count = $7,
                discount_percent = $8, nightly_rate = $9,
                remaining_balance = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(reservation_id)
        .bind(req.branch_id)
        .bind(req.category.to_string())
        .bind(req.check_in)
        .bind(req.check_out)
        .bind(req.occupants)
        .bind(req.room_count)
        .bind(quote.discount_percent)
        .bind(nightly_rate)
        .bind(quote.balance)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update reservation: {}", e)))?;

        let reservation: Reservation = row.into();
        let room_ids = claim_rooms(&mut tx, &reservation, &rooms).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        info!(
            "Edited reservation {}: balance rewritten from {} to {}",
            reservation_id, existing.remaining_balance, quote.balance
        );

        Ok(EditedReservation {
            reservation,
            room_ids,
            quote,
        })
    }

    /// Cancel a pending reservation
    ///
    /// Status change only; the row is kept and the rooms are released.
    /// Cancelling an already-cancelled reservation is an error.
    #[instrument(skip(self, ctx))]
    pub async fn cancel(&self, ctx: &RequestContext, reservation_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        let existing = lock_reservation(&mut tx, reservation_id).await?;
        ctx.authorize_owner(existing.user_id)?;
        if !existing.status.is_mutable() {
            return Err(AppError::Authorization(format!(
                "Reservation is {} and cannot be cancelled",
                existing.status
            )));
        }

        sqlx::query("UPDATE reservations SET status = 'cancelled', updated_at = NOW() WHERE id = $1")
            .bind(reservation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to cancel reservation: {}", e)))?;

        release_bookings(&mut tx, reservation_id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        info!("Cancelled reservation {} for user {}", reservation_id, existing.user_id);
        Ok(())
    }
}

async fn insert_reservation(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    booked_as: Role,
    req: &ReservationRequest,
    nightly_rate: Decimal,
    quote: &ReservationQuote,
) -> AppResult<Reservation> {
    let row = sqlx::query_as::<Postgres, ReservationRow>(&format!(
        r#"
        INSERT INTO reservations (
            id, user_id, branch_id, category,
            check_in, check_out, occupants, room_count,
            booked_as, status, payment_status,
            discount_percent, nightly_rate, remaining_balance,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', 'unpaid', $10, $11, $12, NOW(), NOW())
        RETURNING {}
        "#,
        RESERVATION_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(req.branch_id)
    .bind(req.category.to_string())
    .bind(req.check_in)
    .bind(req.check_out)
    .bind(req.occupants)
    .bind(req.room_count)
    .bind(booked_as.to_string())
    .bind(quote.discount_percent)
    .bind(nightly_rate)
    .bind(quote.balance)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert reservation: {}", e)))?;

    Ok(row.into())
}

/// Insert one confirmed booking per room and mark the rooms occupied
async fn claim_rooms(
    tx: &mut Transaction<'_, Postgres>,
    reservation: &Reservation,
    rooms: &[Room],
) -> AppResult<Vec<i32>> {
    let mut room_ids = Vec::with_capacity(rooms.len());
    for room in rooms {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, reservation_id, room_id,
                check_in, check_out, occupants, status,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'confirmed', NOW(), NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(reservation.id)
        .bind(room.id)
        .bind(reservation.check_in)
        .bind(reservation.check_out)
        .bind(reservation.occupants)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert booking: {}", e)))?;

        sqlx::query("UPDATE rooms SET status = 'occupied' WHERE id = $1")
            .bind(room.id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to occupy room: {}", e)))?;

        room_ids.push(room.id);
    }
    Ok(room_ids)
}

/// Cancel a reservation's confirmed bookings and free their rooms
async fn release_bookings(
    tx: &mut Transaction<'_, Postgres>,
    reservation_id: Uuid,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE rooms SET status = 'available'
        WHERE id IN (
            SELECT room_id FROM bookings
            WHERE reservation_id = $1 AND status = 'confirmed'
        )
        "#,
    )
    .bind(reservation_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::Database(format!("Failed to release rooms: {}", e)))?;

    sqlx::query(
        "UPDATE bookings SET status = 'cancelled', updated_at = NOW() WHERE reservation_id = $1 AND status = 'confirmed'",
    )
    .bind(reservation_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::Database(format!("Failed to cancel bookings: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(days: i64, rooms: i32, category: RoomCategory) -> ReservationRequest {
        let check_in = date(2026, 9, 1);
        ReservationRequest {
            branch_id: 1,
            category,
            check_in,
            check_out: check_in + chrono::Duration::days(days),
            occupants: 2,
            room_count: rooms,
        }
    }

    #[test]
    fn test_quote_direct_suite() {
        let quote = quote_for(Role::Customer, &request(10, 1, RoomCategory::Suite), dec!(200));
        assert_eq!(quote.stay_days, 10);
        assert_eq!(quote.base_amount, dec!(2000));
        assert_eq!(quote.discount_percent, dec!(3));
        assert_eq!(quote.discount_amount, dec!(60.00));
        assert_eq!(quote.balance, dec!(1940.00));
        assert_eq!(quote.reservation_fee, dec!(70));
    }

    #[test]
    fn test_quote_travel_company_block() {
        let quote = quote_for(
            Role::TravelCompany,
            &request(8, 4, RoomCategory::Double),
            dec!(100),
        );
        assert_eq!(quote.base_amount, dec!(3200));
        assert_eq!(quote.discount_percent, dec!(10));
        assert_eq!(quote.balance, dec!(2880.00));
        assert_eq!(quote.reservation_fee, dec!(200));
    }

    #[test]
    fn test_quote_fee_never_discounted() {
        let quote = quote_for(Role::Customer, &request(30, 1, RoomCategory::Suite), dec!(200));
        assert_eq!(quote.discount_percent, dec!(10));
        // fee stays flat at category rate regardless of the discount
        assert_eq!(quote.reservation_fee, dec!(70));
    }

    #[test]
    fn test_requote_keeps_booking_role_tier() {
        let req = request(8, 4, RoomCategory::Double);
        let existing = Reservation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            branch_id: 1,
            category: req.category,
            check_in: req.check_in,
            check_out: req.check_out,
            occupants: req.occupants,
            room_count: req.room_count,
            booked_as: Role::TravelCompany,
            status: ReservationStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            discount_percent: dec!(10),
            nightly_rate: dec!(100),
            remaining_balance: dec!(2880.00),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        // a clerk edit must not reprice the block on the direct tier
        let quote = requote(&existing, &req, dec!(100));
        assert_eq!(quote.discount_percent, dec!(10));
        assert_eq!(quote.balance, dec!(2880.00));
        assert_ne!(
            quote_for(Role::Clerk, &req, dec!(100)).discount_percent,
            quote.discount_percent
        );
    }

    #[test]
    fn test_validate_request_collects_errors() {
        let today = date(2026, 9, 10);
        let mut req = request(5, 1, RoomCategory::Single);
        req.check_in = date(2026, 9, 1); // past
        req.check_out = date(2026, 9, 1); // not after check-in
        req.room_count = 0;
        req.occupants = 0;

        let errors = validate_request(&req, today);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_validate_request_bounds() {
        let today = date(2026, 8, 1);

        let mut req = request(3, 10, RoomCategory::Double);
        assert!(validate_request(&req, today).is_empty());

        req.room_count = 11;
        assert_eq!(validate_request(&req, today).len(), 1);
    }
}
