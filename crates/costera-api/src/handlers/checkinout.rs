//! Check-in/out handlers
//!
//! Front-desk operations on individual bookings.

use crate::dto::checkinout::{
    BookingResponse, CheckInOutResponse, CheckoutResponse, ExtensionResponse,
    UpdateCheckoutRequest,
};
use crate::dto::ApiResponse;
use crate::extract::Caller;
use actix_web::{web, HttpResponse};
use costera_core::traits::{BookingRepository, CheckInOutRepository};
use costera_core::AppError;
use costera_db::{PgBookingRepository, PgCheckInOutRepository};
use costera_services::CheckInOutTracker;
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Record a guest arrival
///
/// POST /api/v1/bookings/{id}/check-in
#[instrument(skip(pool, caller))]
pub async fn check_in(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();
    debug!(%booking_id, "Recording check-in");

    let tracker = CheckInOutTracker::new(pool.get_ref().clone());
    let record = tracker.check_in(caller.context(), booking_id).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(CheckInOutResponse::from(record))))
}

/// Record a guest departure
///
/// POST /api/v1/bookings/{id}/check-out
#[instrument(skip(pool, caller))]
pub async fn check_out(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();
    debug!(%booking_id, "Recording check-out");

    let tracker = CheckInOutTracker::new(pool.get_ref().clone());
    let outcome = tracker.check_out(caller.context(), booking_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(CheckoutResponse::from(outcome))))
}

/// Move a booking's departure date
///
/// PUT /api/v1/bookings/{id}/checkout-date
#[instrument(skip(pool, caller, req))]
pub async fn update_checkout_date(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
    req: web::Json<UpdateCheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let booking_id = path.into_inner();

    let tracker = CheckInOutTracker::new(pool.get_ref().clone());
    let outcome = tracker
        .update_checkout(caller.context(), booking_id, req.new_check_out)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ExtensionResponse::from(outcome))))
}

/// Fetch a booking with its arrival/departure record
///
/// GET /api/v1/bookings/{id}
#[instrument(skip(pool, caller))]
pub async fn get_booking(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    caller.0.authorize_staff()?;
    let booking_id = path.into_inner();

    let bookings = PgBookingRepository::new(pool.get_ref().clone());
    let booking = bookings
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))?;

    let records = PgCheckInOutRepository::new(pool.get_ref().clone());
    let record = records.find_by_booking(booking_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "booking": BookingResponse::from(booking),
        "check_in_out": record.map(CheckInOutResponse::from),
    })))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/check-in", web::post().to(check_in))
            .route("/{id}/check-out", web::post().to(check_out))
            .route("/{id}/checkout-date", web::put().to(update_checkout_date)),
    );
}
