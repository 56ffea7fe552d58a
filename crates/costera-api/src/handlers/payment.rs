//! Payment handlers

use crate::dto::payment::{PayReservationRequest, PaymentOutcomeResponse, PaymentResponse};
use crate::dto::reservation::parse_method;
use crate::dto::ApiResponse;
use crate::extract::Caller;
use actix_web::{web, HttpResponse};
use costera_core::traits::{PaymentRepository, ReservationRepository};
use costera_core::AppError;
use costera_db::{PgPaymentRepository, PgReservationRepository};
use costera_services::PaymentRecorder;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Settle the reservation fee
///
/// POST /api/v1/reservations/{id}/payment
#[instrument(skip(pool, caller, req))]
pub async fn pay_reservation(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
    req: web::Json<PayReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();
    let method = parse_method(&req.payment_method)?;

    debug!(%reservation_id, %method, "Recording reservation-fee payment");

    let recorder = PaymentRecorder::new(pool.get_ref().clone());
    let outcome = recorder
        .record(caller.context(), reservation_id, method, req.card.as_ref())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(PaymentOutcomeResponse::from(outcome))))
}

/// List payments recorded against a reservation
///
/// GET /api/v1/reservations/{id}/payments
#[instrument(skip(pool, caller))]
pub async fn list_payments(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();

    let reservations = PgReservationRepository::new(pool.get_ref().clone());
    let reservation = reservations
        .find_by_id(reservation_id)
        .await?
        .ok_or_else(|| AppError::ReservationNotFound(reservation_id.to_string()))?;
    caller.0.authorize_owner(reservation.user_id)?;

    let repo = PgPaymentRepository::new(pool.get_ref().clone());
    let payments = repo.find_by_reservation(reservation_id).await?;

    let data: Vec<PaymentResponse> = payments.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}
