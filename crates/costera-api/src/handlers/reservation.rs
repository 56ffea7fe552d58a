//! Reservation handlers
//!
//! HTTP handlers for the reservation lifecycle: create, list, read,
//! edit and cancel.

use crate::dto::reservation::{
    CreateReservationRequest, EditReservationRequest, QuoteResponse, ReservationResponse,
};
use crate::dto::{ApiResponse, PaginationParams};
use crate::extract::Caller;
use crate::handlers::{billing, payment};
use actix_web::{web, HttpResponse};
use costera_core::traits::ReservationRepository;
use costera_core::AppError;
use costera_db::PgReservationRepository;
use costera_services::ReservationWriter;
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Create a reservation
///
/// POST /api/v1/reservations
#[instrument(skip(pool, caller, req))]
pub async fn create_reservation(
    pool: web::Data<PgPool>,
    caller: Caller,
    req: web::Json<CreateReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let (request, method) = req.parse()?;

    debug!(
        user_id = %caller.0.user_id,
        branch_id = request.branch_id,
        "Creating reservation for [{}, {})",
        request.check_in,
        request.check_out
    );

    let writer = ReservationWriter::new(pool.get_ref().clone());
    let created = writer
        .create(caller.context(), &request, method, req.card.as_ref())
        .await?;

    let body = json!({
        "reservation": ReservationResponse::from(created.reservation),
        "room_ids": created.room_ids,
        "quote": QuoteResponse::from(created.quote),
        "payment": created.payment.map(crate::dto::payment::PaymentOutcomeResponse::from),
    });
    Ok(HttpResponse::Created().json(body))
}

/// List the caller's reservations, newest first
///
/// GET /api/v1/reservations
#[instrument(skip(pool, caller))]
pub async fn list_reservations(
    pool: web::Data<PgPool>,
    caller: Caller,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Pagination validation failed: {}", e);
        AppError::from(e)
    })?;

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let (reservations, total) = repo
        .list_by_user(caller.0.user_id, query.limit(), query.offset())
        .await?;

    let data: Vec<ReservationResponse> = reservations.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(query.paginate(data, total)))
}

/// Fetch a single reservation
///
/// GET /api/v1/reservations/{id}
#[instrument(skip(pool, caller))]
pub async fn get_reservation(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let repo = PgReservationRepository::new(pool.get_ref().clone());

    let reservation = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ReservationNotFound(id.to_string()))?;
    caller.0.authorize_owner(reservation.user_id)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ReservationResponse::from(reservation))))
}

/// Rewrite a pending reservation
///
/// PUT /api/v1/reservations/{id}
#[instrument(skip(pool, caller, req))]
pub async fn edit_reservation(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
    req: web::Json<EditReservationRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let request = req.parse()?;

    let writer = ReservationWriter::new(pool.get_ref().clone());
    let edited = writer.edit(caller.context(), id, &request).await?;

    let body = json!({
        "reservation": ReservationResponse::from(edited.reservation),
        "room_ids": edited.room_ids,
        "quote": QuoteResponse::from(edited.quote),
    });
    Ok(HttpResponse::Ok().json(body))
}

/// Cancel a pending reservation
///
/// DELETE /api/v1/reservations/{id}
#[instrument(skip(pool, caller))]
pub async fn cancel_reservation(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let writer = ReservationWriter::new(pool.get_ref().clone());
    writer.cancel(caller.context(), id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Configure reservation routes, including the nested payment and
/// billing operations
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reservations")
            .route("", web::post().to(create_reservation))
            .route("", web::get().to(list_reservations))
            .route("/{id}", web::get().to(get_reservation))
            .route("/{id}", web::put().to(edit_reservation))
            .route("/{id}", web::delete().to(cancel_reservation))
            .route("/{id}/payment", web::post().to(payment::pay_reservation))
            .route("/{id}/payments", web::get().to(payment::list_payments))
            .route("/{id}/charges", web::post().to(billing::add_charge))
            .route("/{id}/statement", web::get().to(billing::get_statement)),
    );
}
