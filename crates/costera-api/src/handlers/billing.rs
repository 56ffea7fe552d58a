//! Billing handlers
//!
//! Ad-hoc service charges, itemized statements, and clerk status
//! transitions on individual charges.

use crate::dto::billing::{
    AddChargeRequest, BillingResponse, MarkBillingStatusRequest, StatementResponse,
};
use crate::dto::ApiResponse;
use crate::extract::Caller;
use actix_web::{web, HttpResponse};
use costera_core::models::BillingStatus;
use costera_core::traits::{BillingRepository, ReservationRepository};
use costera_core::AppError;
use costera_db::{PgBillingRepository, PgReservationRepository};
use costera_services::BillingReconciler;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Add an ad-hoc service charge to a reservation
///
/// POST /api/v1/reservations/{id}/charges
#[instrument(skip(pool, caller, req))]
pub async fn add_charge(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
    req: web::Json<AddChargeRequest>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();
    let service_type = req.parse_service_type()?;

    debug!(%reservation_id, %service_type, fee = %req.fee, "Adding service charge");

    let reconciler = BillingReconciler::new(pool.get_ref().clone());
    let charge = reconciler
        .add_charge(caller.context(), reservation_id, service_type, req.fee)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(BillingResponse::from(charge))))
}

/// Itemized statement for a reservation
///
/// GET /api/v1/reservations/{id}/statement
#[instrument(skip(pool, caller))]
pub async fn get_statement(
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

    let billings = PgBillingRepository::new(pool.get_ref().clone());
    let charges = billings.list_by_reservation(reservation_id).await?;

    let pending_total: Decimal = charges
        .iter()
        .filter(|c| c.status == BillingStatus::Pending)
        .map(|c| c.fee)
        .sum();

    Ok(HttpResponse::Ok().json(StatementResponse {
        reservation_id,
        charges: charges.into_iter().map(Into::into).collect(),
        pending_total,
        remaining_balance: reservation.remaining_balance,
    }))
}

/// Transition a charge to paid or overdue
///
/// PUT /api/v1/billings/{id}/status
#[instrument(skip(pool, caller, req))]
pub async fn mark_billing_status(
    pool: web::Data<PgPool>,
    caller: Caller,
    path: web::Path<Uuid>,
    req: web::Json<MarkBillingStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let billing_id = path.into_inner();
    let status = req.parse_status()?;

    let reconciler = BillingReconciler::new(pool.get_ref().clone());
    let charge = reconciler
        .mark_status(caller.context(), billing_id, status)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        BillingResponse::from(charge),
        format!("Charge marked {}", status),
    )))
}

/// Configure billing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/billings").route("/{id}/status", web::put().to(mark_billing_status)),
    );
}
