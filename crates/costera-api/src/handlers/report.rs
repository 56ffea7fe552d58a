//! Reporting handlers

use crate::dto::report::FinancialSummaryResponse;
use crate::dto::ApiResponse;
use crate::extract::Caller;
use actix_web::{web, HttpResponse};
use costera_core::{AppError, Role};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total_outstanding: Decimal,
    pending_charges: Decimal,
    paid_charges: Decimal,
    overdue_charges: Decimal,
    fees_collected: Decimal,
    pending_reservations: i64,
    confirmed_reservations: i64,
    cancelled_reservations: i64,
}

/// Financial summary across all branches; manager only
///
/// GET /api/v1/reports/summary
#[instrument(skip(pool, caller))]
pub async fn financial_summary(
    pool: web::Data<PgPool>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    if caller.0.role != Role::Manager {
        return Err(AppError::Authorization(
            "Financial summaries are restricted to managers".to_string(),
        ));
    }

    debug!("Building financial summary for manager {}", caller.0.user_id);

    let row = sqlx::query_as::<sqlx::Postgres, SummaryRow>(
        r#"
        SELECT
            COALESCE((SELECT SUM(remaining_balance) FROM reservations WHERE status != 'cancelled'), 0) AS total_outstanding,
            COALESCE((SELECT SUM(fee) FROM billings WHERE status = 'pending'), 0) AS pending_charges,
            COALESCE((SELECT SUM(fee) FROM billings WHERE status = 'paid'), 0) AS paid_charges,
            COALESCE((SELECT SUM(fee) FROM billings WHERE status = 'overdue'), 0) AS overdue_charges,
            COALESCE((SELECT SUM(amount) FROM payments WHERE status = 'completed'), 0) AS fees_collected,
            (SELECT COUNT(*) FROM reservations WHERE status = 'pending') AS pending_reservations,
            (SELECT COUNT(*) FROM reservations WHERE status = 'confirmed') AS confirmed_reservations,
            (SELECT COUNT(*) FROM reservations WHERE status = 'cancelled') AS cancelled_reservations
        "#,
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| AppError::Database(format!("Failed to build summary: {}", e)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(FinancialSummaryResponse {
        total_outstanding: row.total_outstanding,
        pending_charges: row.pending_charges,
        paid_charges: row.paid_charges,
        overdue_charges: row.overdue_charges,
        fees_collected: row.fees_collected,
        pending_reservations: row.pending_reservations,
        confirmed_reservations: row.confirmed_reservations,
        cancelled_reservations: row.cancelled_reservations,
    })))
}

/// Configure reporting routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/reports").route("/summary", web::get().to(financial_summary)));
}
