//! Availability handlers

use crate::dto::reservation::{parse_category, AvailabilityParams, AvailabilityResponse};
use crate::extract::Caller;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use costera_core::AppError;
use costera_db::PgRoomRepository;
use costera_services::constants::PROPERTY_TZ;
use costera_services::AvailabilityMatcher;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Check room availability for a date range
///
/// GET /api/v1/availability
#[instrument(skip(pool, _caller))]
pub async fn check_availability(
    pool: web::Data<PgPool>,
    query: web::Query<AvailabilityParams>,
    _caller: Caller,
) -> Result<HttpResponse, AppError> {
    let category = parse_category(&query.category)?;
    if query.rooms < 1 {
        return Err(AppError::validation("At least one room must be requested"));
    }

    debug!(
        branch_id = query.branch_id,
        %category,
        "Checking availability for [{}, {})",
        query.check_in,
        query.check_out
    );

    let matcher = AvailabilityMatcher::new(Arc::new(PgRoomRepository::new(
        pool.get_ref().clone(),
    )));
    let today = Utc::now().with_timezone(&PROPERTY_TZ).date_naive();
    let free = matcher
        .free_room_count(
            query.branch_id,
            category,
            query.check_in,
            query.check_out,
            query.rooms,
            today,
        )
        .await?;

    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        available: free >= i64::from(query.rooms),
        free_rooms: free,
        requested: query.rooms,
    }))
}

/// Configure availability routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/availability").route("", web::get().to(check_availability)));
}
