//! Room availability
//!
//! Read-side availability queries plus the locked variant used inside
//! the reservation writer's transaction. Both run the same free-room
//! predicate so a count reported here matches what the writer can claim.

use chrono::NaiveDate;
use costera_core::{
    models::{Room, RoomCategory},
    traits::RoomRepository,
    AppError, AppResult,
};
use costera_db::repositories::room_repo::{RoomRow, FREE_ROOMS_SQL};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Date-range checks shared by availability queries and reservation writes
pub fn validate_stay_dates(check_in: NaiveDate, check_out: NaiveDate, today: NaiveDate) -> Vec<String> {
    let mut errors = Vec::new();
    if check_in < today {
        errors.push("Check-in date cannot be in the past".to_string());
    }
    if check_out <= check_in {
        errors.push("Check-out date must be after check-in date".to_string());
    }
    errors
}

/// Availability queries against the room inventory
pub struct AvailabilityMatcher<R: RoomRepository> {
    rooms: Arc<R>,
}

impl<R: RoomRepository> AvailabilityMatcher<R> {
    pub fn new(rooms: Arc<R>) -> Self {
        Self { rooms }
    }

    /// Number of rooms free for the whole half-open range, capped at the
    /// requested count so the reply never advertises more inventory than
    /// the caller asked about
    #[instrument(skip(self))]
    pub async fn free_room_count(
        &self,
        branch_id: i32,
        category: RoomCategory,
        check_in: NaiveDate,
        check_out: NaiveDate,
        needed: i32,
        today: NaiveDate,
    ) -> AppResult<i64> {
        let errors = validate_stay_dates(check_in, check_out, today);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let free = self
            .rooms
            .find_free(branch_id, category, check_in, check_out, i64::from(needed))
            .await?;

        debug!(
            "{} free {} rooms in branch {} for [{}, {})",
            free.len(),
            category,
            branch_id,
            check_in,
            check_out
        );
        Ok(free.len() as i64)
    }

    /// The first `needed` free rooms, or an availability error naming the
    /// shortfall
    pub async fn ensure_available(
        &self,
        branch_id: i32,
        category: RoomCategory,
        check_in: NaiveDate,
        check_out: NaiveDate,
        needed: i32,
    ) -> AppResult<Vec<Room>> {
        let free = self
            .rooms
            .find_free(branch_id, category, check_in, check_out, i64::from(needed))
            .await?;

        if (free.len() as i64) < i64::from(needed) {
            return Err(AppError::Availability {
                needed,
                available: free.len() as i64,
            });
        }
        Ok(free)
    }
}

/// Free rooms selected and row-locked inside a writer transaction
///
/// Locking the room rows until commit closes the window where two
/// concurrent reservations both pass the availability check and claim
/// the same rooms.
pub async fn lock_free_rooms(
    tx: &mut Transaction<'_, Postgres>,
    branch_id: i32,
    category: RoomCategory,
    check_in: NaiveDate,
    check_out: NaiveDate,
    needed: i32,
) -> AppResult<Vec<Room>> {
    let locked_sql = format!("{} FOR UPDATE OF r", FREE_ROOMS_SQL);

    let rows = sqlx::query_as::<Postgres, RoomRow>(&locked_sql)
        .bind(branch_id)
        .bind(category.to_string())
        .bind(check_in)
        .bind(check_out)
        .bind(i64::from(needed))
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to lock free rooms: {}", e)))?;

    if (rows.len() as i64) < i64::from(needed) {
        return Err(AppError::Availability {
            needed,
            available: rows.len() as i64,
        });
    }

    Ok(rows.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use costera_core::models::RoomStatus;
    use rust_decimal_macros::dec;
    use tokio::sync::Mutex;

    struct FakeRoomRepo {
        free: Mutex<Vec<Room>>,
    }

    impl FakeRoomRepo {
        fn with_free(count: i32) -> Self {
            let rooms = (1..=count)
                .map(|id| Room {
                    id,
                    branch_id: 1,
                    category: RoomCategory::Double,
                    status: RoomStatus::Available,
                    nightly_rate: dec!(100),
                })
                .collect();
            Self {
                free: Mutex::new(rooms),
            }
        }
    }

    #[async_trait]
    impl RoomRepository for FakeRoomRepo {
        async fn find_free(
            &self,
            _branch_id: i32,
            _category: RoomCategory,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
            limit: i64,
        ) -> AppResult<Vec<Room>> {
            let free = self.free.lock().await;
            Ok(free.iter().take(limit as usize).cloned().collect())
        }

    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_stay_dates() {
        let today = date(2026, 3, 1);

        assert!(validate_stay_dates(date(2026, 3, 5), date(2026, 3, 8), today).is_empty());

        let errors = validate_stay_dates(date(2026, 2, 20), date(2026, 2, 20), today);
        assert_eq!(errors.len(), 2);

        // same-day stay is rejected
        let errors = validate_stay_dates(date(2026, 3, 5), date(2026, 3, 5), today);
        assert_eq!(errors.len(), 1);

        // check-in today is allowed
        assert!(validate_stay_dates(today, date(2026, 3, 2), today).is_empty());
    }

    #[tokio::test]
    async fn test_free_room_count() {
        let matcher = AvailabilityMatcher::new(Arc::new(FakeRoomRepo::with_free(4)));
        let count = matcher
            .free_room_count(
                1,
                RoomCategory::Double,
                date(2026, 3, 5),
                date(2026, 3, 8),
                4,
                date(2026, 3, 1),
            )
            .await
            .unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_free_room_count_capped_at_requested() {
        let matcher = AvailabilityMatcher::new(Arc::new(FakeRoomRepo::with_free(6)));
        let count = matcher
            .free_room_count(
                1,
                RoomCategory::Double,
                date(2026, 3, 5),
                date(2026, 3, 8),
                2,
                date(2026, 3, 1),
            )
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_free_room_count_ignores_repo_order() {
        let forward = FakeRoomRepo::with_free(5);
        let reversed = FakeRoomRepo::with_free(5);
        reversed.free.lock().await.reverse();

        for repo in [forward, reversed] {
            let matcher = AvailabilityMatcher::new(Arc::new(repo));
            let count = matcher
                .free_room_count(
                    1,
                    RoomCategory::Double,
                    date(2026, 3, 5),
                    date(2026, 3, 8),
                    3,
                    date(2026, 3, 1),
                )
                .await
                .unwrap();
            assert_eq!(count, 3);
        }
    }

    #[tokio::test]
    async fn test_free_room_count_rejects_bad_dates() {
        let matcher = AvailabilityMatcher::new(Arc::new(FakeRoomRepo::with_free(4)));
        let err = matcher
            .free_room_count(
                1,
                RoomCategory::Double,
                date(2026, 3, 8),
                date(2026, 3, 5),
                1,
                date(2026, 3, 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_ensure_available_shortfall() {
        let matcher = AvailabilityMatcher::new(Arc::new(FakeRoomRepo::with_free(2)));
        let err = matcher
            .ensure_available(1, RoomCategory::Double, date(2026, 3, 5), date(2026, 3, 8), 3)
            .await
            .unwrap_err();
        match err {
            AppError::Availability { needed, available } => {
                assert_eq!(needed, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ensure_available_takes_exactly_needed() {
        let matcher = AvailabilityMatcher::new(Arc::new(FakeRoomRepo::with_free(5)));
        let rooms = matcher
            .ensure_available(1, RoomCategory::Double, date(2026, 3, 5), date(2026, 3, 8), 3)
            .await
            .unwrap();
        assert_eq!(rooms.len(), 3);
        assert_eq!(rooms[0].id, 1);
    }
}
