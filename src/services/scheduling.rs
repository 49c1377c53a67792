//! Appointment conflict detection.
//!
//! Booking windows are half-open intervals `[start, start + duration)`:
//! the end instant is not part of the window, so back-to-back appointments
//! never conflict.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Classic half-open interval overlap test.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Exclusive end of a window starting at `starts_at`.
pub fn window_end(starts_at: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
    starts_at + Duration::minutes(duration_minutes as i64)
}

/// True iff some non-cancelled appointment of `owner_id` (other than
/// `exclude_id`, used when an update is checked against itself) overlaps the
/// proposed window. Read-only; the SQL predicate mirrors [`overlaps`].
pub async fn has_conflict<'e, E>(
    executor: E,
    owner_id: Uuid,
    starts_at: DateTime<Utc>,
    duration_minutes: i32,
    exclude_id: Option<Uuid>,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let proposed_end = window_end(starts_at, duration_minutes);

    sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM appointments
            WHERE user_id = $1
              AND status <> 'cancelled'
              AND ($2::uuid IS NULL OR id <> $2)
              AND starts_at < $4
              AND starts_at + make_interval(mins => duration_minutes) > $3
        )
        "#,
    )
    .bind(owner_id)
    .bind(exclude_id)
    .bind(starts_at)
    .bind(proposed_end)
    .fetch_one(executor)
    .await
}

/// Advisory-lock key derived from the owner id. Conflict check-then-insert
/// sequences take `pg_advisory_xact_lock` on this key so two concurrent
/// bookings for the same owner serialize instead of both passing the check.
pub(crate) fn owner_lock_key(owner_id: Uuid) -> i64 {
    let bytes = owner_id.as_bytes();
    let mut key = [0u8; 8];
    key.copy_from_slice(&bytes[..8]);
    i64::from_le_bytes(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, hour, min, 0).unwrap()
    }

    #[test]
    fn overlapping_windows_conflict() {
        // existing 10:00-11:00 vs proposed 10:30-11:00
        assert!(overlaps(at(10, 0), at(11, 0), at(10, 30), at(11, 0)));
        // proposed fully inside existing
        assert!(overlaps(at(10, 0), at(11, 0), at(10, 15), at(10, 45)));
        // existing fully inside proposed
        assert!(overlaps(at(10, 15), at(10, 45), at(10, 0), at(11, 0)));
        // partial overlap at the front
        assert!(overlaps(at(10, 0), at(11, 0), at(9, 30), at(10, 1)));
    }

    #[test]
    fn back_to_back_windows_do_not_conflict() {
        // existing 10:00-11:00, proposed starts exactly at 11:00
        assert!(!overlaps(at(10, 0), at(11, 0), at(11, 0), at(11, 30)));
        // proposed ends exactly when existing starts
        assert!(!overlaps(at(10, 0), at(11, 0), at(9, 0), at(10, 0)));
    }

    #[test]
    fn disjoint_windows_do_not_conflict() {
        assert!(!overlaps(at(10, 0), at(11, 0), at(12, 0), at(13, 0)));
        assert!(!overlaps(at(12, 0), at(13, 0), at(10, 0), at(11, 0)));
    }

    #[test]
    fn window_end_is_start_plus_duration() {
        assert_eq!(window_end(at(10, 0), 60), at(11, 0));
        assert_eq!(window_end(at(10, 30), 30), at(11, 0));
    }

    #[test]
    fn lock_key_is_stable_per_owner() {
        let owner = Uuid::new_v4();
        assert_eq!(owner_lock_key(owner), owner_lock_key(owner));
        assert_ne!(owner_lock_key(owner), owner_lock_key(Uuid::new_v4()));
    }
}
