use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::config::config;
use crate::models::{Appointment, AppointmentCreate, AppointmentStatus, AppointmentUpdate};

use super::scheduling::{has_conflict, owner_lock_key, window_end};
use super::{assert_client_owned, clamp_page, require_text, validate_search_query, ServiceError};

const SELECT_JOINED: &str = r#"
    SELECT a.*, c.name AS client_name
    FROM appointments a
    LEFT JOIN clients c ON a.client_id = c.id
"#;

pub struct AppointmentService {
    pool: PgPool,
}

impl AppointmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an appointment. The conflict check and insert run inside one
    /// transaction holding a per-owner advisory lock, so two concurrent
    /// bookings for the same owner cannot both pass the check.
    pub async fn create(
        &self,
        input: AppointmentCreate,
        owner_id: Uuid,
    ) -> Result<Appointment, ServiceError> {
        require_text("title", &input.title, 200)?;
        let duration = validate_duration(input.duration_minutes)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owner_lock_key(owner_id))
            .execute(&mut *tx)
            .await?;

        if let Some(client_id) = input.client_id {
            assert_client_owned(&mut *tx, client_id, owner_id).await?;
        }

        if has_conflict(&mut *tx, owner_id, input.starts_at, duration, None).await? {
            return Err(conflict_error(input.starts_at, duration));
        }

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO appointments
                (user_id, client_id, title, description, starts_at, duration_minutes, location, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(input.client_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.starts_at)
        .bind(duration)
        .bind(&input.location)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(id, owner_id).await
    }

    pub async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Appointment, ServiceError> {
        let sql = format!("{} WHERE a.id = $1 AND a.user_id = $2", SELECT_JOINED);
        sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Appointment not found".to_string()))
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        skip: Option<i64>,
        limit: Option<i64>,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, ServiceError> {
        let (skip, limit) = clamp_page(skip, limit);
        let sql = format!(
            "{} WHERE a.user_id = $1 AND ($2::text IS NULL OR a.status = $2) \
             ORDER BY a.starts_at ASC LIMIT $3 OFFSET $4",
            SELECT_JOINED
        );

        let rows = sqlx::query_as::<_, Appointment>(&sql)
            .bind(owner_id)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Appointments starting within `[from, to]`, ascending.
    pub async fn list_range(
        &self,
        owner_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, ServiceError> {
        if to < from {
            return Err(ServiceError::InvalidInput(
                "Range end must not precede range start".to_string(),
            ));
        }
        let sql = format!(
            "{} WHERE a.user_id = $1 AND a.starts_at >= $2 AND a.starts_at <= $3 \
             ORDER BY a.starts_at ASC",
            SELECT_JOINED
        );

        let rows = sqlx::query_as::<_, Appointment>(&sql)
            .bind(owner_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Merge a partial update. Conflict re-check only when the booking
    /// window moves; the record's own id is excluded so a self-overlap
    /// never triggers Conflict.
    pub async fn update(
        &self,
        id: Uuid,
        patch: AppointmentUpdate,
        owner_id: Uuid,
    ) -> Result<Appointment, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }
        if let Some(title) = &patch.title {
            require_text("title", title, 200)?;
        }
        if let Some(minutes) = patch.duration_minutes {
            validate_duration(Some(minutes))?;
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owner_lock_key(owner_id))
            .execute(&mut *tx)
            .await?;

        let sql = format!("{} WHERE a.id = $1 AND a.user_id = $2", SELECT_JOINED);
        let existing = sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Appointment not found".to_string()))?;

        if let Some(next) = patch.status {
            let current: AppointmentStatus = existing
                .status
                .parse()
                .map_err(|e: String| ServiceError::Database(sqlx::Error::Decode(e.into())))?;
            if !current.can_transition_to(next) {
                return Err(ServiceError::InvalidInput(format!(
                    "Cannot change appointment status from {} to {}",
                    current, next
                )));
            }
        }

        if patch.reschedules() {
            let starts_at = patch.starts_at.unwrap_or(existing.starts_at);
            let duration = patch.duration_minutes.unwrap_or(existing.duration_minutes);
            if has_conflict(&mut *tx, owner_id, starts_at, duration, Some(id)).await? {
                return Err(conflict_error(starts_at, duration));
            }
        }

        if let Some(client_id) = patch.client_id {
            assert_client_owned(&mut *tx, client_id, owner_id).await?;
        }

        let mut qb = QueryBuilder::new("UPDATE appointments SET updated_at = now()");
        if let Some(title) = &patch.title {
            qb.push(", title = ").push_bind(title.trim().to_string());
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(client_id) = patch.client_id {
            qb.push(", client_id = ").push_bind(client_id);
        }
        if let Some(starts_at) = patch.starts_at {
            qb.push(", starts_at = ").push_bind(starts_at);
        }
        if let Some(minutes) = patch.duration_minutes {
            qb.push(", duration_minutes = ").push_bind(minutes);
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(location) = &patch.location {
            qb.push(", location = ").push_bind(location);
        }
        if let Some(notes) = &patch.notes {
            qb.push(", notes = ").push_bind(notes);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(owner_id);
        qb.build().execute(&mut *tx).await?;

        tx.commit().await?;

        self.get(id, owner_id).await
    }

    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), ServiceError> {
        let deleted: Option<Uuid> = sqlx::query_scalar(
            "DELETE FROM appointments WHERE id = $1 AND user_id = $2 RETURNING id",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound("Appointment not found".to_string()))
    }

    /// Case-insensitive substring search across text fields and the joined
    /// client name.
    pub async fn search(&self, owner_id: Uuid, query: &str) -> Result<Vec<Appointment>, ServiceError> {
        let trimmed = validate_search_query(query)?;
        let pattern = format!("%{}%", trimmed);

        let sql = format!(
            "{} WHERE a.user_id = $1 AND (a.title ILIKE $2 OR a.description ILIKE $2 \
             OR a.location ILIKE $2 OR a.notes ILIKE $2 OR c.name ILIKE $2) \
             ORDER BY a.starts_at DESC",
            SELECT_JOINED
        );

        let rows = sqlx::query_as::<_, Appointment>(&sql)
            .bind(owner_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

fn validate_duration(duration_minutes: Option<i32>) -> Result<i32, ServiceError> {
    let scheduling = &config().scheduling;
    let duration = duration_minutes.unwrap_or(scheduling.default_duration_minutes);
    if duration < scheduling.min_duration_minutes || duration > scheduling.max_duration_minutes {
        return Err(ServiceError::InvalidInput(format!(
            "Duration must be between {} and {} minutes",
            scheduling.min_duration_minutes, scheduling.max_duration_minutes
        )));
    }
    Ok(duration)
}

fn conflict_error(starts_at: DateTime<Utc>, duration_minutes: i32) -> ServiceError {
    let end = window_end(starts_at, duration_minutes);
    ServiceError::Conflict(format!(
        "Another appointment overlaps {} - {}",
        starts_at.format("%Y-%m-%d %H:%M"),
        end.format("%H:%M")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn duration_bounds_are_enforced() {
        assert_eq!(validate_duration(None).unwrap(), 60);
        assert_eq!(validate_duration(Some(15)).unwrap(), 15);
        assert_eq!(validate_duration(Some(480)).unwrap(), 480);
        assert!(validate_duration(Some(14)).is_err());
        assert!(validate_duration(Some(481)).is_err());
        assert!(validate_duration(Some(0)).is_err());
        assert!(validate_duration(Some(-60)).is_err());
    }

    #[test]
    fn conflict_message_names_the_window() {
        let starts = chrono::Utc
            .with_ymd_and_hms(2024, 1, 10, 10, 0, 0)
            .unwrap();
        let err = conflict_error(starts, 60);
        assert!(matches!(&err, ServiceError::Conflict(msg) if msg.contains("10:00") && msg.contains("11:00")));
    }
}
