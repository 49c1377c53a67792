use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::{Event, EventCreate, EventUpdate};

use super::{assert_case_owned, clamp_page, require_text, ServiceError};

const SELECT_JOINED: &str = r#"
    SELECT e.*, c.title AS case_title
    FROM events e
    LEFT JOIN cases c ON e.case_id = c.id
"#;

/// Optional list filters; all combine with the owner predicate.
#[derive(Debug, Default)]
pub struct EventFilters {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub case_id: Option<Uuid>,
    pub event_type: Option<String>,
}

pub struct EventService {
    pool: PgPool,
}

impl EventService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: EventCreate, owner_id: Uuid) -> Result<Event, ServiceError> {
        require_text("title", &input.title, 200)?;
        if let Some(ends_at) = input.ends_at {
            if ends_at <= input.starts_at {
                return Err(ServiceError::InvalidInput(
                    "Event end must be after its start".to_string(),
                ));
            }
        }

        if let Some(case_id) = input.case_id {
            assert_case_owned(&self.pool, case_id, owner_id).await?;
        }

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO events
                (user_id, case_id, title, description, event_type, starts_at, ends_at,
                 location, reminder, reminder_minutes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(input.case_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(&input.event_type)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(&input.location)
        .bind(input.reminder)
        .bind(input.reminder_minutes)
        .fetch_one(&self.pool)
        .await?;

        self.get(id, owner_id).await
    }

    pub async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Event, ServiceError> {
        let sql = format!("{} WHERE e.id = $1 AND e.user_id = $2", SELECT_JOINED);
        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Event not found".to_string()))
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        skip: Option<i64>,
        limit: Option<i64>,
        filters: EventFilters,
    ) -> Result<Vec<Event>, ServiceError> {
        let (skip, limit) = clamp_page(skip, limit);
        let sql = format!(
            "{} WHERE e.user_id = $1 \
             AND ($2::timestamptz IS NULL OR e.starts_at >= $2) \
             AND ($3::timestamptz IS NULL OR e.starts_at <= $3) \
             AND ($4::uuid IS NULL OR e.case_id = $4) \
             AND ($5::text IS NULL OR e.event_type = $5) \
             ORDER BY e.starts_at ASC LIMIT $6 OFFSET $7",
            SELECT_JOINED
        );

        let rows = sqlx::query_as::<_, Event>(&sql)
            .bind(owner_id)
            .bind(filters.from)
            .bind(filters.to)
            .bind(filters.case_id)
            .bind(filters.event_type)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Events in the next `days` days (1..=30), ascending.
    pub async fn list_upcoming(&self, owner_id: Uuid, days: i64) -> Result<Vec<Event>, ServiceError> {
        if !(1..=30).contains(&days) {
            return Err(ServiceError::InvalidInput(
                "days must be between 1 and 30".to_string(),
            ));
        }

        let now = Utc::now();
        let filters = EventFilters {
            from: Some(now),
            to: Some(now + Duration::days(days)),
            ..Default::default()
        };
        self.list(owner_id, None, None, filters).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: EventUpdate,
        owner_id: Uuid,
    ) -> Result<Event, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }
        if let Some(title) = &patch.title {
            require_text("title", title, 200)?;
        }

        let existing = self.get(id, owner_id).await?;

        // The merged window must satisfy the same ordering as on create
        let starts_at = patch.starts_at.unwrap_or(existing.starts_at);
        if let Some(ends_at) = patch.ends_at.or(existing.ends_at) {
            if ends_at <= starts_at {
                return Err(ServiceError::InvalidInput(
                    "Event end must be after its start".to_string(),
                ));
            }
        }

        if let Some(case_id) = patch.case_id {
            assert_case_owned(&self.pool, case_id, owner_id).await?;
        }

        let mut qb = QueryBuilder::new("UPDATE events SET updated_at = now()");
        if let Some(title) = &patch.title {
            qb.push(", title = ").push_bind(title.trim().to_string());
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(event_type) = &patch.event_type {
            qb.push(", event_type = ").push_bind(event_type);
        }
        if let Some(starts_at) = patch.starts_at {
            qb.push(", starts_at = ").push_bind(starts_at);
        }
        if let Some(ends_at) = patch.ends_at {
            qb.push(", ends_at = ").push_bind(ends_at);
        }
        if let Some(location) = &patch.location {
            qb.push(", location = ").push_bind(location);
        }
        if let Some(reminder) = patch.reminder {
            qb.push(", reminder = ").push_bind(reminder);
        }
        if let Some(reminder_minutes) = patch.reminder_minutes {
            qb.push(", reminder_minutes = ").push_bind(reminder_minutes);
        }
        if let Some(case_id) = patch.case_id {
            qb.push(", case_id = ").push_bind(case_id);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(owner_id);
        qb.build().execute(&self.pool).await?;

        self.get(id, owner_id).await
    }

    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), ServiceError> {
        let deleted: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM events WHERE id = $1 AND user_id = $2 RETURNING id")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound("Event not found".to_string()))
    }
}
