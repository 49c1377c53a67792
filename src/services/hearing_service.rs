use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::{Hearing, HearingCreate, HearingUpdate};

use super::{assert_case_owned, clamp_page, ServiceError};

const SELECT_JOINED: &str = r#"
    SELECT h.*, c.title AS case_title
    FROM hearings h
    LEFT JOIN cases c ON h.case_id = c.id
"#;

pub struct HearingService {
    pool: PgPool,
}

impl HearingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a hearing under an owned case. The hearing inherits the
    /// caller as owner explicitly; ownership is never derived at read time.
    pub async fn create(&self, input: HearingCreate, owner_id: Uuid) -> Result<Hearing, ServiceError> {
        assert_case_owned(&self.pool, input.case_id, owner_id).await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO hearings (user_id, case_id, hearing_date, court_room, hearing_type, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(input.case_id)
        .bind(input.hearing_date)
        .bind(&input.court_room)
        .bind(&input.hearing_type)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        self.get(id, owner_id).await
    }

    pub async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Hearing, ServiceError> {
        let sql = format!("{} WHERE h.id = $1 AND h.user_id = $2", SELECT_JOINED);
        sqlx::query_as::<_, Hearing>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Hearing not found".to_string()))
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        skip: Option<i64>,
        limit: Option<i64>,
        case_id: Option<Uuid>,
    ) -> Result<Vec<Hearing>, ServiceError> {
        let (skip, limit) = clamp_page(skip, limit);
        let sql = format!(
            "{} WHERE h.user_id = $1 AND ($2::uuid IS NULL OR h.case_id = $2) \
             ORDER BY h.hearing_date ASC LIMIT $3 OFFSET $4",
            SELECT_JOINED
        );

        let rows = sqlx::query_as::<_, Hearing>(&sql)
            .bind(owner_id)
            .bind(case_id)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: HearingUpdate,
        owner_id: Uuid,
    ) -> Result<Hearing, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }

        self.get(id, owner_id).await?;

        let mut qb = QueryBuilder::new("UPDATE hearings SET updated_at = now()");
        if let Some(hearing_date) = patch.hearing_date {
            qb.push(", hearing_date = ").push_bind(hearing_date);
        }
        if let Some(court_room) = &patch.court_room {
            qb.push(", court_room = ").push_bind(court_room);
        }
        if let Some(hearing_type) = &patch.hearing_type {
            qb.push(", hearing_type = ").push_bind(hearing_type);
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(notes) = &patch.notes {
            qb.push(", notes = ").push_bind(notes);
        }
        if let Some(result) = &patch.result {
            qb.push(", result = ").push_bind(result);
        }
        if let Some(next_hearing_date) = patch.next_hearing_date {
            qb.push(", next_hearing_date = ").push_bind(next_hearing_date);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(owner_id);
        qb.build().execute(&self.pool).await?;

        self.get(id, owner_id).await
    }

    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), ServiceError> {
        let deleted: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM hearings WHERE id = $1 AND user_id = $2 RETURNING id")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound("Hearing not found".to_string()))
    }
}
