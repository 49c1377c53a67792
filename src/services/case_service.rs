use sqlx::{PgExecutor, PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::{Case, CaseCreate, CaseStatus, CaseUpdate};

use super::{
    assert_client_owned, clamp_page, constraint_conflict, require_text, validate_search_query,
    ServiceError,
};

const SELECT_JOINED: &str = r#"
    SELECT c.*, cl.name AS client_name
    FROM cases c
    LEFT JOIN clients cl ON c.client_id = cl.id
"#;

pub struct CaseService {
    pool: PgPool,
}

impl CaseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: CaseCreate, owner_id: Uuid) -> Result<Case, ServiceError> {
        require_text("case_number", &input.case_number, 50)?;
        require_text("title", &input.title, 200)?;
        require_text("case_type", &input.case_type, 100)?;

        if case_number_taken(&self.pool, input.case_number.trim(), None).await? {
            return Err(ServiceError::Conflict("Case number already in use".to_string()));
        }

        if let Some(client_id) = input.client_id {
            assert_client_owned(&self.pool, client_id, owner_id).await?;
        }

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO cases
                (user_id, client_id, case_number, title, description, case_type, priority,
                 court_name, judge_name, opposing_party, case_value,
                 start_date, expected_end_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(input.client_id)
        .bind(input.case_number.trim())
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.case_type.trim())
        .bind(input.priority.as_str())
        .bind(&input.court_name)
        .bind(&input.judge_name)
        .bind(&input.opposing_party)
        .bind(input.case_value)
        .bind(input.start_date)
        .bind(input.expected_end_date)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_conflict(e, "Case number already in use"))?;

        self.get(id, owner_id).await
    }

    pub async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Case, ServiceError> {
        let sql = format!("{} WHERE c.id = $1 AND c.user_id = $2", SELECT_JOINED);
        sqlx::query_as::<_, Case>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Case not found".to_string()))
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        skip: Option<i64>,
        limit: Option<i64>,
        status: Option<CaseStatus>,
    ) -> Result<Vec<Case>, ServiceError> {
        let (skip, limit) = clamp_page(skip, limit);
        let sql = format!(
            "{} WHERE c.user_id = $1 AND ($2::text IS NULL OR c.status = $2) \
             ORDER BY c.created_at DESC LIMIT $3 OFFSET $4",
            SELECT_JOINED
        );

        let rows = sqlx::query_as::<_, Case>(&sql)
            .bind(owner_id)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Cases referencing a given client. The client itself must be owned by
    /// the caller.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<Case>, ServiceError> {
        assert_client_owned(&self.pool, client_id, owner_id).await?;

        let sql = format!(
            "{} WHERE c.client_id = $1 AND c.user_id = $2 ORDER BY c.created_at DESC",
            SELECT_JOINED
        );
        let rows = sqlx::query_as::<_, Case>(&sql)
            .bind(client_id)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: CaseUpdate,
        owner_id: Uuid,
    ) -> Result<Case, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }
        if let Some(case_number) = &patch.case_number {
            require_text("case_number", case_number, 50)?;
        }
        if let Some(title) = &patch.title {
            require_text("title", title, 200)?;
        }
        if let Some(case_type) = &patch.case_type {
            require_text("case_type", case_type, 100)?;
        }

        self.get(id, owner_id).await?;

        // Uniqueness re-checked only when the number changes, excluding self
        if let Some(case_number) = &patch.case_number {
            if case_number_taken(&self.pool, case_number.trim(), Some(id)).await? {
                return Err(ServiceError::Conflict("Case number already in use".to_string()));
            }
        }

        if let Some(client_id) = patch.client_id {
            assert_client_owned(&self.pool, client_id, owner_id).await?;
        }

        let mut qb = QueryBuilder::new("UPDATE cases SET updated_at = now()");
        if let Some(case_number) = &patch.case_number {
            qb.push(", case_number = ").push_bind(case_number.trim().to_string());
        }
        if let Some(title) = &patch.title {
            qb.push(", title = ").push_bind(title.trim().to_string());
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(case_type) = &patch.case_type {
            qb.push(", case_type = ").push_bind(case_type.trim().to_string());
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(client_id) = patch.client_id {
            qb.push(", client_id = ").push_bind(client_id);
        }
        if let Some(court_name) = &patch.court_name {
            qb.push(", court_name = ").push_bind(court_name);
        }
        if let Some(judge_name) = &patch.judge_name {
            qb.push(", judge_name = ").push_bind(judge_name);
        }
        if let Some(opposing_party) = &patch.opposing_party {
            qb.push(", opposing_party = ").push_bind(opposing_party);
        }
        if let Some(case_value) = patch.case_value {
            qb.push(", case_value = ").push_bind(case_value);
        }
        if let Some(start_date) = patch.start_date {
            qb.push(", start_date = ").push_bind(start_date);
        }
        if let Some(expected_end_date) = patch.expected_end_date {
            qb.push(", expected_end_date = ").push_bind(expected_end_date);
        }
        if let Some(actual_end_date) = patch.actual_end_date {
            qb.push(", actual_end_date = ").push_bind(actual_end_date);
        }
        if let Some(priority) = patch.priority {
            qb.push(", priority = ").push_bind(priority.as_str());
        }
        if let Some(notes) = &patch.notes {
            qb.push(", notes = ").push_bind(notes);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(owner_id);
        qb.build()
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_conflict(e, "Case number already in use"))?;

        self.get(id, owner_id).await
    }

    /// Delete a case. Hearings and events referencing it cascade at the
    /// database level.
    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), ServiceError> {
        let deleted: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM cases WHERE id = $1 AND user_id = $2 RETURNING id")
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;

        deleted
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound("Case not found".to_string()))
    }

    pub async fn search(&self, owner_id: Uuid, query: &str) -> Result<Vec<Case>, ServiceError> {
        let trimmed = validate_search_query(query)?;
        let pattern = format!("%{}%", trimmed);

        let sql = format!(
            "{} WHERE c.user_id = $1 AND (c.case_number ILIKE $2 OR c.title ILIKE $2 \
             OR c.description ILIKE $2 OR c.case_type ILIKE $2 OR c.court_name ILIKE $2 \
             OR c.judge_name ILIKE $2 OR c.opposing_party ILIKE $2 OR cl.name ILIKE $2) \
             ORDER BY c.created_at DESC",
            SELECT_JOINED
        );

        let rows = sqlx::query_as::<_, Case>(&sql)
            .bind(owner_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

/// Case numbers are unique across the firm; `exclude_id` skips the record
/// being updated.
async fn case_number_taken<'e, E>(
    executor: E,
    case_number: &str,
    exclude_id: Option<Uuid>,
) -> Result<bool, ServiceError>
where
    E: PgExecutor<'e>,
{
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM cases WHERE case_number = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(case_number)
    .bind(exclude_id)
    .fetch_one(executor)
    .await?;
    Ok(taken)
}
