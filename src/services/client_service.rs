use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::{Client, ClientCreate, ClientUpdate};

use super::{clamp_page, constraint_conflict, require_text, validate_search_query, ServiceError};

pub struct ClientService {
    pool: PgPool,
}

impl ClientService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: ClientCreate, owner_id: Uuid) -> Result<Client, ServiceError> {
        require_text("name", &input.name, 255)?;

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (user_id, name, email, phone, identity_number, address, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.identity_number)
        .bind(&input.address)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<Client, ServiceError> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Client not found".to_string()))
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Client>, ServiceError> {
        let (skip, limit) = clamp_page(skip, limit);
        let rows = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: ClientUpdate,
        owner_id: Uuid,
    ) -> Result<Client, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput("No fields to update".to_string()));
        }
        if let Some(name) = &patch.name {
            require_text("name", name, 255)?;
        }

        // Existence + ownership check before building the update
        self.get(id, owner_id).await?;

        let mut qb = QueryBuilder::new("UPDATE clients SET updated_at = now()");
        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.trim().to_string());
        }
        if let Some(email) = &patch.email {
            qb.push(", email = ").push_bind(email);
        }
        if let Some(phone) = &patch.phone {
            qb.push(", phone = ").push_bind(phone);
        }
        if let Some(identity_number) = &patch.identity_number {
            qb.push(", identity_number = ").push_bind(identity_number);
        }
        if let Some(address) = &patch.address {
            qb.push(", address = ").push_bind(address);
        }
        if let Some(notes) = &patch.notes {
            qb.push(", notes = ").push_bind(notes);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND user_id = ").push_bind(owner_id);
        qb.build().execute(&self.pool).await?;

        self.get(id, owner_id).await
    }

    /// Delete a client. Blocked with Conflict while dependent cases exist;
    /// the count is reported to the caller.
    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), ServiceError> {
        self.get(id, owner_id).await?;

        let dependent_cases: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cases WHERE client_id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        if dependent_cases > 0 {
            return Err(ServiceError::Conflict(format!(
                "Cannot delete client with {} dependent case(s)",
                dependent_cases
            )));
        }

        // A case created between the count and the delete trips RESTRICT;
        // surface that the same way as the counted path
        sqlx::query("DELETE FROM clients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_conflict(e, "Cannot delete client with dependent case(s)"))?;

        Ok(())
    }

    pub async fn search(&self, owner_id: Uuid, query: &str) -> Result<Vec<Client>, ServiceError> {
        let trimmed = validate_search_query(query)?;
        let pattern = format!("%{}%", trimmed);

        let rows = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE user_id = $1 \
             AND (name ILIKE $2 OR email ILIKE $2 OR phone ILIKE $2 OR identity_number ILIKE $2) \
             ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
