pub mod appointment_service;
pub mod auth_service;
pub mod case_service;
pub mod client_service;
pub mod event_service;
pub mod hearing_service;
pub mod scheduling;
pub mod stats_service;

pub use appointment_service::AppointmentService;
pub use auth_service::AuthService;
pub use case_service::CaseService;
pub use client_service::ClientService;
pub use event_service::EventService;
pub use hearing_service::HearingService;
pub use stats_service::StatsService;

use sqlx::PgExecutor;
use thiserror::Error;
use uuid::Uuid;

/// Business-logic failures surfaced by every service. The HTTP layer only
/// translates these to status codes; it never recovers from them.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Record absent, or owned by a different user (indistinguishable)
    #[error("{0}")]
    NotFound(String),

    /// Scheduling overlap, duplicate unique field, or blocked delete
    #[error("{0}")]
    Conflict(String),

    /// Missing/malformed fields, out-of-range values, short search query
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Credential backend error: {0}")]
    Credential(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<crate::auth::CredentialError> for ServiceError {
    fn from(err: crate::auth::CredentialError) -> Self {
        ServiceError::Credential(err.to_string())
    }
}

/// Clamp pagination parameters: skip is floored at 0, limit is forced into
/// `1..=max_page_size`.
pub fn clamp_page(skip: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let config = crate::config::config();
    let skip = skip.unwrap_or(0).max(0);
    let limit = limit
        .unwrap_or(config.api.default_page_size)
        .clamp(1, config.api.max_page_size);
    (skip, limit)
}

/// Validate a search query: at least `min_search_length` chars after
/// trimming. Returns the trimmed query.
pub fn validate_search_query(query: &str) -> Result<&str, ServiceError> {
    let trimmed = query.trim();
    let min = crate::config::config().api.min_search_length;
    if trimmed.len() < min {
        return Err(ServiceError::InvalidInput(format!(
            "Search query must be at least {} characters",
            min
        )));
    }
    Ok(trimmed)
}

/// Validate a required text field: non-empty after trimming, within length.
pub fn require_text(field: &str, value: &str, max_len: usize) -> Result<(), ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{} must not be empty", field)));
    }
    if trimmed.len() > max_len {
        return Err(ServiceError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

/// Translate Postgres constraint violations (unique 23505, foreign key
/// 23503) raised by a statement into Conflict; the pre-checks cover the
/// common path, this covers the race between check and write.
pub(crate) fn constraint_conflict(err: sqlx::Error, message: &str) -> ServiceError {
    match &err {
        sqlx::Error::Database(db)
            if matches!(db.code().as_deref(), Some("23505") | Some("23503")) =>
        {
            ServiceError::Conflict(message.to_string())
        }
        _ => ServiceError::Database(err),
    }
}

/// Ownership is never inherited implicitly: every create/update that
/// references a client must re-verify it belongs to the same owner.
pub(crate) async fn assert_client_owned<'e, E>(
    executor: E,
    client_id: Uuid,
    owner_id: Uuid,
) -> Result<(), ServiceError>
where
    E: PgExecutor<'e>,
{
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1 AND user_id = $2)")
            .bind(client_id)
            .bind(owner_id)
            .fetch_one(executor)
            .await?;

    if exists {
        Ok(())
    } else {
        Err(ServiceError::NotFound("Client not found".to_string()))
    }
}

/// Same re-verification for case references.
pub(crate) async fn assert_case_owned<'e, E>(
    executor: E,
    case_id: Uuid,
    owner_id: Uuid,
) -> Result<(), ServiceError>
where
    E: PgExecutor<'e>,
{
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cases WHERE id = $1 AND user_id = $2)")
            .bind(case_id)
            .bind(owner_id)
            .fetch_one(executor)
            .await?;

    if exists {
        Ok(())
    } else {
        Err(ServiceError::NotFound("Case not found".to_string()))
    }
}
