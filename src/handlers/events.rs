use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Event, EventCreate, EventUpdate};
use crate::services::event_service::EventFilters;
use crate::services::EventService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub case_id: Option<Uuid>,
    pub event_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
}

/// POST /api/events
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<EventCreate>,
) -> ApiResult<Event> {
    let event = EventService::new(state.pool.clone())
        .create(input, user.user_id)
        .await?;
    Ok(ApiResponse::created(event))
}

/// GET /api/events
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Event>> {
    let filters = EventFilters {
        from: query.from,
        to: query.to,
        case_id: query.case_id,
        event_type: query.event_type,
    };
    let events = EventService::new(state.pool.clone())
        .list(user.user_id, query.skip, query.limit, filters)
        .await?;
    Ok(ApiResponse::success(events))
}

/// GET /api/events/upcoming?days=N
pub async fn upcoming(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Vec<Event>> {
    let events = EventService::new(state.pool.clone())
        .list_upcoming(user.user_id, query.days.unwrap_or(7))
        .await?;
    Ok(ApiResponse::success(events))
}

/// GET /api/events/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Event> {
    let event = EventService::new(state.pool.clone())
        .get(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(event))
}

/// PATCH /api/events/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<EventUpdate>,
) -> ApiResult<Event> {
    let event = EventService::new(state.pool.clone())
        .update(id, patch, user.user_id)
        .await?;
    Ok(ApiResponse::success(event))
}

/// DELETE /api/events/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    EventService::new(state.pool.clone())
        .delete(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": id })))
}
