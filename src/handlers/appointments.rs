use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Appointment, AppointmentCreate, AppointmentStatus, AppointmentUpdate};
use crate::services::AppointmentService;
use crate::state::AppState;

use super::SearchQuery;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// POST /api/appointments
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<AppointmentCreate>,
) -> ApiResult<Appointment> {
    let appointment = AppointmentService::new(state.pool.clone())
        .create(input, user.user_id)
        .await?;
    Ok(ApiResponse::created(appointment))
}

/// GET /api/appointments
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Appointment>> {
    let appointments = AppointmentService::new(state.pool.clone())
        .list(user.user_id, query.skip, query.limit, query.status)
        .await?;
    Ok(ApiResponse::success(appointments))
}

/// GET /api/appointments/range?from=...&to=...
pub async fn range(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<Appointment>> {
    let appointments = AppointmentService::new(state.pool.clone())
        .list_range(user.user_id, query.from, query.to)
        .await?;
    Ok(ApiResponse::success(appointments))
}

/// GET /api/appointments/search?q=...
pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Appointment>> {
    let appointments = AppointmentService::new(state.pool.clone())
        .search(user.user_id, &query.q)
        .await?;
    Ok(ApiResponse::success(appointments))
}

/// GET /api/appointments/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Appointment> {
    let appointment = AppointmentService::new(state.pool.clone())
        .get(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(appointment))
}

/// PATCH /api/appointments/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AppointmentUpdate>,
) -> ApiResult<Appointment> {
    let appointment = AppointmentService::new(state.pool.clone())
        .update(id, patch, user.user_id)
        .await?;
    Ok(ApiResponse::success(appointment))
}

/// DELETE /api/appointments/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    AppointmentService::new(state.pool.clone())
        .delete(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": id })))
}
