use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Hearing, HearingCreate, HearingUpdate};
use crate::services::HearingService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub case_id: Option<Uuid>,
}

/// POST /api/hearings
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<HearingCreate>,
) -> ApiResult<Hearing> {
    let hearing = HearingService::new(state.pool.clone())
        .create(input, user.user_id)
        .await?;
    Ok(ApiResponse::created(hearing))
}

/// GET /api/hearings
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Hearing>> {
    let hearings = HearingService::new(state.pool.clone())
        .list(user.user_id, query.skip, query.limit, query.case_id)
        .await?;
    Ok(ApiResponse::success(hearings))
}

/// GET /api/hearings/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Hearing> {
    let hearing = HearingService::new(state.pool.clone())
        .get(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(hearing))
}

/// PATCH /api/hearings/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<HearingUpdate>,
) -> ApiResult<Hearing> {
    let hearing = HearingService::new(state.pool.clone())
        .update(id, patch, user.user_id)
        .await?;
    Ok(ApiResponse::success(hearing))
}

/// DELETE /api/hearings/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    HearingService::new(state.pool.clone())
        .delete(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": id })))
}
