use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Case, CaseCreate, CaseStatus, CaseUpdate};
use crate::services::CaseService;
use crate::state::AppState;

use super::SearchQuery;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<CaseStatus>,
}

/// POST /api/cases
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CaseCreate>,
) -> ApiResult<Case> {
    let case = CaseService::new(state.pool.clone())
        .create(input, user.user_id)
        .await?;
    Ok(ApiResponse::created(case))
}

/// GET /api/cases
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Case>> {
    let cases = CaseService::new(state.pool.clone())
        .list(user.user_id, query.skip, query.limit, query.status)
        .await?;
    Ok(ApiResponse::success(cases))
}

/// GET /api/cases/search?q=...
pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Case>> {
    let cases = CaseService::new(state.pool.clone())
        .search(user.user_id, &query.q)
        .await?;
    Ok(ApiResponse::success(cases))
}

/// GET /api/cases/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Case> {
    let case = CaseService::new(state.pool.clone())
        .get(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(case))
}

/// PATCH /api/cases/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CaseUpdate>,
) -> ApiResult<Case> {
    let case = CaseService::new(state.pool.clone())
        .update(id, patch, user.user_id)
        .await?;
    Ok(ApiResponse::success(case))
}

/// DELETE /api/cases/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    CaseService::new(state.pool.clone())
        .delete(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": id })))
}
