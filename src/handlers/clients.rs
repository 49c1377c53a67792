use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Case, Client, ClientCreate, ClientUpdate};
use crate::services::{CaseService, ClientService};
use crate::state::AppState;

use super::{PageQuery, SearchQuery};

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<ClientCreate>,
) -> ApiResult<Client> {
    let client = ClientService::new(state.pool.clone())
        .create(input, user.user_id)
        .await?;
    Ok(ApiResponse::created(client))
}

/// GET /api/clients
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Client>> {
    let clients = ClientService::new(state.pool.clone())
        .list(user.user_id, page.skip, page.limit)
        .await?;
    Ok(ApiResponse::success(clients))
}

/// GET /api/clients/search?q=...
pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Client>> {
    let clients = ClientService::new(state.pool.clone())
        .search(user.user_id, &query.q)
        .await?;
    Ok(ApiResponse::success(clients))
}

/// GET /api/clients/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Client> {
    let client = ClientService::new(state.pool.clone())
        .get(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(client))
}

/// PATCH /api/clients/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ClientUpdate>,
) -> ApiResult<Client> {
    let client = ClientService::new(state.pool.clone())
        .update(id, patch, user.user_id)
        .await?;
    Ok(ApiResponse::success(client))
}

/// DELETE /api/clients/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    ClientService::new(state.pool.clone())
        .delete(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(serde_json::json!({ "deleted": id })))
}

/// GET /api/clients/:id/cases
pub async fn cases(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Case>> {
    let cases = CaseService::new(state.pool.clone())
        .list_for_client(id, user.user_id)
        .await?;
    Ok(ApiResponse::success(cases))
}
