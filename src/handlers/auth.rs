use axum::{extract::State, Extension, Json};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::UserResponse;
use crate::services::auth_service::{LoginRequest, RegisterRequest, TokenResponse};
use crate::services::AuthService;
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> ApiResult<UserResponse> {
    let service = AuthService::new(state.pool.clone(), state.credentials.clone());
    let user = service.register(input).await?;
    Ok(ApiResponse::created(user))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let service = AuthService::new(state.pool.clone(), state.credentials.clone());
    let token = service.login(input).await?;
    Ok(ApiResponse::success(token))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<UserResponse> {
    let service = AuthService::new(state.pool.clone(), state.credentials.clone());
    let profile = service.me(user.user_id).await?;
    Ok(ApiResponse::success(profile))
}
