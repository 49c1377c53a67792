use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::stats_service::{DashboardStats, MonthlyStats};
use crate::services::StatsService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/stats
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<DashboardStats> {
    let stats = StatsService::new(state.pool.clone())
        .dashboard(user.user_id)
        .await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/stats/monthly?year=YYYY&month=M
pub async fn monthly(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MonthlyQuery>,
) -> ApiResult<MonthlyStats> {
    let stats = StatsService::new(state.pool.clone())
        .monthly(user.user_id, query.year, query.month)
        .await?;
    Ok(ApiResponse::success(stats))
}
