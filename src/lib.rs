pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Build the full router: public routes, then the `/api` tree behind the
/// bearer-token middleware, then global layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .merge(protected_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::{appointments, auth, cases, clients, events, hearings, stats};

    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/clients", get(clients::list).post(clients::create))
        .route("/api/clients/search", get(clients::search))
        .route(
            "/api/clients/:id",
            get(clients::get).patch(clients::update).delete(clients::delete),
        )
        .route("/api/clients/:id/cases", get(clients::cases))
        .route("/api/cases", get(cases::list).post(cases::create))
        .route("/api/cases/search", get(cases::search))
        .route(
            "/api/cases/:id",
            get(cases::get).patch(cases::update).delete(cases::delete),
        )
        .route("/api/events", get(events::list).post(events::create))
        .route("/api/events/upcoming", get(events::upcoming))
        .route(
            "/api/events/:id",
            get(events::get).patch(events::update).delete(events::delete),
        )
        .route(
            "/api/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route("/api/appointments/range", get(appointments::range))
        .route("/api/appointments/search", get(appointments::search))
        .route(
            "/api/appointments/:id",
            get(appointments::get)
                .patch(appointments::update)
                .delete(appointments::delete),
        )
        .route("/api/hearings", get(hearings::list).post(hearings::create))
        .route(
            "/api/hearings/:id",
            get(hearings::get).patch(hearings::update).delete(hearings::delete),
        )
        .route("/api/stats", get(stats::dashboard))
        .route("/api/stats/monthly", get(stats::monthly))
        .layer(from_fn_with_state(state, require_auth))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok"
    }))
}

/// Liveness plus a database ping. Reports degraded rather than failing the
/// request when the pool is unreachable.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match db::health_check(&state.pool).await {
        Ok(()) => "ok",
        Err(_) => "unreachable",
    };
    Json(json!({
        "status": "ok",
        "database": database
    }))
}
