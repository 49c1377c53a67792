// HTTP surface, split by resource. Handlers stay thin: extract, delegate
// to a service, wrap in the response envelope.
pub mod appointments;
pub mod auth;
pub mod cases;
pub mod clients;
pub mod events;
pub mod hearings;
pub mod stats;

use serde::Deserialize;

/// Pagination query parameters shared by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Search query parameter shared by search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}
