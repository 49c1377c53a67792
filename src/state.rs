use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{BcryptJwtBackend, CredentialBackend, InsecureBackend};
use crate::config::{AppConfig, AuthBackend};

/// Shared application state injected into every handler. The persistence
/// handle and credential capability are passed explicitly rather than held
/// as process-wide globals.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub credentials: Arc<dyn CredentialBackend>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        let credentials: Arc<dyn CredentialBackend> = match config.security.auth_backend {
            AuthBackend::BcryptJwt => {
                Arc::new(BcryptJwtBackend::new(config.security.jwt_secret.clone()))
            }
            AuthBackend::Insecure => Arc::new(InsecureBackend),
        };

        Self { pool, credentials }
    }
}
