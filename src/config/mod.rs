use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub scheduling: SchedulingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Hard cap for the `limit` pagination parameter.
    pub max_page_size: i64,
    pub default_page_size: i64,
    /// Minimum trimmed length for search queries.
    pub min_search_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub min_password_length: usize,
    /// Which credential backend to use. The insecure backend exists for
    /// test environments only and is never selected in production.
    pub auth_backend: AuthBackend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthBackend {
    BcryptJwt,
    Insecure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Allowed appointment duration range, in minutes.
    pub min_duration_minutes: i32,
    pub max_duration_minutes: i32,
    pub default_duration_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment-specific defaults first, then specific env overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs = v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("AUTH_BACKEND") {
            self.security.auth_backend = match v.as_str() {
                "insecure" if self.environment != Environment::Production => AuthBackend::Insecure,
                _ => AuthBackend::BcryptJwt,
            };
        }

        // Scheduling overrides
        if let Ok(v) = env::var("APPOINTMENT_MIN_DURATION_MINUTES") {
            self.scheduling.min_duration_minutes = v.parse().unwrap_or(self.scheduling.min_duration_minutes);
        }
        if let Ok(v) = env::var("APPOINTMENT_MAX_DURATION_MINUTES") {
            self.scheduling.max_duration_minutes = v.parse().unwrap_or(self.scheduling.max_duration_minutes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            api: ApiConfig {
                max_page_size: 100,
                default_page_size: 100,
                min_search_length: 2,
            },
            security: SecurityConfig {
                jwt_secret: "dev-only-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                min_password_length: 8,
                auth_backend: AuthBackend::BcryptJwt,
            },
            scheduling: SchedulingConfig {
                min_duration_minutes: 15,
                max_duration_minutes: 480, // 8 hours
                default_duration_minutes: 60,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            api: ApiConfig {
                max_page_size: 100,
                default_page_size: 50,
                min_search_length: 2,
            },
            security: SecurityConfig {
                // Must be overridden by JWT_SECRET in any real deployment
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                min_password_length: 8,
                auth_backend: AuthBackend::BcryptJwt,
            },
            scheduling: SchedulingConfig {
                min_duration_minutes: 15,
                max_duration_minutes: 480,
                default_duration_minutes: 60,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
