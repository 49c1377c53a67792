use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{Claims, CredentialBackend};
use crate::config::config;
use crate::models::{User, UserResponse};

use super::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: UserResponse,
}

pub struct AuthService {
    pool: PgPool,
    credentials: Arc<dyn CredentialBackend>,
}

impl AuthService {
    pub fn new(pool: PgPool, credentials: Arc<dyn CredentialBackend>) -> Self {
        Self { pool, credentials }
    }

    pub async fn register(&self, input: RegisterRequest) -> Result<UserResponse, ServiceError> {
        let email = normalize_email(&input.email)?;

        let min_len = config().security.min_password_length;
        if input.password.len() < min_len {
            return Err(ServiceError::InvalidInput(format!(
                "Password must be at least {} characters",
                min_len
            )));
        }

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(&email)
                .fetch_one(&self.pool)
                .await?;
        if taken {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.credentials.hash_password(&input.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| super::constraint_conflict(e, "Email already registered"))?;

        Ok(user.into())
    }

    /// Authenticate and issue a token. Unknown email and wrong password
    /// produce the same error so callers cannot enumerate accounts.
    pub async fn login(&self, input: LoginRequest) -> Result<TokenResponse, ServiceError> {
        let email = normalize_email(&input.email)?;

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let user = match user {
            Some(user) => user,
            None => return Err(invalid_credentials()),
        };

        if !self.credentials.verify_password(&input.password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        if !user.is_active {
            return Err(ServiceError::Unauthorized("Account is inactive".to_string()));
        }

        let expiry_hours = config().security.jwt_expiry_hours;
        let claims = Claims::new(user.id, user.email.clone(), expiry_hours);
        let access_token = self.credentials.issue_token(&claims)?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer",
            expires_in: expiry_hours * 3600,
            user: user.into(),
        })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponse, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Account no longer exists".to_string()))?;
        Ok(user.into())
    }
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid email or password".to_string())
}

fn normalize_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !well_formed {
        return Err(ServiceError::InvalidInput("Invalid email address".to_string()));
    }
    Ok(email)
}
