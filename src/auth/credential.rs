use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::Claims;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Hashing failed: {0}")]
    Hashing(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Signing secret not configured")]
    MissingSecret,
}

/// Capability interface for credential verification and token issuance.
///
/// Services depend on this trait rather than on bcrypt/jsonwebtoken
/// directly, so test environments can swap in a deterministic backend
/// via configuration.
pub trait CredentialBackend: Send + Sync {
    fn hash_password(&self, plain: &str) -> Result<String, CredentialError>;

    /// Compare a plaintext secret against a stored hash. A mismatch is
    /// `Ok(false)`, not an error.
    fn verify_password(&self, plain: &str, hash: &str) -> Result<bool, CredentialError>;

    fn issue_token(&self, claims: &Claims) -> Result<String, CredentialError>;

    fn verify_token(&self, token: &str) -> Result<Claims, CredentialError>;
}

/// Production backend: bcrypt password hashes, HS256-signed JWTs.
pub struct BcryptJwtBackend {
    secret: String,
}

impl BcryptJwtBackend {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

impl CredentialBackend for BcryptJwtBackend {
    fn hash_password(&self, plain: &str) -> Result<String, CredentialError> {
        bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    fn verify_password(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        bcrypt::verify(plain, hash).map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    fn issue_token(&self, claims: &Claims) -> Result<String, CredentialError> {
        if self.secret.is_empty() {
            return Err(CredentialError::MissingSecret);
        }
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &key)
            .map_err(|e| CredentialError::TokenGeneration(e.to_string()))
    }

    fn verify_token(&self, token: &str) -> Result<Claims, CredentialError> {
        if self.secret.is_empty() {
            return Err(CredentialError::MissingSecret);
        }
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let data = decode::<Claims>(token, &key, &Validation::default())
            .map_err(|_| CredentialError::InvalidToken)?;
        Ok(data.claims)
    }
}

/// Deterministic backend for test environments: stores passwords reversed,
/// encodes claims as plain JSON. Never selected in production config.
pub struct InsecureBackend;

impl CredentialBackend for InsecureBackend {
    fn hash_password(&self, plain: &str) -> Result<String, CredentialError> {
        Ok(format!("insecure:{}", plain.chars().rev().collect::<String>()))
    }

    fn verify_password(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        Ok(hash == self.hash_password(plain)?)
    }

    fn issue_token(&self, claims: &Claims) -> Result<String, CredentialError> {
        serde_json::to_string(claims).map_err(|e| CredentialError::TokenGeneration(e.to_string()))
    }

    fn verify_token(&self, token: &str) -> Result<Claims, CredentialError> {
        let claims: Claims =
            serde_json::from_str(token).map_err(|_| CredentialError::InvalidToken)?;
        if claims.exp < chrono::Utc::now().timestamp() {
            return Err(CredentialError::InvalidToken);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn jwt_backend_round_trips_claims() {
        let backend = BcryptJwtBackend::new("test-secret");
        let claims = Claims::new(Uuid::new_v4(), "law@firm.example".into(), 1);

        let token = backend.issue_token(&claims).unwrap();
        let decoded = backend.verify_token(&token).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, claims.email);
    }

    #[test]
    fn jwt_backend_rejects_wrong_secret() {
        let issuer = BcryptJwtBackend::new("secret-a");
        let verifier = BcryptJwtBackend::new("secret-b");
        let claims = Claims::new(Uuid::new_v4(), "law@firm.example".into(), 1);

        let token = issuer.issue_token(&claims).unwrap();
        assert!(matches!(verifier.verify_token(&token), Err(CredentialError::InvalidToken)));
    }

    #[test]
    fn jwt_backend_requires_secret() {
        let backend = BcryptJwtBackend::new("");
        let claims = Claims::new(Uuid::new_v4(), "law@firm.example".into(), 1);
        assert!(matches!(backend.issue_token(&claims), Err(CredentialError::MissingSecret)));
    }

    #[test]
    fn bcrypt_verify_mismatch_is_ok_false() {
        let backend = BcryptJwtBackend::new("test-secret");
        let hash = backend.hash_password("correct horse").unwrap();
        assert!(backend.verify_password("correct horse", &hash).unwrap());
        assert!(!backend.verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn insecure_backend_round_trips() {
        let backend = InsecureBackend;
        let hash = backend.hash_password("hunter22").unwrap();
        assert!(backend.verify_password("hunter22", &hash).unwrap());
        assert!(!backend.verify_password("hunter23", &hash).unwrap());

        let claims = Claims::new(Uuid::new_v4(), "law@firm.example".into(), 1);
        let token = backend.issue_token(&claims).unwrap();
        assert_eq!(backend.verify_token(&token).unwrap().sub, claims.sub);
    }
}
