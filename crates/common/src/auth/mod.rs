//! Authentication utilities
//!
//! Provides:
//! - Password digests for the administrator account
//! - JWT token generation and validation
//! - The `AdminUser` extractor guarding write endpoints

use crate::errors::{AppError, Result};
use crate::services::AuthService;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (username)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs: i64::try_from(expiration_secs).unwrap_or(i64::MAX),
        }
    }

    /// Generate a new HS256 token for `username`
    pub fn generate_token(&self, username: &str) -> Result<String> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.expiration_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AppError::Configuration {
                message: "JWT expiration is out of range".to_string(),
            })?;

        let claims = JwtClaims {
            sub: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to generate token: {}", e),
        })
    }

    /// Validate and decode a token; a leading `Bearer ` is tolerated
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Unauthorized {
                    message: "token expired".to_string(),
                },
                _ => AppError::Unauthorized {
                    message: "token validation failed".to_string(),
                },
            })
    }
}

/// SHA-256 hex digest used to store the administrator password
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password against a stored digest
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password).eq_ignore_ascii_case(stored_hash)
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Authenticated administrator, extracted from a valid Bearer token
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing Authorization header".to_string(),
            })?;

        let token = extract_bearer(auth_header).ok_or_else(|| AppError::Unauthorized {
            message: "Invalid token format".to_string(),
        })?;

        let auth = Arc::<AuthService>::from_ref(state);
        let username = auth.validate_token(token)?;

        Ok(AdminUser { username })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_digest() {
        let hash = hash_password("admin123");
        assert_eq!(hash.len(), 64);
        assert!(verify_password("admin123", &hash));
        assert!(verify_password("admin123", &hash.to_uppercase()));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer("abc.def"), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test_secret", 3600);

        let token = manager.generate_token("admin").unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);

        let prefixed = manager.validate_token(&format!("Bearer {}", token)).unwrap();
        assert_eq!(prefixed.sub, "admin");
    }

    #[test]
    fn test_jwt_rejects_foreign_secret() {
        let issuer = JwtManager::new("one", 3600);
        let verifier = JwtManager::new("two", 3600);
        let token = issuer.generate_token("admin").unwrap();

        let err = verifier.validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_jwt_rejects_garbage() {
        let manager = JwtManager::new("secret", 3600);
        assert!(manager.validate_token("not-a-token").is_err());
    }
}
