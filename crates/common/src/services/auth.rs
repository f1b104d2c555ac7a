//! Administrator authentication

use crate::auth::{verify_password, JwtManager};
use crate::config::AuthConfig;
use crate::domain::{LoginRequest, LoginResponse};
use crate::errors::{AppError, Result};
use tracing::{info, warn};
use validator::Validate;

/// Checks administrator credentials and issues session tokens
pub struct AuthService {
    jwt: JwtManager,
    admin_username: String,
    admin_password_hash: String,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_expiration_secs),
            admin_username: config.admin_username.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
        }
    }

    /// Exchange administrator credentials for a token
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        request.validate()?;

        if request.username != self.admin_username
            || !verify_password(&request.password, &self.admin_password_hash)
        {
            warn!(username = %request.username, "Rejected login attempt");
            return Err(AppError::Unauthorized {
                message: "invalid username or password".to_string(),
            });
        }

        let token = self.generate_token(&request.username)?;
        info!(username = %request.username, "Administrator logged in");

        Ok(LoginResponse {
            token,
            username: request.username,
        })
    }

    /// Validate a token and return the username it was issued to
    pub fn validate_token(&self, token: &str) -> Result<String> {
        self.jwt.validate_token(token).map(|claims| claims.sub)
    }

    pub fn generate_token(&self, username: &str) -> Result<String> {
        self.jwt.generate_token(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn service() -> AuthService {
        AuthService::new(&AuthConfig::default())
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_valid_token() {
        let service = service();
        let response = assert_ok!(service.login(login("admin", "admin123")).await);
        assert_eq!(response.username, "admin");
        assert_eq!(assert_ok!(service.validate_token(&response.token)), "admin");
        assert_eq!(
            assert_ok!(service.validate_token(&format!("Bearer {}", response.token))),
            "admin"
        );
    }

    #[tokio::test]
    async fn test_wrong_credentials() {
        let service = service();
        let err = assert_err!(service.login(login("admin", "nope")).await);
        assert!(matches!(err, AppError::Unauthorized { .. }));
        let err = assert_err!(service.login(login("root", "admin123")).await);
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_invalid_token() {
        let err = assert_err!(service().validate_token("garbage"));
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }
}
