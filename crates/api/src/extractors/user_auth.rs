//! User JWT authentication extractor.
//!
//! Couples and admins authenticate with an HS256 bearer token; tokens are
//! minted out-of-band. Guests never authenticate, they carry a session id.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use domain::models::UserRole;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use crate::error::ApiError;

/// JWT claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// "couple" or "admin".
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    /// Token id for session tracking.
    pub jti: String,
}

/// Authenticated user information from a validated JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: Uuid,
    pub role: UserRole,
    pub jti: String,
}

impl UserAuth {
    /// Rejects with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Validates an access token against the configured secret.
    pub fn validate(config: &JwtAuthConfig, token: &str) -> Result<Self, String> {
        let mut validation = Validation::default();
        validation.leeway = config.leeway_secs;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| "Invalid user ID in token".to_string())?;
        let role = UserRole::from_str(&data.claims.role)?;

        Ok(UserAuth {
            user_id,
            role,
            jti: data.claims.jti,
        })
    }
}

/// Mints an access token for the given user. Used by tests and ops tooling.
pub fn issue_access_token(
    config: &JwtAuthConfig,
    user_id: Uuid,
    role: UserRole,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + config.access_token_expiry_secs,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        UserAuth::validate(&state.config.jwt, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_jwt_config() -> JwtAuthConfig {
        JwtAuthConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 30,
        }
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let config = test_jwt_config();
        let user_id = Uuid::new_v4();

        let token = issue_access_token(&config, user_id, UserRole::Couple).unwrap();
        let auth = UserAuth::validate(&config, &token).unwrap();

        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.role, UserRole::Couple);
        assert!(!auth.jti.is_empty());
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let config = test_jwt_config();
        let token = issue_access_token(&config, Uuid::new_v4(), UserRole::Admin).unwrap();

        let other = JwtAuthConfig {
            secret: "different-secret".to_string(),
            ..test_jwt_config()
        };
        assert!(UserAuth::validate(&other, &token).is_err());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        assert!(UserAuth::validate(&test_jwt_config(), "not.a.jwt").is_err());
    }

    #[test]
    fn test_require_admin() {
        let couple = UserAuth {
            user_id: Uuid::new_v4(),
            role: UserRole::Couple,
            jti: "t".to_string(),
        };
        assert!(couple.require_admin().is_err());

        let admin = UserAuth {
            role: UserRole::Admin,
            ..couple
        };
        assert!(admin.require_admin().is_ok());
    }
}
