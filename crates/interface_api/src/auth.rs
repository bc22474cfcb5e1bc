//! Authentication
//!
//! Callers present a JWT whose claims name the user and the tenant they act
//! for. The tenant is forwarded to the completion gateway as the end-user
//! tag and recorded on every audit line.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{TenantId, UserId};
use domain_actions::ActionContext;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Tenant the user acts for
    pub tenant_id: String,
    /// User's roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid identity claim: {0}")]
    InvalidIdentity(String),
}

impl Claims {
    /// Typed caller context for the dispatcher
    pub fn context(&self) -> Result<ActionContext, AuthError> {
        let user_id: UserId = self
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidIdentity("sub".to_string()))?;
        let tenant_id: TenantId = self
            .tenant_id
            .parse()
            .map_err(|_| AuthError::InvalidIdentity("tenant_id".to_string()))?;
        Ok(ActionContext::new(tenant_id, user_id))
    }
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - User identifier
/// * `tenant_id` - Tenant identifier
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    user_id: &UserId,
    tenant_id: &TenantId,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        tenant_id: tenant_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
///
/// # Arguments
///
/// * `token` - The JWT token to validate
/// * `secret` - JWT secret key
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip_yields_context() {
        let user = UserId::new();
        let tenant = TenantId::new();
        let token = create_token(&user, &tenant, vec!["advisor".into()], SECRET, 60).unwrap();

        let claims = validate_token(&token, SECRET).unwrap();
        let context = claims.context().unwrap();

        assert_eq!(context.user_id, user);
        assert_eq!(context.tenant_id, tenant);
        assert_eq!(claims.roles, vec!["advisor".to_string()]);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&UserId::new(), &TenantId::new(), vec![], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: UserId::new().to_string(),
            tenant_id: TenantId::new().to_string(),
            roles: vec![],
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_malformed_tenant_claim() {
        let claims = Claims {
            sub: UserId::new().to_string(),
            tenant_id: "not-a-tenant".to_string(),
            roles: vec![],
            exp: 0,
            iat: 0,
        };
        assert!(matches!(claims.context(), Err(AuthError::InvalidIdentity(_))));
    }
}
