use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

/// JWT claims carried by every issued token. `username` and `isAdmin` are the
/// identity contract; everything downstream of the middleware reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            username: username.into(),
            is_admin,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret is empty")]
    InvalidSecret,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Sign claims into a bearer token. The secret is an explicit parameter so
/// callers (and tests) control which key is used.
pub fn sign_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify a bearer token and return its claims. Fails on bad signature,
/// malformed input, or an expired `exp`.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let claims = Claims::new("u1", false);
        let token = sign_token(&claims, "test-secret").unwrap();

        let decoded = verify_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.username, "u1");
        assert!(!decoded.is_admin);
        assert_eq!(decoded.iat, claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let claims = Claims::new("u1", true);
        let token = sign_token(&claims, "secret-a").unwrap();

        assert!(matches!(
            verify_token(&token, "secret-b"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(verify_token("not-a-token", "test-secret").is_err());
        assert!(verify_token("", "test-secret").is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        let claims = Claims::new("u1", false);
        assert!(matches!(
            sign_token(&claims, ""),
            Err(AuthError::InvalidSecret)
        ));
    }

    #[test]
    fn claims_serialize_is_admin_as_camel_case() {
        let claims = Claims::new("u1", true);
        let v = serde_json::to_value(&claims).unwrap();
        assert_eq!(v["isAdmin"], serde_json::json!(true));
        assert!(v["iat"].is_number());
    }
}
