use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::auth::{self, Claims};
use crate::config;

/// Authenticated user context extracted from JWT claims
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
    pub iat: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
            iat: claims.iat,
        }
    }
}

/// Per-request identity context: empty for anonymous requests, populated when
/// a valid bearer token was presented. Built fresh by [`authenticate`] on
/// every request and discarded with it.
#[derive(Clone, Debug, Default)]
pub struct AuthContext(Option<AuthUser>);

impl AuthContext {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn from_user(user: AuthUser) -> Self {
        Self(Some(user))
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

/// Authentication middleware. Decodes the bearer token, if any, and attaches
/// the resulting [`AuthContext`] to the request.
///
/// This never rejects a request: a missing or invalid token just means the
/// context stays empty and the request proceeds as anonymous. Enforcement
/// belongs to the policy checks.
pub async fn authenticate(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let context = match bearer_token(&headers) {
        Some(token) => {
            match auth::verify_token(&token, &config::config().security.jwt_secret) {
                Ok(claims) => AuthContext::from_user(claims.into()),
                Err(err) => {
                    tracing::debug!("Ignoring invalid bearer token: {}", err);
                    AuthContext::anonymous()
                }
            }
        }
        None => AuthContext::anonymous(),
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
