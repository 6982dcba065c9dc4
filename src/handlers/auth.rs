use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{sign_token, Claims};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{User, UserCreate};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// POST /auth/token - exchange credentials for a bearer token
pub async fn token_post(Json(body): Json<TokenRequest>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let user = User::authenticate(&pool, &body.username, &body.password).await?;

    let token = issue_token(&user)?;
    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register - public signup; always creates a non-admin user
pub async fn register_post(Json(body): Json<RegisterRequest>) -> ApiResult<Value> {
    let pool = DatabaseManager::pool().await?;
    let user = User::create(
        &pool,
        UserCreate {
            username: body.username,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            is_admin: false,
        },
    )
    .await?;

    let token = issue_token(&user)?;
    Ok(ApiResponse::created(json!({ "token": token })))
}

pub(super) fn issue_token(user: &User) -> Result<String, ApiError> {
    let claims = Claims::new(user.username.as_str(), user.is_admin);
    sign_token(&claims, &config::config().security.jwt_secret).map_err(|e| {
        tracing::error!("Token signing failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })
}
