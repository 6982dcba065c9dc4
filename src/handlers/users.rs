use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::{json, Map, Value};

use crate::database::manager::DatabaseManager;
use crate::middleware::{policy, ApiResponse, ApiResult, AuthContext};
use crate::models::{User, UserCreate};

use super::{auth::issue_token, ensure_known_fields};

// username and isAdmin can only be set at creation time
const MUTABLE_FIELDS: &[&str] = &["firstName", "lastName", "password", "email"];

/// GET /users - list users (admin)
pub async fn user_list(Extension(context): Extension<AuthContext>) -> ApiResult<Vec<User>> {
    policy::require_admin(&context)?;

    let pool = DatabaseManager::pool().await?;
    let users = User::find_all(&pool).await?;
    Ok(ApiResponse::success(users))
}

/// POST /users - create a user, possibly an admin (admin). Unlike
/// registration this returns a token for the new user, so an admin can hand
/// out working credentials directly.
pub async fn user_post(
    Extension(context): Extension<AuthContext>,
    Json(body): Json<UserCreate>,
) -> ApiResult<Value> {
    policy::require_admin(&context)?;

    let pool = DatabaseManager::pool().await?;
    let user = User::create(&pool, body).await?;
    let token = issue_token(&user)?;
    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

/// GET /users/:username - user detail (admin or self)
pub async fn user_get(
    Extension(context): Extension<AuthContext>,
    Path(username): Path<String>,
) -> ApiResult<User> {
    policy::require_admin_or_self(&context, &username)?;

    let pool = DatabaseManager::pool().await?;
    let user = User::get(&pool, &username).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /users/:username - partial update (admin or self)
pub async fn user_patch(
    Extension(context): Extension<AuthContext>,
    Path(username): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<User> {
    policy::require_admin_or_self(&context, &username)?;
    ensure_known_fields(&body, MUTABLE_FIELDS)?;

    let pool = DatabaseManager::pool().await?;
    let user = User::update(&pool, &username, &body).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /users/:username - remove a user (admin or self)
pub async fn user_delete(
    Extension(context): Extension<AuthContext>,
    Path(username): Path<String>,
) -> ApiResult<Value> {
    policy::require_admin_or_self(&context, &username)?;

    let pool = DatabaseManager::pool().await?;
    User::delete(&pool, &username).await?;
    Ok(ApiResponse::success(json!({ "deleted": username })))
}
