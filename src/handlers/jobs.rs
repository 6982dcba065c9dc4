use axum::extract::{Path, Query};
use axum::{Extension, Json};
use serde_json::{json, Map, Value};

use crate::database::manager::DatabaseManager;
use crate::database::JobFilter;
use crate::middleware::{policy, ApiResponse, ApiResult, AuthContext};
use crate::models::{Job, JobCreate};

use super::ensure_known_fields;

// company_handle is deliberately absent: a job cannot move between companies
const MUTABLE_FIELDS: &[&str] = &["title", "salary", "equity"];

/// GET /jobs - list jobs, optionally filtered (anonymous)
pub async fn job_list(Query(filter): Query<JobFilter>) -> ApiResult<Vec<Job>> {
    let pool = DatabaseManager::pool().await?;
    let jobs = Job::find_all(&pool, &filter).await?;
    Ok(ApiResponse::success(jobs))
}

/// POST /jobs - create a job (admin)
pub async fn job_post(
    Extension(context): Extension<AuthContext>,
    Json(body): Json<JobCreate>,
) -> ApiResult<Job> {
    policy::require_admin(&context)?;

    let pool = DatabaseManager::pool().await?;
    let job = Job::create(&pool, body).await?;
    Ok(ApiResponse::created(job))
}

/// GET /jobs/:id - job detail (anonymous)
pub async fn job_get(Path(id): Path<i32>) -> ApiResult<Job> {
    let pool = DatabaseManager::pool().await?;
    let job = Job::get(&pool, id).await?;
    Ok(ApiResponse::success(job))
}

/// PATCH /jobs/:id - partial update (admin)
pub async fn job_patch(
    Extension(context): Extension<AuthContext>,
    Path(id): Path<i32>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Job> {
    policy::require_admin(&context)?;
    ensure_known_fields(&body, MUTABLE_FIELDS)?;

    let pool = DatabaseManager::pool().await?;
    let job = Job::update(&pool, id, &body).await?;
    Ok(ApiResponse::success(job))
}

/// DELETE /jobs/:id - remove a job (admin)
pub async fn job_delete(
    Extension(context): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    policy::require_admin(&context)?;

    let pool = DatabaseManager::pool().await?;
    Job::delete(&pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
