use axum::extract::{Path, Query};
use axum::{Extension, Json};
use serde_json::{json, Map, Value};

use crate::database::manager::DatabaseManager;
use crate::database::CompanyFilter;
use crate::middleware::{policy, ApiResponse, ApiResult, AuthContext};
use crate::models::{Company, CompanyCreate, CompanyWithJobs};

use super::ensure_known_fields;

const MUTABLE_FIELDS: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

/// GET /companies - list companies, optionally filtered (anonymous)
pub async fn company_list(Query(filter): Query<CompanyFilter>) -> ApiResult<Vec<Company>> {
    let pool = DatabaseManager::pool().await?;
    let companies = Company::find_all(&pool, &filter).await?;
    Ok(ApiResponse::success(companies))
}

/// POST /companies - create a company (admin)
pub async fn company_post(
    Extension(context): Extension<AuthContext>,
    Json(body): Json<CompanyCreate>,
) -> ApiResult<Company> {
    policy::require_admin(&context)?;

    let pool = DatabaseManager::pool().await?;
    let company = Company::create(&pool, body).await?;
    Ok(ApiResponse::created(company))
}

/// GET /companies/:handle - company detail with its jobs (anonymous)
pub async fn company_get(Path(handle): Path<String>) -> ApiResult<CompanyWithJobs> {
    let pool = DatabaseManager::pool().await?;
    let company = Company::get(&pool, &handle).await?;
    Ok(ApiResponse::success(company))
}

/// PATCH /companies/:handle - partial update (admin)
pub async fn company_patch(
    Extension(context): Extension<AuthContext>,
    Path(handle): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Company> {
    policy::require_admin(&context)?;
    ensure_known_fields(&body, MUTABLE_FIELDS)?;

    let pool = DatabaseManager::pool().await?;
    let company = Company::update(&pool, &handle, &body).await?;
    Ok(ApiResponse::success(company))
}

/// DELETE /companies/:handle - remove a company (admin)
pub async fn company_delete(
    Extension(context): Extension<AuthContext>,
    Path(handle): Path<String>,
) -> ApiResult<Value> {
    policy::require_admin(&context)?;

    let pool = DatabaseManager::pool().await?;
    Company::delete(&pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
