use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

use crate::database::bind::bind_value;
use crate::database::{build_update_fragment, JobFilter};
use crate::error::ApiError;

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobCreate {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl Job {
    /// Create a job. The company reference is checked up front so a dangling
    /// handle fails validation before any row is inserted.
    pub async fn create(pool: &PgPool, data: JobCreate) -> Result<Job, ApiError> {
        if let Some(equity) = data.equity {
            validate_equity(equity)?;
        }
        if let Some(salary) = data.salary {
            if salary < 0 {
                return Err(ApiError::validation_error("salary must be non-negative", None));
            }
        }

        let company =
            sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
                .bind(&data.company_handle)
                .fetch_optional(pool)
                .await?;
        if company.is_none() {
            return Err(ApiError::validation_error(
                format!("Company does not exist: {}", data.company_handle),
                None,
            ));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(pool)
            .await?;

        tracing::info!("Created job {} at {}", job.id, job.company_handle);
        Ok(job)
    }

    pub async fn find_all(pool: &PgPool, filter: &JobFilter) -> Result<Vec<Job>, ApiError> {
        let where_sql = filter.to_where_sql();
        let sql = [
            format!("SELECT {} FROM jobs", JOB_COLUMNS),
            where_sql.query.clone(),
            "ORDER BY id".to_string(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for param in where_sql.params.iter() {
            q = bind_value(q, param);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<Job, ApiError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))
    }

    /// Partial update. `id` and `company_handle` are immutable; the handler
    /// rejects them before the fragment is built.
    pub async fn update(
        pool: &PgPool,
        id: i32,
        fields: &Map<String, Value>,
    ) -> Result<Job, ApiError> {
        if let Some(equity) = fields.get("equity").filter(|v| !v.is_null()) {
            let equity: Decimal = serde_json::from_value(equity.clone())
                .map_err(|_| ApiError::validation_error("equity must be a number", None))?;
            validate_equity(equity)?;
        }

        let fragment = build_update_fragment(fields, &HashMap::new())?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            fragment.query,
            fragment.params.len() + 1,
            JOB_COLUMNS
        );
        let mut q = sqlx::query_as::<_, Job>(&sql);
        for param in fragment.params.iter() {
            q = bind_value(q, param);
        }
        q = q.bind(id);

        q.fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {}", id)))
    }

    pub async fn delete(pool: &PgPool, id: i32) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found(format!("No job: {}", id)));
        }
        Ok(())
    }
}

fn validate_equity(equity: Decimal) -> Result<(), ApiError> {
    if equity < Decimal::ZERO || equity > Decimal::ONE {
        return Err(ApiError::validation_error(
            "equity must be between 0 and 1",
            None,
        ));
    }
    Ok(())
}
