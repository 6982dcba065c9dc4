use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

use crate::database::bind::bind_value;
use crate::database::{build_update_fragment, CompanyFilter};
use crate::error::ApiError;
use crate::models::job::Job;

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyCreate {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Detail view: the company plus its open jobs
#[derive(Debug, Serialize)]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

impl Company {
    pub async fn create(pool: &PgPool, data: CompanyCreate) -> Result<Company, ApiError> {
        let existing =
            sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
                .bind(&data.handle)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            return Err(ApiError::conflict(format!(
                "Duplicate company: {}",
                data.handle
            )));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(pool)
            .await?;

        tracing::info!("Created company {}", company.handle);
        Ok(company)
    }

    pub async fn find_all(pool: &PgPool, filter: &CompanyFilter) -> Result<Vec<Company>, ApiError> {
        filter.validate()?;
        let where_sql = filter.to_where_sql();
        let sql = [
            format!("SELECT {} FROM companies", COMPANY_COLUMNS),
            where_sql.query.clone(),
            "ORDER BY name".to_string(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for param in where_sql.params.iter() {
            q = bind_value(q, param);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyWithJobs, ApiError> {
        let sql = format!(
            "SELECT {} FROM companies WHERE handle = $1",
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))?;

        let jobs = sqlx::query_as::<_, Job>(
            "SELECT id, title, salary, equity, company_handle FROM jobs \
             WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(pool)
        .await?;

        Ok(CompanyWithJobs { company, jobs })
    }

    /// Partial update: only the supplied fields change.
    pub async fn update(
        pool: &PgPool,
        handle: &str,
        fields: &Map<String, Value>,
    ) -> Result<Company, ApiError> {
        let column_map = HashMap::from([("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);
        let fragment = build_update_fragment(fields, &column_map)?;

        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            fragment.query,
            fragment.params.len() + 1,
            COMPANY_COLUMNS
        );
        let mut q = sqlx::query_as::<_, Company>(&sql);
        for param in fragment.params.iter() {
            q = bind_value(q, param);
        }
        q = q.bind(handle);

        q.fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))
    }

    pub async fn delete(pool: &PgPool, handle: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM companies WHERE handle = $1")
            .bind(handle)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found(format!("No company: {}", handle)));
        }
        Ok(())
    }
}
