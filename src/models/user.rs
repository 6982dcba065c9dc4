use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

use crate::config;
use crate::database::bind::bind_value;
use crate::database::build_update_fragment;
use crate::error::ApiError;

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

/// Public user shape. The password hash never leaves the model layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub async fn create(pool: &PgPool, data: UserCreate) -> Result<User, ApiError> {
        let existing =
            sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
                .bind(&data.username)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            return Err(ApiError::conflict(format!(
                "Duplicate username: {}",
                data.username
            )));
        }

        let hashed = hash_password(&data.password)?;
        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&data.username)
            .bind(&hashed)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.email)
            .bind(data.is_admin)
            .fetch_one(pool)
            .await?;

        tracing::info!("Created user {}", user.username);
        Ok(user)
    }

    /// Verify username/password. Wrong username and wrong password produce
    /// the same denial so the response leaks nothing about which was wrong.
    pub async fn authenticate(
        pool: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT username, password, first_name, last_name, email, is_admin \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        if let Some(row) = row {
            let matches = bcrypt::verify(password, &row.password).unwrap_or(false);
            if matches {
                return Ok(row.into());
            }
        }

        Err(ApiError::unauthorized("Invalid username/password"))
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, ApiError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<User, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))
    }

    /// Partial update. A supplied `password` value is re-hashed before the
    /// fragment is built so plaintext never reaches the database.
    pub async fn update(
        pool: &PgPool,
        username: &str,
        fields: &Map<String, Value>,
    ) -> Result<User, ApiError> {
        let mut fields = fields.clone();
        let hashed = match fields.get("password") {
            Some(password) => {
                let password = password.as_str().ok_or_else(|| {
                    ApiError::validation_error("password must be a string", None)
                })?;
                Some(hash_password(password)?)
            }
            None => None,
        };
        if let Some(hashed) = hashed {
            // insert on an existing key keeps its position in the map
            fields.insert("password".to_string(), Value::String(hashed));
        }

        let column_map = HashMap::from([("firstName", "first_name"), ("lastName", "last_name")]);
        let fragment = build_update_fragment(&fields, &column_map)?;

        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            fragment.query,
            fragment.params.len() + 1,
            USER_COLUMNS
        );
        let mut q = sqlx::query_as::<_, User>(&sql);
        for param in fragment.params.iter() {
            q = bind_value(q, param);
        }
        q = q.bind(username);

        q.fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No user: {}", username)))
    }

    pub async fn delete(pool: &PgPool, username: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found(format!("No user: {}", username)));
        }
        Ok(())
    }
}

/// Row shape used only for credential checks
#[derive(Debug, FromRow)]
struct CredentialRow {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
}

impl From<CredentialRow> for User {
    fn from(row: CredentialRow) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to process password")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies_and_hides_plaintext() {
        let hashed = hash_password("hunter2").unwrap();
        assert_ne!(hashed, "hunter2");
        assert!(bcrypt::verify("hunter2", &hashed).unwrap());
        assert!(!bcrypt::verify("hunter3", &hashed).unwrap());
    }
}
