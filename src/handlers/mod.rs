pub mod auth;
pub mod companies;
pub mod jobs;
pub mod users;

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::ApiError;

/// Reject a partial-update body containing keys outside the entity's mutable
/// set. Runs before the fragment builder so unknown keys never reach SQL.
fn ensure_known_fields(data: &Map<String, Value>, allowed: &[&str]) -> Result<(), ApiError> {
    let unknown: HashMap<String, String> = data
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .map(|key| (key.clone(), "Unknown field".to_string()))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(
            "Request contains unknown fields",
            Some(unknown),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_fields_pass() {
        let data = json!({ "name": "n", "description": "d" });
        assert!(ensure_known_fields(data.as_object().unwrap(), &["name", "description"]).is_ok());
    }

    #[test]
    fn unknown_fields_are_reported_per_field() {
        let data = json!({ "name": "n", "handle": "nope" });
        let err = ensure_known_fields(data.as_object().unwrap(), &["name"]).unwrap_err();
        match err {
            ApiError::ValidationError { field_errors, .. } => {
                let field_errors = field_errors.unwrap();
                assert!(field_errors.contains_key("handle"));
                assert!(!field_errors.contains_key("name"));
            }
            other => panic!("expected ValidationError, got {:?}", other.error_code()),
        }
    }
}
