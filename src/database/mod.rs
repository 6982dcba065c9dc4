pub mod bind;
pub mod filter;
pub mod manager;
pub mod update;

pub use filter::{CompanyFilter, JobFilter};
pub use update::build_update_fragment;

use thiserror::Error;

/// A SQL fragment plus the positional parameters bound to its placeholders.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}

/// Errors from the SQL fragment builders.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No data to update")]
    EmptyUpdate,

    #[error("{0}")]
    BadBounds(String),
}
