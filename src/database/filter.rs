use serde::Deserialize;
use serde_json::Value;

use super::{QueryError, SqlResult};

/// Recognized list filters for companies. Every key is optional; absent keys
/// contribute no clause.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

/// Recognized list filters for jobs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
}

impl CompanyFilter {
    /// Check the filter for contradictory bounds. Callers run this before
    /// building SQL; the builder itself has no failure modes.
    pub fn validate(&self) -> Result<(), QueryError> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(QueryError::BadBounds(format!(
                    "minEmployees {} cannot be greater than maxEmployees {}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Produce a `WHERE …` fragment (or the empty string) with parameterized
    /// values. Filter values are never spliced into the SQL text.
    pub fn to_where_sql(&self) -> SqlResult {
        let mut parts = WhereParts::new();

        if let Some(name) = self.name.as_deref().filter(|s| !s.is_empty()) {
            let placeholder = parts.param(Value::String(format!("%{}%", name)));
            parts.push(format!("\"name\" ILIKE {}", placeholder));
        }
        // A bound of zero is treated the same as an absent bound. Historical
        // behavior, kept on purpose.
        if let Some(min) = self.min_employees.filter(|&v| v != 0) {
            let placeholder = parts.param(Value::from(min));
            parts.push(format!("\"num_employees\" >= {}", placeholder));
        }
        if let Some(max) = self.max_employees.filter(|&v| v != 0) {
            let placeholder = parts.param(Value::from(max));
            parts.push(format!("\"num_employees\" <= {}", placeholder));
        }

        parts.finish()
    }
}

impl JobFilter {
    pub fn to_where_sql(&self) -> SqlResult {
        let mut parts = WhereParts::new();

        if let Some(title) = self.title.as_deref().filter(|s| !s.is_empty()) {
            let placeholder = parts.param(Value::String(format!("%{}%", title)));
            parts.push(format!("\"title\" ILIKE {}", placeholder));
        }
        // Zero-as-absent, same as the employee bounds above.
        if let Some(min) = self.min_salary.filter(|&v| v != 0) {
            let placeholder = parts.param(Value::from(min));
            parts.push(format!("\"salary\" >= {}", placeholder));
        }
        match self.has_equity {
            // Matches every non-null equity including zero. Historical
            // behavior, kept on purpose.
            Some(true) => parts.push("\"equity\" >= 0".to_string()),
            Some(false) => parts.push("\"equity\" = 0".to_string()),
            None => {}
        }

        parts.finish()
    }
}

/// Accumulates AND-joined conditions and their positional parameters.
struct WhereParts {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl WhereParts {
    fn new() -> Self {
        Self {
            conditions: vec![],
            params: vec![],
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn push(&mut self, condition: String) {
        self.conditions.push(condition);
    }

    fn finish(self) -> SqlResult {
        let query = if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        };
        SqlResult {
            query,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_yields_empty_clause() {
        let result = CompanyFilter::default().to_where_sql();
        assert_eq!(result.query, "");
        assert!(result.params.is_empty());

        let result = JobFilter::default().to_where_sql();
        assert_eq!(result.query, "");
        assert!(result.params.is_empty());
    }

    #[test]
    fn name_filter_is_parameterized_ilike() {
        let filter = CompanyFilter {
            name: Some("dev".to_string()),
            ..Default::default()
        };

        let result = filter.to_where_sql();
        assert_eq!(result.query, "WHERE \"name\" ILIKE $1");
        assert_eq!(result.params, vec![json!("%dev%")]);
    }

    #[test]
    fn quote_characters_never_reach_the_sql_text() {
        let filter = CompanyFilter {
            name: Some("o'reilly\"; DROP TABLE companies; --".to_string()),
            ..Default::default()
        };

        let result = filter.to_where_sql();
        assert_eq!(result.query, "WHERE \"name\" ILIKE $1");
        assert!(!result.query.contains('\''));
        assert_eq!(
            result.params,
            vec![json!("%o'reilly\"; DROP TABLE companies; --%")]
        );
    }

    #[test]
    fn all_company_filters_join_with_and_in_stable_order() {
        let filter = CompanyFilter {
            name: Some("net".to_string()),
            min_employees: Some(10),
            max_employees: Some(500),
        };

        filter.validate().unwrap();
        let result = filter.to_where_sql();
        assert_eq!(
            result.query,
            "WHERE \"name\" ILIKE $1 AND \"num_employees\" >= $2 AND \"num_employees\" <= $3"
        );
        assert_eq!(result.params, vec![json!("%net%"), json!(10), json!(500)]);
    }

    #[test]
    fn inverted_employee_bounds_are_rejected() {
        let filter = CompanyFilter {
            min_employees: Some(100),
            max_employees: Some(5),
            ..Default::default()
        };

        assert!(matches!(filter.validate(), Err(QueryError::BadBounds(_))));
    }

    // Documented quirk: a zero bound behaves as if the bound were never
    // supplied. Not a bug to fix silently.
    #[test]
    fn zero_minimum_bound_is_treated_as_absent() {
        let filter = CompanyFilter {
            min_employees: Some(0),
            ..Default::default()
        };

        let result = filter.to_where_sql();
        assert_eq!(result.query, "");
        assert!(result.params.is_empty());

        let filter = JobFilter {
            min_salary: Some(0),
            ..Default::default()
        };
        assert_eq!(filter.to_where_sql().query, "");
    }

    #[test]
    fn job_filters_join_in_stable_order() {
        let filter = JobFilter {
            title: Some("engineer".to_string()),
            min_salary: Some(90000),
            has_equity: Some(true),
        };

        let result = filter.to_where_sql();
        assert_eq!(
            result.query,
            "WHERE \"title\" ILIKE $1 AND \"salary\" >= $2 AND \"equity\" >= 0"
        );
        assert_eq!(result.params, vec![json!("%engineer%"), json!(90000)]);
    }

    // Documented quirk: hasEquity=true selects equity >= 0, which includes
    // zero-equity rows.
    #[test]
    fn has_equity_true_matches_non_negative_equity() {
        let filter = JobFilter {
            has_equity: Some(true),
            ..Default::default()
        };

        let result = filter.to_where_sql();
        assert_eq!(result.query, "WHERE \"equity\" >= 0");
        assert!(result.params.is_empty());
    }

    #[test]
    fn has_equity_false_selects_zero_equity() {
        let filter = JobFilter {
            has_equity: Some(false),
            ..Default::default()
        };

        let result = filter.to_where_sql();
        assert_eq!(result.query, "WHERE \"equity\" = 0");
    }
}
