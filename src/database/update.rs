use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{QueryError, SqlResult};

/// Build the SET fragment of a partial UPDATE from the supplied fields.
///
/// Keys are visited in request order (serde_json is built with
/// `preserve_order`) and each emits `"column"=$n` with 1-based, strictly
/// increasing placeholders, so the returned params line up positionally with
/// the fragment. Keys missing from `column_map` pass through verbatim as
/// column names; whether such a column exists is the caller's problem.
pub fn build_update_fragment(
    fields: &Map<String, Value>,
    column_map: &HashMap<&str, &str>,
) -> Result<SqlResult, QueryError> {
    if fields.is_empty() {
        return Err(QueryError::EmptyUpdate);
    }

    let mut assignments = Vec::with_capacity(fields.len());
    let mut params = Vec::with_capacity(fields.len());

    for (index, (name, value)) in fields.iter().enumerate() {
        let column = column_map
            .get(name.as_str())
            .copied()
            .unwrap_or(name.as_str());
        assignments.push(format!("\"{}\"=${}", column, index + 1));
        params.push(value.clone());
    }

    Ok(SqlResult {
        query: assignments.join(", "),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn maps_field_names_through_column_map() {
        let data = fields(json!({ "firstName": "Aliya", "age": 32 }));
        let column_map = HashMap::from([("firstName", "first_name")]);

        let result = build_update_fragment(&data, &column_map).unwrap();
        assert_eq!(result.query, "\"first_name\"=$1, \"age\"=$2");
        assert_eq!(result.params, vec![json!("Aliya"), json!(32)]);
    }

    #[test]
    fn placeholders_align_with_params_in_input_order() {
        let data = fields(json!({ "c": 1, "a": 2, "b": 3 }));

        let result = build_update_fragment(&data, &HashMap::new()).unwrap();
        // preserve_order keeps request order, not alphabetical order
        assert_eq!(result.query, "\"c\"=$1, \"a\"=$2, \"b\"=$3");
        assert_eq!(result.params, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(result.params.len(), result.query.matches('$').count());
    }

    #[test]
    fn unknown_field_falls_back_to_raw_name() {
        let data = fields(json!({ "nonsense": true }));
        let column_map = HashMap::from([("firstName", "first_name")]);

        let result = build_update_fragment(&data, &column_map).unwrap();
        assert_eq!(result.query, "\"nonsense\"=$1");
    }

    #[test]
    fn null_values_are_kept_as_params() {
        let data = fields(json!({ "title": "New", "equity": null }));

        let result = build_update_fragment(&data, &HashMap::new()).unwrap();
        assert_eq!(result.query, "\"title\"=$1, \"equity\"=$2");
        assert_eq!(result.params, vec![json!("New"), Value::Null]);
    }

    #[test]
    fn empty_field_set_is_rejected() {
        let data = Map::new();

        assert!(matches!(
            build_update_fragment(&data, &HashMap::new()),
            Err(QueryError::EmptyUpdate)
        ));
    }
}
