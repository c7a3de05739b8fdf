//! Query parameter parsing
//!
//! Callers supply parameters as a JSON object string; the engine only ever
//! sees a flat string-to-string mapping. Scalar values are rendered the
//! same way result cells are (null becomes the empty string); nested
//! values are rejected because the service expects flat parameters.

use serde_json::Value;
use std::collections::BTreeMap;

/// Parameter parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// Input is not valid JSON
    #[error("parameters are not valid JSON: {0}")]
    InvalidJson(String),

    /// Top-level value is not an object
    #[error("parameters must be a JSON object, got {0}")]
    NotAnObject(String),

    /// A value is an array or object
    #[error("parameter '{0}' must be a scalar value")]
    NonScalarValue(String),
}

/// Parse a caller-supplied JSON object string into query parameters.
///
/// An empty or whitespace-only input yields an empty mapping.
pub fn parse_parameters(input: &str) -> Result<BTreeMap<String, String>, ParamsError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(BTreeMap::new());
    }

    let value: Value =
        serde_json::from_str(input).map_err(|e| ParamsError::InvalidJson(e.to_string()))?;

    let object = match value {
        Value::Object(object) => object,
        other => return Err(ParamsError::NotAnObject(type_name(&other).to_string())),
    };

    let mut parameters = BTreeMap::new();
    for (key, value) in object {
        let rendered = match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ParamsError::NonScalarValue(key));
            }
        };
        parameters.insert(key, rendered);
    }

    Ok(parameters)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_empty_map() {
        assert!(parse_parameters("").unwrap().is_empty());
        assert!(parse_parameters("   ").unwrap().is_empty());
        assert!(parse_parameters("{}").unwrap().is_empty());
    }

    #[test]
    fn test_scalars_are_rendered() {
        let params =
            parse_parameters(r#"{"region": "emea", "year": 2024, "active": true, "note": null}"#)
                .unwrap();
        assert_eq!(params.get("region").unwrap(), "emea");
        assert_eq!(params.get("year").unwrap(), "2024");
        assert_eq!(params.get("active").unwrap(), "true");
        assert_eq!(params.get("note").unwrap(), "");
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            parse_parameters("{not json"),
            Err(ParamsError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            parse_parameters("[1, 2]"),
            Err(ParamsError::NotAnObject(_))
        ));
        assert!(matches!(
            parse_parameters("\"just a string\""),
            Err(ParamsError::NotAnObject(_))
        ));
    }

    #[test]
    fn test_nested_values_rejected() {
        let err = parse_parameters(r#"{"filters": {"a": 1}}"#).unwrap_err();
        match err {
            ParamsError::NonScalarValue(key) => assert_eq!(key, "filters"),
            other => panic!("Expected NonScalarValue, got {other:?}"),
        }
    }
}
