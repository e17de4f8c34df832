//! Shared value helpers.

use serde_json::Value;

/// Option maps for rules, runtime calls and interpolation params.
pub type Options = serde_json::Map<String, Value>;

/// Whether a value counts as empty for `skipEmpty` and the `required` check.
///
/// Null, blank strings, empty arrays and empty objects are empty. `false` and
/// `0` are values.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Scalar text of a value, if it has one.
///
/// Strings are returned as-is and numbers/booleans in their JSON form.
/// Containers and null have no scalar text.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Numeric reading of a value: JSON numbers and numeric strings.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Human rendering used when interpolating a value into a message.
///
/// Strings render without quotes, arrays as a comma-separated list.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!("   ")));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
    }

    #[test]
    fn falsy_scalars_are_not_empty() {
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!("0")));
    }

    #[test]
    fn numbers_from_strings() {
        assert_eq!(as_number(&json!("12.5")), Some(12.5));
        assert_eq!(as_number(&json!(" 3 ")), Some(3.0));
        assert_eq!(as_number(&json!(7)), Some(7.0));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!(true)), None);
    }

    #[test]
    fn display_lists_and_strings() {
        assert_eq!(display_value(&json!("abc")), "abc");
        assert_eq!(display_value(&json!(["a", 1, true])), "a, 1, true");
        assert_eq!(display_value(&json!(4.5)), "4.5");
        assert_eq!(display_value(&Value::Null), "");
    }
}
