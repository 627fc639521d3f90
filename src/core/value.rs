use serde_json::Value;

/// Option values are stored as JSON values: booleans, strings, numbers,
/// lists and structured records all fit.
pub type OptionValue = Value;

/// Host-style truthiness of a stored option.
///
/// `null`, `false`, `0`, `""`, `"0"` and empty lists/records are falsy,
/// everything else is truthy.
pub fn is_truthy(value: &OptionValue) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Truthiness of a named field inside a structured option.
///
/// Non-record values and missing fields are falsy.
pub fn field_is_truthy(value: &OptionValue, field: &str) -> bool {
    value.get(field).map(is_truthy).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));

        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!([0])));
        assert!(is_truthy(&json!({"kill_requests": false})));
    }

    #[test]
    fn test_field_truthiness() {
        let options = json!({"kill_requests": "1", "log": 0});
        assert!(field_is_truthy(&options, "kill_requests"));
        assert!(!field_is_truthy(&options, "log"));
        assert!(!field_is_truthy(&options, "missing"));
        assert!(!field_is_truthy(&json!(true), "kill_requests"));
    }
}
