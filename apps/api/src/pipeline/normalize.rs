//! Coercion helpers shared by the per-task normalizers. All of them are total.

use serde_json::Value;

/// Numeric reading of a loosely-typed score. Absent, non-numeric or
/// non-finite values become 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };

    if number.is_finite() {
        number
    } else {
        0.0
    }
}

/// The value when it is a non-empty string, otherwise the placeholder.
pub fn text_or(value: Option<&Value>, placeholder: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => placeholder.to_string(),
    }
}

/// The elements when the value is an array, otherwise an empty sequence.
pub fn array_or_empty(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
