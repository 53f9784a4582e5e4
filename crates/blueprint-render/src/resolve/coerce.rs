//! Coercions from resolved values to text and booleans.

use serde_json::Value;

/// String form used for text nodes and attributes.
///
/// `None` and JSON `null` become the empty string; arrays and objects use
/// their compact JSON representation.
pub fn to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Boolean coercion.
///
/// Null is false, booleans pass through, numbers are true when non-zero, and
/// everything else is true only if its string form is `"true"` in any case.
pub fn to_bool(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(other) => to_text(Some(other)).eq_ignore_ascii_case("true"),
    }
}

/// Non-null and, for strings, arrays and objects, non-empty.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

/// Membership test.
///
/// Arrays compare elements by equality, objects test the target's string
/// form against their keys, strings test for a substring. Anything else does
/// not contain anything.
pub fn contains(collection: Option<&Value>, target: Option<&Value>) -> bool {
    match collection {
        Some(Value::Array(items)) => {
            let target = target.unwrap_or(&Value::Null);
            items.iter().any(|item| item == target)
        }
        Some(Value::Object(map)) => match target {
            None | Some(Value::Null) => false,
            Some(t) => map.contains_key(&to_text(Some(t))),
        },
        Some(Value::String(s)) => match target {
            None | Some(Value::Null) => false,
            Some(t) => s.contains(&to_text(Some(t))),
        },
        _ => false,
    }
}

/// Converts JSON `null` into `None`.
pub fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}
