// Loose coercions over record values
//
// Record values arrive as JSON. Checks compare them the way form input is
// usually compared: numeric strings behave like numbers, other strings compare
// as text, and anything that cannot be compared makes the check fail.

use serde_json::{Number, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Normalize a value for validation: strings are trimmed, `null` becomes the
/// empty string, everything else passes through unchanged.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                Value::String(s)
            } else {
                Value::String(trimmed.to_string())
            }
        }
        Value::Null => Value::String(String::new()),
        other => other,
    }
}

/// Text form of a scalar. Arrays and objects have none.
///
/// Booleans follow form conventions: `true` is `"1"`, `false` is `""`.
pub fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) | Value::Null => Some(Cow::Borrowed("")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Human readable form used in messages.
pub fn display(value: &Value) -> String {
    match as_text(value) {
        Some(text) => text.into_owned(),
        None => value.to_string(),
    }
}

/// Numeric form of a number or numeric string.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Parse a decimal literal: optional sign, digits with an optional fraction,
/// optional exponent. Surrounding whitespace is allowed; `inf`/`nan` are not.
pub fn parse_numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    if !is_numeric_literal(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_numeric_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Whether the value is an integer: a JSON integer or a string of ASCII
/// digits only.
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

/// Compare two values.
///
/// Numbers (and numeric strings) compare numerically; two non-numeric
/// strings compare by code point; booleans compare as `0`/`1` against
/// numbers. Any other combination is not comparable.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (comparable_number(left), comparable_number(right)) {
        return a.partial_cmp(&b);
    }
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::String(a), Value::Number(n)) => Some(a.as_str().cmp(n.to_string().as_str())),
        (Value::Number(n), Value::String(b)) => Some(n.to_string().as_str().cmp(b.as_str())),
        _ => None,
    }
}

fn comparable_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => as_number(other),
    }
}

/// Loose equality: numeric when both sides are numeric, exact otherwise.
pub fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(_), _)
        | (_, Value::Array(_))
        | (Value::Object(_), _)
        | (_, Value::Object(_)) => {
            left == right
        }
        _ => compare(left, right) == Some(Ordering::Equal),
    }
}

/// Read a non-negative integer parameter (`5`, `5.0` or `"5"`).
pub fn as_length(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => number_as_length(n),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

fn number_as_length(n: &Number) -> Option<usize> {
    if let Some(u) = n.as_u64() {
        return usize::try_from(u).ok();
    }
    n.as_f64()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= usize::MAX as f64)
        .map(|f| f as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_trims_strings_only() {
        assert_eq!(normalize(json!("  hi \n")), json!("hi"));
        assert_eq!(normalize(json!(null)), json!(""));
        assert_eq!(normalize(json!([" a "])), json!([" a "]));
        assert_eq!(normalize(json!(30)), json!(30));
    }

    #[test]
    fn test_numeric_literals() {
        for ok in ["1", "-3", "+2.5", ".5", "5.", "1e5", "2.5E-3", " 7 "] {
            assert!(parse_numeric(ok).is_some(), "{ok} should be numeric");
        }
        for bad in ["", "-", ".", "e5", "1e", "inf", "NaN", "0x1A", "1,5", "12abc"] {
            assert!(parse_numeric(bad).is_none(), "{bad} should not be numeric");
        }
    }

    #[test]
    fn test_is_integer() {
        assert!(is_integer(&json!(30)));
        assert!(is_integer(&json!(-4)));
        assert!(is_integer(&json!("0042")));
        assert!(!is_integer(&json!("-4")));
        assert!(!is_integer(&json!("4.0")));
        assert!(!is_integer(&json!(4.5)));
        assert!(!is_integer(&json!("")));
        assert!(!is_integer(&json!(true)));
    }

    #[test]
    fn test_compare_mixed_values() {
        assert_eq!(compare(&json!("10"), &json!(9)), Some(Ordering::Greater));
        assert_eq!(compare(&json!("abc"), &json!("abd")), Some(Ordering::Less));
        assert_eq!(compare(&json!(true), &json!(1)), Some(Ordering::Equal));
        assert_eq!(compare(&json!([1]), &json!(1)), None);
        assert_eq!(compare(&json!({}), &json!("a")), None);
    }

    #[test]
    fn test_loose_equality() {
        assert!(loosely_equal(&json!("5"), &json!(5)));
        assert!(loosely_equal(&json!("x"), &json!("x")));
        assert!(!loosely_equal(&json!("x"), &json!("X")));
        assert!(loosely_equal(&json!([1, 2]), &json!([1, 2])));
        assert!(!loosely_equal(&json!([1, 2]), &json!("1,2")));
    }

    #[test]
    fn test_as_length() {
        assert_eq!(as_length(&json!(5)), Some(5));
        assert_eq!(as_length(&json!("12")), Some(12));
        assert_eq!(as_length(&json!(3.0)), Some(3));
        assert_eq!(as_length(&json!(-1)), None);
        assert_eq!(as_length(&json!(2.5)), None);
        assert_eq!(as_length(&json!(true)), None);
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(as_text(&json!(true)).as_deref(), Some("1"));
        assert_eq!(as_text(&json!(false)).as_deref(), Some(""));
        assert_eq!(as_text(&json!(2.5)).as_deref(), Some("2.5"));
        assert!(as_text(&json!([1])).is_none());
        assert_eq!(display(&json!(["a"])), "[\"a\"]");
    }
}
