// Check predicates
//
// Pure functions over normalized values. The validators decide what to report;
// these only answer whether a value satisfies a rule.

use crate::value::{as_text, is_integer, parse_numeric};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static SAFE_TEXT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9áéíóúÁÉÍÓÚñÑäëïöüÄËÏÖÜ’ ?!%+\-,.;$¿¡=:´_/\\@()#'*|\r\n]+$").unwrap()
});

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[123][0-9]{3}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12][0-9]|3[01])$").unwrap()
});

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:[01]?[0-9]|2[0-3]):[0-5]?[0-9]:)?[0-5]?[0-9]$").unwrap()
});

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[123][0-9]{3}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12][0-9]|3[01])\s(?:(?:[01]?[0-9]|2[0-3]):[0-5]?[0-9]:)?[0-5]?[0-9]$",
    )
    .unwrap()
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$").unwrap()
});

/// Empty string (after trimming), `null` and `false` count as missing.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Null | Value::Bool(false) => false,
        _ => true,
    }
}

pub fn is_int(value: &Value) -> bool {
    is_integer(value)
}

pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => parse_numeric(s).is_some(),
        _ => false,
    }
}

/// Accepts `true`, `false`, integer `1`/`0` and the strings `"1"`, `"0"`,
/// `"yes"`, `"no"`.
pub fn is_bool(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_i64(), Some(0 | 1)) && !n.is_f64(),
        Value::String(s) => matches!(s.as_str(), "1" | "0" | "yes" | "no"),
        _ => false,
    }
}

pub fn is_email(value: &Value) -> bool {
    let Value::String(s) = value else {
        return false;
    };
    if s.len() > 254 || !EMAIL_REGEX.is_match(s) {
        return false;
    }
    match s.rsplit_once('@') {
        Some((local, _)) => {
            local.len() <= 64
                && !local.starts_with('.')
                && !local.ends_with('.')
                && !local.contains("..")
        }
        None => false,
    }
}

pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

fn text_matches(value: &Value, regex: &Regex) -> bool {
    as_text(value).is_some_and(|text| regex.is_match(&text))
}

pub fn is_safe_text(value: &Value) -> bool {
    text_matches(value, &SAFE_TEXT_REGEX)
}

pub fn is_date(value: &Value) -> bool {
    text_matches(value, &DATE_REGEX)
}

pub fn is_time(value: &Value) -> bool {
    text_matches(value, &TIME_REGEX)
}

pub fn is_datetime(value: &Value) -> bool {
    text_matches(value, &DATETIME_REGEX)
}

/// Compile a caller-supplied pattern.
///
/// Delimited patterns (`/^a+$/i`, `#\d+#`) are unwrapped and their trailing
/// flags turned into inline flags; anything else is compiled as-is.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    match split_delimited(pattern) {
        Some((body, flags)) => {
            let inline: String = flags
                .chars()
                .filter(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'U'))
                .collect();
            if inline.is_empty() {
                Regex::new(body)
            } else {
                Regex::new(&format!("(?{}){}", inline, body))
            }
        }
        None => Regex::new(pattern),
    }
}

fn split_delimited(pattern: &str) -> Option<(&str, &str)> {
    let delimiter = pattern.chars().next()?;
    if !matches!(delimiter, '/' | '#' | '~' | '!' | '@' | '%' | '|' | ';' | ',') {
        return None;
    }
    let end = pattern.rfind(delimiter)?;
    if end == 0 {
        return None;
    }
    let flags = &pattern[end + delimiter.len_utf8()..];
    if !flags
        .chars()
        .all(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'u' | 'U' | 'D'))
    {
        return None;
    }
    Some((&pattern[delimiter.len_utf8()..end], flags))
}

pub fn matches_pattern(value: &Value, regex: &Regex) -> bool {
    text_matches(value, regex)
}

/// Length in bytes of the text form.
pub fn byte_length(value: &Value) -> Option<usize> {
    as_text(value).map(|text| text.len())
}

/// Length in characters of the text form.
pub fn char_length(value: &Value) -> Option<usize> {
    as_text(value).map(|text| text.chars().count())
}

/// Which temporal type a relational check parses its operands as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Date,
    Datetime,
}

impl Temporal {
    pub fn default_format(self) -> &'static str {
        match self {
            Temporal::Date => DEFAULT_DATE_FORMAT,
            Temporal::Datetime => DEFAULT_DATETIME_FORMAT,
        }
    }
}

/// Parse both operands with `format` and order them. `None` when either
/// side does not parse.
pub fn compare_temporal(
    kind: Temporal,
    value: &Value,
    other: &Value,
    format: &str,
) -> Option<Ordering> {
    let left = as_text(value)?;
    let right = as_text(other)?;
    match kind {
        Temporal::Date => {
            let a = NaiveDate::parse_from_str(left.trim(), format).ok()?;
            let b = NaiveDate::parse_from_str(right.trim(), format).ok()?;
            Some(a.cmp(&b))
        }
        Temporal::Datetime => {
            let a = NaiveDateTime::parse_from_str(left.trim(), format).ok()?;
            let b = NaiveDateTime::parse_from_str(right.trim(), format).ok()?;
            Some(a.cmp(&b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presence() {
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!("   ")));
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!(false)));
        assert!(is_present(&json!(0)));
        assert!(is_present(&json!("0")));
        assert!(is_present(&json!([])));
    }

    #[test]
    fn test_is_bool_literal_set() {
        for ok in [
            json!(true),
            json!(false),
            json!(1),
            json!(0),
            json!("1"),
            json!("0"),
            json!("yes"),
            json!("no"),
        ] {
            assert!(is_bool(&ok), "{ok} should be accepted");
        }
        for bad in [json!("true"), json!("on"), json!("YES"), json!(2), json!(1.0), json!([])] {
            assert!(!is_bool(&bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_email() {
        assert!(is_email(&json!("izi.isaac@gmail.com")));
        assert!(is_email(&json!("user+tag@example.co.uk")));
        assert!(!is_email(&json!("izi.isaac@gmail")));
        assert!(!is_email(&json!("@example.com")));
        assert!(!is_email(&json!("user@")));
        assert!(!is_email(&json!(".user@example.com")));
        assert!(!is_email(&json!("us..er@example.com")));
        assert!(!is_email(&json!(42)));
    }

    #[test]
    fn test_safe_text() {
        assert!(is_safe_text(&json!("Hola, ¿qué tal? ñandú #1")));
        assert!(is_safe_text(&json!("line one\r\nline two")));
        assert!(is_safe_text(&json!("path/to\\file (v2) @home")));
        assert!(!is_safe_text(&json!("<script>")));
        assert!(!is_safe_text(&json!("semi\"quote")));
        assert!(!is_safe_text(&json!("")));
        assert!(!is_safe_text(&json!(["a"])));
    }

    #[test]
    fn test_date_time_patterns() {
        assert!(is_date(&json!("2024-02-29")));
        assert!(!is_date(&json!("2024/02/29")));
        assert!(!is_date(&json!("2024-13-01")));
        assert!(!is_date(&json!("2024-00-10")));
        assert!(!is_date(&json!("2024-01-32")));
        assert!(!is_date(&json!("0999-01-01")));

        assert!(is_time(&json!("23:59:59")));
        assert!(is_time(&json!("7:05:00")));
        assert!(is_time(&json!("45")));
        assert!(!is_time(&json!("24:00:00")));
        assert!(!is_time(&json!("12:60:00")));

        assert!(is_datetime(&json!("2024-05-01 08:30:00")));
        assert!(!is_datetime(&json!("2024-05-01T08:30:00")));
        assert!(!is_datetime(&json!("2024-05-01")));
    }

    #[test]
    fn test_compile_pattern_delimiters() {
        let re = compile_pattern("/^abc$/i").unwrap();
        assert!(re.is_match("ABC"));

        let re = compile_pattern(r"#^\d{3}$#").unwrap();
        assert!(re.is_match("123"));
        assert!(!re.is_match("1234"));

        let re = compile_pattern(r"^[^a]+$").unwrap();
        assert!(re.is_match("bcd"));

        assert!(compile_pattern("/(unclosed/").is_err());
    }

    #[test]
    fn test_lengths() {
        assert_eq!(byte_length(&json!("año")), Some(4));
        assert_eq!(char_length(&json!("año")), Some(3));
        assert_eq!(byte_length(&json!(12345)), Some(5));
        assert_eq!(byte_length(&json!([1, 2])), None);
    }

    #[test]
    fn test_compare_temporal() {
        let fmt = Temporal::Date.default_format();
        assert_eq!(
            compare_temporal(Temporal::Date, &json!("2024-05-02"), &json!("2024-05-01"), fmt),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_temporal(
                Temporal::Date,
                &json!("02/05/2024"),
                &json!("01/05/2024"),
                "%d/%m/%Y"
            ),
            Some(Ordering::Greater)
        );
        assert_eq!(
            compare_temporal(Temporal::Date, &json!("not a date"), &json!("2024-05-01"), fmt),
            None
        );
        assert_eq!(
            compare_temporal(
                Temporal::Datetime,
                &json!("2024-05-01 10:00:00"),
                &json!("2024-05-01 10:00:00"),
                Temporal::Datetime.default_format()
            ),
            Some(Ordering::Equal)
        );
    }
}
