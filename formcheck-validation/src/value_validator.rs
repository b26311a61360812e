// Single-value validator

use crate::check::{ArgumentError, Relation, TemporalRelation, ValueCall, ValueCheck};
use crate::checks::{self, Temporal};
use crate::config::DateOrdering;
use crate::errors::{ValidationError, ValidationErrors};
use crate::formatter::{FallbackFormatter, SharedFormatter, formatter_for};
use crate::value::{compare, display, loosely_equal, normalize};
use formcheck_i18n::Catalog;
use formcheck_log::{debug, targets};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// Validates one value against a chain of checks.
///
/// Each check appends at most one error; nothing ever removes one. Checks
/// return `&mut Self` so they can be chained, and [`validate`](Self::validate)
/// can be called at any point to test what has accumulated so far.
///
/// ```
/// use formcheck_validation::ValueValidator;
///
/// let mut name = ValueValidator::new("izisaurio", "Name");
/// name.is_required().is_safe_text().max_length(5);
///
/// assert!(!name.validate());
/// assert_eq!(name.messages(), vec!["Name, 5 maxLength"]);
/// ```
#[derive(Debug, Clone)]
pub struct ValueValidator {
    value: Value,
    label: String,
    field: String,
    formatter: SharedFormatter,
    date_ordering: DateOrdering,
    errors: ValidationErrors,
}

impl ValueValidator {
    /// Create a validator. Strings are trimmed; `null` is treated as the
    /// empty string.
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: normalize(value.into()),
            field: label.clone(),
            label,
            formatter: Arc::new(FallbackFormatter),
            date_ordering: DateOrdering::default(),
            errors: ValidationErrors::default(),
        }
    }

    /// Render messages from `catalog`, selecting the bundle for `language`.
    pub fn with_catalog(self, catalog: &Catalog, language: Option<&str>) -> Self {
        self.with_formatter(formatter_for(Some(catalog), language))
    }

    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Field key recorded on errors. Defaults to the label.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_date_ordering(mut self, ordering: DateOrdering) -> Self {
        self.date_ordering = ordering;
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Names of the checks that can be run by name.
    pub fn callable_checks() -> impl Iterator<Item = &'static str> {
        ValueCheck::ALL.iter().map(|check| check.name())
    }

    pub fn is_required(&mut self) -> &mut Self {
        self.apply(&ValueCall::Required)
    }

    pub fn is_int(&mut self) -> &mut Self {
        self.apply(&ValueCall::Int)
    }

    pub fn is_numeric(&mut self) -> &mut Self {
        self.apply(&ValueCall::Numeric)
    }

    pub fn is_decimal(&mut self) -> &mut Self {
        self.apply(&ValueCall::Decimal)
    }

    pub fn is_bool(&mut self) -> &mut Self {
        self.apply(&ValueCall::Bool)
    }

    pub fn is_email(&mut self) -> &mut Self {
        self.apply(&ValueCall::Email)
    }

    pub fn is_array(&mut self) -> &mut Self {
        self.apply(&ValueCall::Array)
    }

    pub fn is_safe_text(&mut self) -> &mut Self {
        self.apply(&ValueCall::SafeText)
    }

    pub fn is_date(&mut self) -> &mut Self {
        self.apply(&ValueCall::Date)
    }

    pub fn is_time(&mut self) -> &mut Self {
        self.apply(&ValueCall::Time)
    }

    pub fn is_datetime(&mut self) -> &mut Self {
        self.apply(&ValueCall::Datetime)
    }

    /// Match against `pattern`, bare (`^\d+$`) or delimited (`/^a+$/i`).
    /// A pattern that does not compile fails the check.
    pub fn regex(&mut self, pattern: &str) -> &mut Self {
        self.apply(&ValueCall::Regex(pattern.to_string()))
    }

    /// At least `length` bytes.
    pub fn min_length(&mut self, length: usize) -> &mut Self {
        self.apply(&ValueCall::MinLength(length))
    }

    /// At most `length` bytes.
    pub fn max_length(&mut self, length: usize) -> &mut Self {
        self.apply(&ValueCall::MaxLength(length))
    }

    /// At least `length` characters.
    pub fn mb_min_length(&mut self, length: usize) -> &mut Self {
        self.apply(&ValueCall::MbMinLength(length))
    }

    /// At most `length` characters.
    pub fn mb_max_length(&mut self, length: usize) -> &mut Self {
        self.apply(&ValueCall::MbMaxLength(length))
    }

    pub fn min(&mut self, bound: impl Into<Value>) -> &mut Self {
        self.apply(&ValueCall::Min(bound.into()))
    }

    pub fn max(&mut self, bound: impl Into<Value>) -> &mut Self {
        self.apply(&ValueCall::Max(bound.into()))
    }

    /// Fails when the value is less than `to`.
    pub fn greater(&mut self, to: impl Into<Value>, to_label: impl Into<String>) -> &mut Self {
        self.apply(&ValueCall::Greater(relation(to, to_label)))
    }

    /// Fails when the value is greater than `to`.
    pub fn less(&mut self, to: impl Into<Value>, to_label: impl Into<String>) -> &mut Self {
        self.apply(&ValueCall::Less(relation(to, to_label)))
    }

    pub fn equal(&mut self, to: impl Into<Value>, to_label: impl Into<String>) -> &mut Self {
        self.apply(&ValueCall::Equal(relation(to, to_label)))
    }

    pub fn not_equal(&mut self, to: impl Into<Value>, to_label: impl Into<String>) -> &mut Self {
        self.apply(&ValueCall::NotEqual(relation(to, to_label)))
    }

    /// Both sides parsed with `format` (default `%Y-%m-%d`); the value must
    /// be strictly later.
    pub fn greater_date(
        &mut self,
        to: impl Into<Value>,
        to_label: impl Into<String>,
        format: Option<&str>,
    ) -> &mut Self {
        self.apply(&ValueCall::GreaterDate(temporal(to, to_label, format)))
    }

    pub fn less_date(
        &mut self,
        to: impl Into<Value>,
        to_label: impl Into<String>,
        format: Option<&str>,
    ) -> &mut Self {
        self.apply(&ValueCall::LessDate(temporal(to, to_label, format)))
    }

    pub fn greater_datetime(
        &mut self,
        to: impl Into<Value>,
        to_label: impl Into<String>,
        format: Option<&str>,
    ) -> &mut Self {
        self.apply(&ValueCall::GreaterDatetime(temporal(to, to_label, format)))
    }

    pub fn less_datetime(
        &mut self,
        to: impl Into<Value>,
        to_label: impl Into<String>,
        format: Option<&str>,
    ) -> &mut Self {
        self.apply(&ValueCall::LessDatetime(temporal(to, to_label, format)))
    }

    /// Run `check` with configured arguments. Arguments that do not fit the
    /// check fail it.
    pub fn run(&mut self, check: ValueCheck, args: &[Value]) -> &mut Self {
        match ValueCall::parse(check, args) {
            Ok(call) => self.apply(&call),
            Err(err) => self.reject(check, &err),
        }
    }

    /// Run a check by rule-set name. Returns `false` when the name is not a
    /// check, in which case nothing runs.
    pub fn run_named(&mut self, name: &str, args: &[Value]) -> bool {
        match ValueCheck::from_name(name) {
            Some(check) => {
                self.run(check, args);
                true
            }
            None => false,
        }
    }

    /// Run a parsed call.
    pub fn apply(&mut self, call: &ValueCall) -> &mut Self {
        let check = call.check();
        let value = &self.value;
        let failure: Option<Vec<String>> = match call {
            ValueCall::Required => (!checks::is_present(value)).then(Vec::new),
            ValueCall::Int => (!checks::is_int(value)).then(Vec::new),
            ValueCall::Numeric | ValueCall::Decimal => (!checks::is_numeric(value)).then(Vec::new),
            ValueCall::Bool => (!checks::is_bool(value)).then(Vec::new),
            ValueCall::Email => (!checks::is_email(value)).then(Vec::new),
            ValueCall::Array => (!checks::is_array(value)).then(Vec::new),
            ValueCall::SafeText => (!checks::is_safe_text(value)).then(Vec::new),
            ValueCall::Date => (!checks::is_date(value)).then(Vec::new),
            ValueCall::Time => (!checks::is_time(value)).then(Vec::new),
            ValueCall::Datetime => (!checks::is_datetime(value)).then(Vec::new),
            ValueCall::Regex(pattern) => {
                let matched = match checks::compile_pattern(pattern) {
                    Ok(regex) => checks::matches_pattern(value, &regex),
                    Err(err) => {
                        debug!(
                            target: targets::VALUE,
                            "pattern {:?} does not compile: {}",
                            pattern,
                            err
                        );
                        false
                    }
                };
                (!matched).then(Vec::new)
            }
            ValueCall::MinLength(n) => {
                let ok = checks::byte_length(value).is_some_and(|len| len >= *n);
                (!ok).then(|| vec![n.to_string()])
            }
            ValueCall::MaxLength(n) => {
                let ok = checks::byte_length(value).is_some_and(|len| len <= *n);
                (!ok).then(|| vec![n.to_string()])
            }
            ValueCall::MbMinLength(n) => {
                let ok = checks::char_length(value).is_some_and(|len| len >= *n);
                (!ok).then(|| vec![n.to_string()])
            }
            ValueCall::MbMaxLength(n) => {
                let ok = checks::char_length(value).is_some_and(|len| len <= *n);
                (!ok).then(|| vec![n.to_string()])
            }
            ValueCall::Min(bound) => {
                let ok = matches!(compare(value, bound), Some(Ordering::Greater | Ordering::Equal));
                (!ok).then(|| vec![display(bound)])
            }
            ValueCall::Max(bound) => {
                let ok = matches!(compare(value, bound), Some(Ordering::Less | Ordering::Equal));
                (!ok).then(|| vec![display(bound)])
            }
            ValueCall::Greater(rel) => {
                let ok = matches!(
                    compare(value, &rel.to),
                    Some(Ordering::Greater | Ordering::Equal)
                );
                (!ok).then(|| vec![rel.label.clone()])
            }
            ValueCall::Less(rel) => {
                let ok = matches!(compare(value, &rel.to), Some(Ordering::Less | Ordering::Equal));
                (!ok).then(|| vec![rel.label.clone()])
            }
            ValueCall::Equal(rel) => {
                (!loosely_equal(value, &rel.to)).then(|| vec![rel.label.clone()])
            }
            ValueCall::NotEqual(rel) => {
                loosely_equal(value, &rel.to).then(|| vec![rel.label.clone()])
            }
            ValueCall::GreaterDate(rel) => self.temporal_failure(Temporal::Date, rel, true),
            ValueCall::LessDate(rel) => self.temporal_failure(Temporal::Date, rel, false),
            ValueCall::GreaterDatetime(rel) => self.temporal_failure(Temporal::Datetime, rel, true),
            ValueCall::LessDatetime(rel) => self.temporal_failure(Temporal::Datetime, rel, false),
        };

        if let Some(params) = failure {
            self.fail(check, params);
        }
        self
    }

    fn temporal_failure(
        &self,
        kind: Temporal,
        rel: &TemporalRelation,
        later: bool,
    ) -> Option<Vec<String>> {
        let format = rel.format.as_deref().unwrap_or(kind.default_format());
        let ordering = checks::compare_temporal(kind, &self.value, &rel.to, format);
        let wanted = match (later, self.date_ordering) {
            (true, _) | (false, DateOrdering::Legacy) => Ordering::Greater,
            (false, DateOrdering::Strict) => Ordering::Less,
        };
        (ordering != Some(wanted)).then(|| vec![rel.label.clone()])
    }

    fn reject(&mut self, check: ValueCheck, err: &ArgumentError) -> &mut Self {
        debug!(target: targets::VALUE, "{} on '{}' failed closed: {}", check, self.field, err);
        self.fail(check, Vec::new());
        self
    }

    fn fail(&mut self, check: ValueCheck, params: Vec<String>) {
        let key = check.message_key();
        let message = self.formatter.format(key, &self.label, &params);
        let mut all = Vec::with_capacity(params.len() + 1);
        all.push(self.label.clone());
        all.extend(params);
        self.errors.add(
            ValidationError::new(self.field.clone(), message)
                .with_constraint(key)
                .with_params(all),
        );
    }

    /// True when no check has failed so far.
    pub fn validate(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Error messages in the order the checks ran.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.messages()
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

fn relation(to: impl Into<Value>, to_label: impl Into<String>) -> Relation {
    Relation {
        to: to.into(),
        label: to_label.into(),
    }
}

fn temporal(
    to: impl Into<Value>,
    to_label: impl Into<String>,
    format: Option<&str>,
) -> TemporalRelation {
    TemporalRelation {
        to: to.into(),
        label: to_label.into(),
        format: format.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_i18n::MessageBundle;
    use serde_json::json;

    #[test]
    fn test_value_is_trimmed() {
        let v = ValueValidator::new("  hello  ", "greeting");
        assert_eq!(v.value(), &json!("hello"));
        let v = ValueValidator::new(json!([" a "]), "list");
        assert_eq!(v.value(), &json!([" a "]));
    }

    #[test]
    fn test_required() {
        let mut v = ValueValidator::new("   ", "name");
        v.is_required();
        assert!(!v.validate());
        assert_eq!(v.messages(), vec!["name isRequired"]);

        let mut v = ValueValidator::new(0, "count");
        v.is_required();
        assert!(v.validate());

        let mut v = ValueValidator::new(json!([]), "tags");
        v.is_required();
        assert!(v.validate());

        let mut v = ValueValidator::new(false, "agree");
        v.is_required();
        assert!(!v.validate());
    }

    #[test]
    fn test_chain_order_is_message_order() {
        let mut v = ValueValidator::new("<b>toolong</b>", "name");
        v.is_safe_text().max_length(5).is_int();
        assert_eq!(
            v.messages(),
            vec!["name isSafeText", "name, 5 maxLength", "name isInt"]
        );
        assert!(!v.validate());
    }

    #[test]
    fn test_type_checks() {
        let mut v = ValueValidator::new("12", "n");
        v.is_int().is_numeric().is_decimal();
        assert!(v.validate());

        let mut v = ValueValidator::new("1.5", "n");
        v.is_int();
        assert_eq!(v.messages(), vec!["n isInt"]);

        let mut v = ValueValidator::new("abc", "n");
        v.is_numeric().is_decimal();
        assert_eq!(v.messages(), vec!["n isNumeric", "n isDecimal"]);

        let mut v = ValueValidator::new(json!(["a", "b"]), "tags");
        v.is_array();
        assert!(v.validate());
        let mut v = ValueValidator::new("a,b", "tags");
        v.is_array();
        assert!(!v.validate());
    }

    #[test]
    fn test_lengths_bytes_vs_chars() {
        let mut v = ValueValidator::new("ñandú", "word");
        v.max_length(5);
        assert!(!v.validate(), "7 bytes exceeds 5");

        let mut v = ValueValidator::new("ñandú", "word");
        v.mb_max_length(5).mb_min_length(5);
        assert!(v.validate());

        let mut v = ValueValidator::new("ab", "word");
        v.mb_min_length(3);
        assert_eq!(v.errors().iter().next().map(|e| e.constraint.as_str()), Some("minLength"));
        assert_eq!(v.messages(), vec!["word, 3 minLength"]);

        let mut v = ValueValidator::new(json!(["abc"]), "word");
        v.max_length(10);
        assert!(!v.validate(), "arrays have no length");
    }

    #[test]
    fn test_min_max() {
        let mut v = ValueValidator::new(30, "age");
        v.min(18).max(25);
        assert_eq!(v.messages(), vec!["age, 25 max"]);

        let mut v = ValueValidator::new("30", "age");
        v.max(30).min("30");
        assert!(v.validate());

        let mut v = ValueValidator::new(json!(["x"]), "age");
        v.min(1);
        assert!(!v.validate(), "incomparable values fail closed");
    }

    #[test]
    fn test_greater_less_allow_equality() {
        let mut v = ValueValidator::new(10, "end");
        v.greater(10, "start").less(10, "limit");
        assert!(v.validate());

        let mut v = ValueValidator::new(5, "end");
        v.greater(10, "start");
        assert_eq!(v.messages(), vec!["end, start greater"]);

        let mut v = ValueValidator::new(15, "end");
        v.less(10, "limit");
        assert_eq!(v.messages(), vec!["end, limit less"]);
    }

    #[test]
    fn test_equal_not_equal() {
        let mut v = ValueValidator::new("abc", "confirm");
        v.equal("abc", "password").not_equal("xyz", "old password");
        assert!(v.validate());

        let mut v = ValueValidator::new("5", "n");
        v.equal(5, "five");
        assert!(v.validate());

        let mut v = ValueValidator::new("abc", "confirm");
        v.equal("abd", "password");
        assert_eq!(v.messages(), vec!["confirm, password equal"]);
    }

    #[test]
    fn test_dates_strict() {
        let mut v = ValueValidator::new("2024-05-02", "end");
        v.greater_date("2024-05-01", "start", None);
        assert!(v.validate());

        let mut v = ValueValidator::new("2024-05-01", "end");
        v.greater_date("2024-05-01", "start", None);
        assert!(!v.validate(), "equal dates fail");

        let mut v = ValueValidator::new("2024-05-01", "start");
        v.less_date("2024-05-02", "end", None);
        assert!(v.validate());

        let mut v = ValueValidator::new("2024-05-02", "start");
        v.less_date("2024-05-02", "end", None);
        assert_eq!(v.messages(), vec!["start, end lessDate"]);

        let mut v = ValueValidator::new("2024-05-01 10:00:00", "start");
        v.less_datetime("2024-05-01 10:00:01", "end", None)
            .greater_datetime("2024-05-01 09:59:59", "opening", None);
        assert!(v.validate());
    }

    #[test]
    fn test_dates_legacy_ordering() {
        let mut v =
            ValueValidator::new("2024-05-01", "start").with_date_ordering(DateOrdering::Legacy);
        v.less_date("2024-05-02", "end", None);
        assert!(!v.validate(), "legacy less fails when value <= other");

        let mut v =
            ValueValidator::new("2024-05-03", "start").with_date_ordering(DateOrdering::Legacy);
        v.less_date("2024-05-02", "end", None);
        assert!(v.validate());
    }

    #[test]
    fn test_dates_custom_format_and_garbage() {
        let mut v = ValueValidator::new("02/05/2024", "end");
        v.greater_date("01/05/2024", "start", Some("%d/%m/%Y"));
        assert!(v.validate());

        let mut v = ValueValidator::new("yesterday", "end");
        v.greater_date("2024-05-01", "start", None);
        assert!(!v.validate());
    }

    #[test]
    fn test_regex() {
        let mut v = ValueValidator::new("ABC", "code");
        v.regex("/^[a-z]+$/i").regex(r"^\w{3}$");
        assert!(v.validate());

        let mut v = ValueValidator::new("abc", "code");
        v.regex("[unclosed");
        assert_eq!(v.messages(), vec!["code regex"]);
    }

    #[test]
    fn test_run_by_name_fails_closed_on_bad_arguments() {
        let mut v = ValueValidator::new("hello", "greeting");
        assert!(v.run_named("maxLength", &[json!(10)]));
        assert!(v.validate());

        assert!(v.run_named("maxLength", &[json!("ten")]));
        assert_eq!(v.messages(), vec!["greeting maxLength"]);

        assert!(!v.run_named("label", &[json!("x")]));
        assert_eq!(v.errors().len(), 1);
    }

    #[test]
    fn test_catalog_messages() {
        let catalog = Catalog::from(
            MessageBundle::new()
                .with("maxLength", "%s admite máximo %s caracteres")
                .with("isRequired", "%s es obligatorio"),
        );
        let mut v = ValueValidator::new("izisaurio", "Nombre").with_catalog(&catalog, None);
        v.is_required().max_length(5).is_int();
        assert_eq!(
            v.messages(),
            vec!["Nombre admite máximo 5 caracteres", "Nombre isInt"]
        );
        let first = v.errors().iter().next().unwrap();
        assert_eq!(first.params, vec!["Nombre".to_string(), "5".to_string()]);
    }

    #[test]
    fn test_callable_checks_lists_registry() {
        let names: Vec<_> = ValueValidator::callable_checks().collect();
        assert!(names.contains(&"isRequired"));
        assert!(names.contains(&"mbMaxLength"));
        assert!(!names.contains(&"validate"));
        assert!(!names.contains(&"label"));
    }
}
