// Record validation
//
// Drives one ValueValidator per rule-set field, resolves `@field` references
// and collects every field's errors in rule-set order.

use crate::check::ValueCheck;
use crate::config::{ConfigError, DateOrdering, Result, ValidatorConfig};
use crate::errors::ValidationErrors;
use crate::formatter::{SharedFormatter, formatter_for};
use crate::rules::{RuleParam, RuleSet};
use crate::upload::{FileValidator, UploadDescriptor};
use crate::value::normalize;
use crate::value_validator::ValueValidator;
use formcheck_i18n::Catalog;
use formcheck_log::{debug, targets};
use serde_json::{Map, Value};

/// Field name to value.
pub type Record = Map<String, Value>;

/// Turn JSON into a record. Objects are used as-is, arrays are keyed by
/// index (`"0"`, `"1"`, ...) and `null` is an empty record.
pub fn record_from_value(value: Value) -> Result<Record> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect()),
        Value::Null => Ok(Record::new()),
        other => Err(ConfigError::InvalidRecord(other.to_string())),
    }
}

/// Builds a [`RecordValidator`].
#[derive(Debug, Clone)]
pub struct RecordValidatorBuilder {
    record: Record,
    rules: RuleSet,
    catalog: Option<Catalog>,
    config: ValidatorConfig,
}

impl RecordValidatorBuilder {
    pub fn new(record: Record, rules: RuleSet) -> Self {
        Self {
            record,
            rules,
            catalog: None,
            config: ValidatorConfig::default(),
        }
    }

    /// Templates for error messages. Without a catalog, messages use the
    /// fallback format.
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Active language for labels and catalog selection.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = Some(language.into());
        self
    }

    pub fn date_ordering(mut self, ordering: DateOrdering) -> Self {
        self.config.date_ordering = ordering;
        self
    }

    /// Replace language and date ordering at once.
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Check every `@field` reference and pick the message formatter.
    pub fn build(self) -> Result<RecordValidator> {
        let record = &self.record;
        self.rules
            .check_references(|key| record.contains_key(key))?;

        let formatter = formatter_for(self.catalog.as_ref(), self.config.language.as_deref());

        Ok(RecordValidator {
            record: self.record,
            rules: self.rules,
            config: self.config,
            formatter,
            errors: ValidationErrors::default(),
        })
    }
}

/// Validates a record against a rule set.
///
/// ```
/// use formcheck_validation::{RecordValidator, RuleSet, record_from_value};
/// use serde_json::json;
///
/// let record = record_from_value(json!({"value": "x", "second": "x"})).unwrap();
/// let rules = RuleSet::from_value(&json!({"second": {"equal": "@value"}})).unwrap();
///
/// let mut validator = RecordValidator::new(record, rules).unwrap();
/// assert!(validator.validate());
/// ```
#[derive(Debug, Clone)]
pub struct RecordValidator {
    record: Record,
    rules: RuleSet,
    config: ValidatorConfig,
    formatter: SharedFormatter,
    errors: ValidationErrors,
}

impl RecordValidator {
    /// Validator with fallback messages and no active language.
    pub fn new(record: Record, rules: RuleSet) -> Result<Self> {
        Self::builder(record, rules).build()
    }

    pub fn builder(record: Record, rules: RuleSet) -> RecordValidatorBuilder {
        RecordValidatorBuilder::new(record, rules)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn language(&self) -> Option<&str> {
        self.config.language.as_deref()
    }

    /// Run every field's checks. Previous results are discarded first.
    ///
    /// For each field, in rule-set order: nullable fields without a value are
    /// skipped; otherwise `isRequired` runs first and, if it fails, nothing
    /// else runs for that field. Rule keys that are not checks are ignored.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        let language = self.config.language.as_deref();

        for (key, field_rules) in self.rules.fields() {
            let raw = self.record.get(key).filter(|value| !value.is_null());

            if field_rules.is_nullable() && raw.is_none() {
                debug!(target: targets::RECORD, "'{}' is nullable and absent, skipping", key);
                continue;
            }

            let value = raw.cloned().unwrap_or_else(|| Value::String(String::new()));
            let mut validator = ValueValidator::new(value, self.rules.label_for(key, language))
                .with_field(key)
                .with_formatter(self.formatter.clone())
                .with_date_ordering(self.config.date_ordering);

            validator.is_required();
            if !validator.validate() {
                debug!(
                    target: targets::RECORD,
                    "'{}' is required and missing, skipping its checks",
                    key
                );
                self.errors.merge(validator.into_errors());
                continue;
            }

            for (name, param) in field_rules.checks() {
                let Some(check) = ValueCheck::from_name(name) else {
                    debug!(
                        target: targets::RECORD,
                        "'{}' on '{}' is not a check, ignoring",
                        name,
                        key
                    );
                    continue;
                };
                let args = resolve_args(&self.record, &self.rules, language, check, param);
                validator.run(check, &args);
            }

            if !validator.validate() {
                self.errors.merge(validator.into_errors());
            }
        }

        debug!(
            target: targets::RECORD,
            "validated {} field(s), {} error(s)",
            self.rules.len(),
            self.errors.len()
        );
        self.errors.is_empty()
    }

    /// Errors from the last [`validate`](Self::validate) run.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Messages in field-then-check order.
    pub fn messages(&self) -> Vec<&str> {
        self.errors.messages()
    }

    /// Messages grouped by field key.
    pub fn errors_by_field(&self) -> Vec<(&str, Vec<&str>)> {
        self.errors.by_field()
    }

    /// Resolved label of a field for the active language.
    pub fn label_for(&self, key: &str) -> String {
        self.rules.label_for(key, self.language())
    }

    /// File validator for an upload descriptor stored under `key`, sharing
    /// this validator's label and message settings.
    pub fn file(&self, key: &str) -> FileValidator {
        let descriptor = self
            .record
            .get(key)
            .map(UploadDescriptor::from_value)
            .unwrap_or_default();
        FileValidator::new(descriptor, self.label_for(key))
            .with_field(key)
            .with_formatter(self.formatter.clone())
    }
}

/// Arguments for one configured check. References expand to the target's
/// value, then its label for relational checks, then any extra arguments.
fn resolve_args(
    record: &Record,
    rules: &RuleSet,
    language: Option<&str>,
    check: ValueCheck,
    param: &RuleParam,
) -> Vec<Value> {
    match param {
        RuleParam::Literal(value) => vec![value.clone()],
        RuleParam::Reference { field, extra } => {
            let value = record
                .get(field)
                .cloned()
                .map(normalize)
                .unwrap_or_else(|| Value::String(String::new()));
            let mut args = Vec::with_capacity(extra.len() + 2);
            args.push(value);
            if check.is_relational() {
                args.push(Value::String(rules.label_for(field, language)));
            }
            args.extend(extra.iter().cloned());
            args
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FieldRules, Label};
    use serde_json::json;

    fn record(value: Value) -> Record {
        record_from_value(value).unwrap()
    }

    #[test]
    fn test_record_from_value() {
        assert_eq!(record(json!(null)).len(), 0);
        let indexed = record(json!(["a", "b"]));
        assert_eq!(indexed.get("1"), Some(&json!("b")));
        assert!(matches!(
            record_from_value(json!("text")),
            Err(ConfigError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_fields_outside_rule_set_are_ignored() {
        let rules = RuleSet::new().field("name", FieldRules::new().check("maxLength", 10));
        let data = record(json!({"name": "ok", "junk": "<>"}));
        let mut v = RecordValidator::new(data, rules).unwrap();
        assert!(v.validate());
    }

    #[test]
    fn test_missing_field_is_required() {
        let rules = RuleSet::new()
            .field("name", FieldRules::new().check("maxLength", 1).check("isInt", true))
            .field("age", FieldRules::new().check("isInt", true));
        let mut v = RecordValidator::new(record(json!({"age": "x"})), rules).unwrap();
        assert!(!v.validate());
        assert_eq!(v.messages(), vec!["name isRequired", "age isInt"]);
    }

    #[test]
    fn test_nullable_skips_absent_and_null() {
        let rules = RuleSet::new().field(
            "nickname",
            FieldRules::new().nullable(true).check("minLength", 3),
        );
        let mut v = RecordValidator::new(record(json!({})), rules.clone()).unwrap();
        assert!(v.validate());

        let mut v = RecordValidator::new(record(json!({"nickname": null})), rules.clone()).unwrap();
        assert!(v.validate());

        let mut v = RecordValidator::new(record(json!({"nickname": "ab"})), rules).unwrap();
        assert!(!v.validate());
        assert_eq!(v.messages(), vec!["nickname, 3 minLength"]);
    }

    #[test]
    fn test_nullable_present_but_empty_is_required() {
        let rules = RuleSet::new().field("nickname", FieldRules::new().nullable(true));
        let mut v = RecordValidator::new(record(json!({"nickname": "  "})), rules).unwrap();
        assert!(!v.validate());
        assert_eq!(v.messages(), vec!["nickname isRequired"]);
    }

    #[test]
    fn test_reference_receives_value_and_label() {
        let rules = RuleSet::new()
            .field("password", FieldRules::new().label("Password"))
            .field(
                "confirm",
                FieldRules::new()
                    .label("Confirmation")
                    .reference("equal", "password"),
            );

        let data = record(json!({"password": "abc", "confirm": "abd"}));
        let mut v = RecordValidator::new(data, rules.clone()).unwrap();
        assert!(!v.validate());
        let error = v.errors().iter().next().unwrap();
        assert_eq!(error.field, "confirm");
        assert_eq!(error.params, vec!["Confirmation".to_string(), "Password".to_string()]);
        assert_eq!(error.message, "Confirmation, Password equal");

        let data = record(json!({"password": "abc", "confirm": "abc"}));
        let mut v = RecordValidator::new(data, rules).unwrap();
        assert!(v.validate());
    }

    #[test]
    fn test_reference_with_extra_format() {
        let rules = RuleSet::from_value(&json!({
            "start": {"label": "Start"},
            "end": {"greaterDate": ["@start", "%d/%m/%Y"]}
        }))
        .unwrap();

        let data = record(json!({"start": "01/05/2024", "end": "02/05/2024"}));
        let mut v = RecordValidator::new(data, rules.clone()).unwrap();
        assert!(v.validate());

        let data = record(json!({"start": "03/05/2024", "end": "02/05/2024"}));
        let mut v = RecordValidator::new(data, rules).unwrap();
        assert!(!v.validate());
        assert_eq!(v.messages(), vec!["end, Start greaterDate"]);
    }

    #[test]
    fn test_unknown_reference_fails_to_build() {
        let rules =
            RuleSet::new().field("confirm", FieldRules::new().reference("equal", "pasword"));
        let err = RecordValidator::new(record(json!({"confirm": "x"})), rules).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownReference { ref target, .. } if target == "pasword"
        ));
    }

    #[test]
    fn test_reference_to_rule_set_field_missing_from_record() {
        let rules = RuleSet::new()
            .field("other", FieldRules::new().nullable(true))
            .field("value", FieldRules::new().reference("notEqual", "other"));
        let mut v = RecordValidator::new(record(json!({"value": "x"})), rules).unwrap();
        assert!(v.validate(), "missing reference resolves to empty string");
    }

    #[test]
    fn test_validate_is_idempotent() {
        let rules = RuleSet::new().field("age", FieldRules::new().check("max", 25));
        let mut v = RecordValidator::new(record(json!({"age": 30})), rules).unwrap();
        assert!(!v.validate());
        assert!(!v.validate());
        assert_eq!(v.errors().len(), 1);
    }

    #[test]
    fn test_localized_labels_and_catalog() {
        let rules = RuleSet::new().field(
            "name",
            FieldRules::new()
                .label(Label::localized([("es", "Nombre"), ("en", "Name")]))
                .check("maxLength", 5),
        );
        let mut v = RecordValidator::builder(record(json!({"name": "izisaurio"})), rules)
            .catalog(Catalog::defaults())
            .language("es")
            .build()
            .unwrap();
        assert!(!v.validate());
        assert_eq!(v.messages(), vec!["Nombre debe tener máximo 5 caracteres"]);
    }

    #[test]
    fn test_errors_by_field() {
        let rules = RuleSet::new()
            .field("name", FieldRules::new().check("isInt", true).check("minLength", 10))
            .field("age", FieldRules::new().check("isInt", true));
        let data = record(json!({"name": "abc", "age": "x"}));
        let mut v = RecordValidator::new(data, rules).unwrap();
        v.validate();
        let grouped = v.errors_by_field();
        assert_eq!(grouped[0].0, "name");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1], ("age", vec!["age isInt"]));
    }

    #[test]
    fn test_file_validator_for_record_field() {
        let rules = RuleSet::new().field(
            "photo",
            FieldRules::new()
                .label("Photo")
                .check("isMimeType", json!(["image/png"])),
        );
        let v = RecordValidator::new(
            record(json!({"photo": {"type": "image/gif", "error": 0, "tmp_name": "/tmp/x"}})),
            rules.clone(),
        )
        .unwrap();
        let mut file = v.file("photo");
        assert!(file.is_uploaded());
        file.is_ok();
        if let Some(field_rules) = rules.get("photo") {
            file.apply_rules(field_rules);
        }
        assert_eq!(file.messages(), vec!["Photo isMimeType"]);
    }
}
