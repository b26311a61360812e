// Rule sets
//
// A rule set maps field names to the checks that apply to them. It can be
// assembled in code or read from JSON/TOML data where each field is an
// object of `checkName: parameter` pairs plus the reserved `label` and
// `isNullable` keys.

use crate::check::{FileCheck, ValueCheck};
use crate::config::{ConfigError, Result};
use formcheck_i18n::lookup_localized;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const LABEL_KEY: &str = "label";
pub const NULLABLE_KEY: &str = "isNullable";
pub const REFERENCE_MARKER: char = '@';

/// Whether `name` is a value or file check. Other keys are ignored.
fn is_check_name(name: &str) -> bool {
    ValueCheck::from_name(name).is_some() || FileCheck::from_name(name).is_some()
}

/// Display name of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Plain(String),
    /// Labels keyed by language tag
    Localized(BTreeMap<String, String>),
}

impl Label {
    pub fn localized<L, S, I>(labels: I) -> Self
    where
        L: Into<String>,
        S: Into<String>,
        I: IntoIterator<Item = (L, S)>,
    {
        Label::Localized(
            labels
                .into_iter()
                .map(|(language, label)| (language.into(), label.into()))
                .collect(),
        )
    }

    /// The label for `language`. Localized labels need a language that
    /// matches, exactly or by its language-only tag.
    pub fn resolve(&self, language: Option<&str>) -> Option<&str> {
        match self {
            Label::Plain(label) => Some(label),
            Label::Localized(labels) => {
                let language = language?;
                lookup_localized(language, |tag| labels.get(tag)).map(String::as_str)
            }
        }
    }

    fn from_value(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(label) => Ok(Label::Plain(label.clone())),
            Value::Object(labels) => {
                let mut resolved = BTreeMap::new();
                for (language, label) in labels {
                    let label = label.as_str().ok_or_else(|| ConfigError::InvalidLabel {
                        field: field.to_string(),
                    })?;
                    resolved.insert(language.clone(), label.to_string());
                }
                Ok(Label::Localized(resolved))
            }
            _ => Err(ConfigError::InvalidLabel {
                field: field.to_string(),
            }),
        }
    }
}

impl From<&str> for Label {
    fn from(label: &str) -> Self {
        Label::Plain(label.to_string())
    }
}

impl From<String> for Label {
    fn from(label: String) -> Self {
        Label::Plain(label)
    }
}

/// Parameter of one configured check.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleParam {
    /// Passed to the check as its single argument
    Literal(Value),
    /// Replaced by the referenced field's value and label, followed by `extra`
    Reference { field: String, extra: Vec<Value> },
}

impl RuleParam {
    /// `"@other"` and `["@other", ...extra]` are references; anything else is
    /// a literal.
    pub fn from_value(value: Value) -> Self {
        if let Some(field) = reference_target(&value) {
            return RuleParam::Reference {
                field: field.to_string(),
                extra: Vec::new(),
            };
        }
        if let Value::Array(items) = &value {
            if let Some(field) = items.first().and_then(reference_target) {
                return RuleParam::Reference {
                    field: field.to_string(),
                    extra: items[1..].to_vec(),
                };
            }
        }
        RuleParam::Literal(value)
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            RuleParam::Literal(value) => Some(value),
            RuleParam::Reference { .. } => None,
        }
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            RuleParam::Reference { field, .. } => Some(field),
            RuleParam::Literal(_) => None,
        }
    }
}

fn reference_target(value: &Value) -> Option<&str> {
    value.as_str()?.strip_prefix(REFERENCE_MARKER)
}

/// Checks configured for one field, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRules {
    label: Option<Label>,
    nullable: bool,
    checks: Vec<(String, RuleParam)>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Skip the field entirely when the record has no value for it.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Add a check. Configuring the same check twice keeps the position of
    /// the first and the parameter of the second. String parameters starting
    /// with `@` become references.
    pub fn check(mut self, name: impl Into<String>, param: impl Into<Value>) -> Self {
        self.set(name.into(), RuleParam::from_value(param.into()));
        self
    }

    /// Add a check whose arguments come from another field.
    pub fn reference(self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.reference_with(name, field, Vec::new())
    }

    /// Like [`reference`](Self::reference), with arguments appended after the
    /// referenced value and label (such as a date format).
    pub fn reference_with(
        mut self,
        name: impl Into<String>,
        field: impl Into<String>,
        extra: Vec<Value>,
    ) -> Self {
        self.set(
            name.into(),
            RuleParam::Reference {
                field: field.into(),
                extra,
            },
        );
        self
    }

    fn set(&mut self, name: String, param: RuleParam) {
        match self.checks.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = param,
            None => self.checks.push((name, param)),
        }
    }

    pub fn get_label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn checks(&self) -> impl Iterator<Item = (&str, &RuleParam)> {
        self.checks.iter().map(|(name, param)| (name.as_str(), param))
    }

    pub fn get(&self, name: &str) -> Option<&RuleParam> {
        self.checks
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, param)| param)
    }

    /// Build from one rule-set entry.
    pub fn from_value(field: &str, value: &Value) -> Result<Self> {
        let entry = value.as_object().ok_or_else(|| ConfigError::InvalidField {
            field: field.to_string(),
            reason: format!("expected an object of checks, got {}", value),
        })?;
        Self::from_map(field, entry)
    }

    fn from_map(field: &str, entry: &Map<String, Value>) -> Result<Self> {
        let mut rules = FieldRules::new();
        for (key, param) in entry {
            match key.as_str() {
                LABEL_KEY => rules.label = Some(Label::from_value(field, param)?),
                NULLABLE_KEY => {
                    rules.nullable = param.as_bool().ok_or_else(|| ConfigError::InvalidNullable {
                        field: field.to_string(),
                    })?;
                }
                _ => {
                    let param = RuleParam::from_value(param.clone());
                    if is_check_name(key) && param.reference() == Some("") {
                        return Err(ConfigError::EmptyReference {
                            field: field.to_string(),
                            check: key.clone(),
                        });
                    }
                    rules.checks.push((key.clone(), param));
                }
            }
        }
        Ok(rules)
    }
}

/// Field rules in evaluation order.
///
/// ```
/// use formcheck_validation::{FieldRules, Label, RuleSet};
///
/// let rules = RuleSet::new()
///     .field("name", FieldRules::new()
///         .label(Label::localized([("es", "Nombre"), ("en", "Name")]))
///         .check("maxLength", 5))
///     .field("confirm", FieldRules::new().reference("equal", "password"));
///
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules.label_for("name", Some("es")), "Nombre");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    fields: Vec<(String, FieldRules)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for a field. Adding a field twice replaces its rules in place.
    pub fn field(mut self, name: impl Into<String>, rules: FieldRules) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = rules,
            None => self.fields.push((name, rules)),
        }
        self
    }

    /// Build from rule-set data: an object of field name to field entry.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            ConfigError::InvalidRuleSet(format!("expected an object of fields, got {}", value))
        })?;
        let mut fields = Vec::with_capacity(object.len());
        for (name, entry) in object {
            fields.push((name.clone(), FieldRules::from_value(name, entry)?));
        }
        Ok(Self { fields })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn get(&self, name: &str) -> Option<&FieldRules> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, rules)| rules)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldRules)> {
        self.fields.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolved label of `key`: its configured label for `language`, or the
    /// key itself.
    pub fn label_for(&self, key: &str, language: Option<&str>) -> String {
        self.get(key)
            .and_then(FieldRules::get_label)
            .and_then(|label| label.resolve(language))
            .unwrap_or(key)
            .to_string()
    }

    /// Every `(field, check, target)` reference made by a known check.
    pub fn references(&self) -> Vec<(&str, &str, &str)> {
        self.fields()
            .flat_map(|(field, rules)| {
                rules
                    .checks()
                    .filter(|(check, _)| is_check_name(check))
                    .filter_map(move |(check, param)| {
                        param.reference().map(|target| (field, check, target))
                    })
            })
            .collect()
    }

    /// Fail on the first reference whose target is neither a rule-set field
    /// nor accepted by `is_record_key`.
    pub fn check_references(&self, is_record_key: impl Fn(&str) -> bool) -> Result<()> {
        for (field, check, target) in self.references() {
            if target.is_empty() {
                return Err(ConfigError::EmptyReference {
                    field: field.to_string(),
                    check: check.to_string(),
                });
            }
            if !self.contains(target) && !is_record_key(target) {
                return Err(ConfigError::UnknownReference {
                    field: field.to_string(),
                    check: check.to_string(),
                    target: target.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_param_forms() {
        assert_eq!(RuleParam::from_value(json!(5)), RuleParam::Literal(json!(5)));
        assert_eq!(
            RuleParam::from_value(json!("@password")),
            RuleParam::Reference {
                field: "password".to_string(),
                extra: vec![]
            }
        );
        assert_eq!(
            RuleParam::from_value(json!(["@start", "%d/%m/%Y"])),
            RuleParam::Reference {
                field: "start".to_string(),
                extra: vec![json!("%d/%m/%Y")]
            }
        );
        assert_eq!(
            RuleParam::from_value(json!(["image/png", "@x"])),
            RuleParam::Literal(json!(["image/png", "@x"]))
        );
    }

    #[test]
    fn test_from_value_preserves_order_and_reserved_keys() {
        let rules = RuleSet::from_value(&json!({
            "name": {"label": "Name", "isSafeText": true, "maxLength": 5},
            "age": {"isNullable": true, "isInt": true, "max": 25}
        }))
        .unwrap();

        let names: Vec<_> = rules.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "age"]);

        let name = rules.get("name").unwrap();
        let checks: Vec<_> = name.checks().map(|(check, _)| check).collect();
        assert_eq!(checks, vec!["isSafeText", "maxLength"]);
        assert_eq!(name.get_label(), Some(&Label::Plain("Name".to_string())));
        assert!(rules.get("age").unwrap().is_nullable());
    }

    #[test]
    fn test_from_value_rejects_bad_config() {
        assert!(matches!(
            RuleSet::from_value(&json!(["name"])),
            Err(ConfigError::InvalidRuleSet(_))
        ));
        assert!(matches!(
            RuleSet::from_value(&json!({"name": true})),
            Err(ConfigError::InvalidField { .. })
        ));
        assert!(matches!(
            RuleSet::from_value(&json!({"name": {"label": 3}})),
            Err(ConfigError::InvalidLabel { .. })
        ));
        assert!(matches!(
            RuleSet::from_value(&json!({"name": {"isNullable": "yes"}})),
            Err(ConfigError::InvalidNullable { .. })
        ));
        assert!(matches!(
            RuleSet::from_value(&json!({"name": {"equal": "@"}})),
            Err(ConfigError::EmptyReference { .. })
        ));
    }

    #[test]
    fn test_label_resolution() {
        let rules = RuleSet::new()
            .field(
                "name",
                FieldRules::new().label(Label::localized([("es", "Nombre"), ("en", "Name")])),
            )
            .field("age", FieldRules::new().label("Age"))
            .field("email", FieldRules::new());

        assert_eq!(rules.label_for("name", Some("es")), "Nombre");
        assert_eq!(rules.label_for("name", Some("es-MX")), "Nombre");
        assert_eq!(rules.label_for("name", Some("fr")), "name");
        assert_eq!(rules.label_for("name", None), "name");
        assert_eq!(rules.label_for("age", Some("es")), "Age");
        assert_eq!(rules.label_for("email", None), "email");
        assert_eq!(rules.label_for("unknown", None), "unknown");
    }

    #[test]
    fn test_builder_replaces_duplicates_in_place() {
        let rules = FieldRules::new()
            .check("min", 1)
            .check("max", 10)
            .check("min", 2);
        let checks: Vec<_> = rules.checks().collect();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0], ("min", &RuleParam::Literal(json!(2))));
    }

    #[test]
    fn test_reference_checking() {
        let rules = RuleSet::new()
            .field("password", FieldRules::new())
            .field("confirm", FieldRules::new().reference("equal", "password"))
            .field("end", FieldRules::new().reference("greater", "start"));

        assert_eq!(rules.references().len(), 2);
        assert!(rules.check_references(|key| key == "start").is_ok());

        match rules.check_references(|_| false) {
            Err(ConfigError::UnknownReference { field, check, target }) => {
                assert_eq!(
                    (field.as_str(), check.as_str(), target.as_str()),
                    ("end", "greater", "start")
                );
            }
            other => panic!("expected unknown reference, got {:?}", other),
        }
    }

    #[test]
    fn test_references_under_other_keys_are_ignored() {
        let rules = RuleSet::from_value(&json!({
            "name": {"comment": "@see-docs", "note": "@", "maxLength": 5}
        }))
        .unwrap();

        assert!(rules.references().is_empty());
        assert!(rules.check_references(|_| false).is_ok());
    }
}
