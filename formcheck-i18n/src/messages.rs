//! Message catalogs
//!
//! A [`MessageBundle`] maps a check key (`"maxLength"`, `"isOk:4"`) to a
//! template for one language. A [`Catalog`] is what callers hand to the
//! validators: either a single bundle, or bundles keyed by language from
//! which one is selected once per validation run.

use crate::format::{format_template, placeholder_count};
use crate::locale::lookup_localized;
use crate::{I18nError, Result};
use formcheck_log::{debug, targets};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Templates for a single language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBundle {
    messages: HashMap<String, String>,
}

impl MessageBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of `key -> template` strings.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Build from an already parsed JSON object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            I18nError::InvalidCatalog("message bundle must be a JSON object".to_string())
        })?;

        let mut bundle = Self::new();
        for (key, template) in object {
            match template {
                Value::String(s) => bundle.add(key.clone(), s.clone()),
                other => {
                    return Err(I18nError::InvalidCatalog(format!(
                        "template for '{}' must be a string, got {}",
                        key, other
                    )));
                }
            }
        }
        Ok(bundle)
    }

    /// Add or replace a template.
    pub fn add(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.add(key, template);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Format the template for `key`, or `None` when the bundle has no entry.
    pub fn format<S: AsRef<str>>(&self, key: &str, args: &[S]) -> Option<String> {
        let template = self.get(key)?;
        let wanted = placeholder_count(template);
        if wanted > args.len() {
            debug!(
                target: targets::CATALOG,
                "template '{}' expects {} arguments, got {}",
                key,
                wanted,
                args.len()
            );
        }
        Some(format_template(template, args))
    }

    /// Overlay `other` on top of this bundle, replacing matching keys.
    pub fn merge(&mut self, other: MessageBundle) {
        self.messages.extend(other.messages);
    }
}

impl<K, V> FromIterator<(K, V)> for MessageBundle
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            messages: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Templates supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Catalog {
    /// One bundle used regardless of the active language.
    Flat(MessageBundle),
    /// Bundles keyed by language tag.
    Localized(BTreeMap<String, MessageBundle>),
}

impl Catalog {
    /// Parse catalog JSON.
    ///
    /// An object whose values are all strings is a flat catalog; an object
    /// whose values are all objects is keyed by language.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            I18nError::InvalidCatalog("catalog must be a JSON object".to_string())
        })?;

        if object.values().all(Value::is_string) {
            return MessageBundle::from_value(value).map(Catalog::Flat);
        }

        if object.values().all(Value::is_object) {
            let mut languages = BTreeMap::new();
            for (language, bundle) in object {
                languages.insert(language.clone(), MessageBundle::from_value(bundle)?);
            }
            return Ok(Catalog::Localized(languages));
        }

        Err(I18nError::InvalidCatalog(
            "catalog mixes templates and language tables".to_string(),
        ))
    }

    /// Build a language-keyed catalog.
    pub fn localized<L, I>(languages: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, MessageBundle)>,
    {
        Catalog::Localized(
            languages
                .into_iter()
                .map(|(language, bundle)| (language.into(), bundle))
                .collect(),
        )
    }

    /// Pick the bundle to use for a run.
    ///
    /// Flat catalogs are returned as-is. Localized catalogs need a language
    /// and resolve it with the locale fallback chain.
    pub fn select(&self, language: Option<&str>) -> Option<&MessageBundle> {
        match self {
            Catalog::Flat(bundle) => Some(bundle),
            Catalog::Localized(languages) => {
                let language = language?;
                lookup_localized(language, |tag| languages.get(tag))
            }
        }
    }

    /// Languages available in a localized catalog.
    pub fn languages(&self) -> Vec<&str> {
        match self {
            Catalog::Flat(_) => Vec::new(),
            Catalog::Localized(languages) => languages.keys().map(String::as_str).collect(),
        }
    }
}

impl From<MessageBundle> for Catalog {
    fn from(bundle: MessageBundle) -> Self {
        Catalog::Flat(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_format() {
        let bundle = MessageBundle::new().with("maxLength", "%s admite máximo %s caracteres");
        assert_eq!(
            bundle.format("maxLength", &["Nombre", "5"]).as_deref(),
            Some("Nombre admite máximo 5 caracteres")
        );
        assert_eq!(bundle.format("minLength", &["Nombre"]), None);
    }

    #[test]
    fn test_bundle_from_json_rejects_non_strings() {
        assert!(MessageBundle::from_json(r#"{"isInt": "%s"}"#).is_ok());
        assert!(MessageBundle::from_json(r#"{"isInt": 3}"#).is_err());
        assert!(MessageBundle::from_json(r#"["isInt"]"#).is_err());
    }

    #[test]
    fn test_catalog_shape_detection() {
        let flat = Catalog::from_json(r#"{"isRequired": "%s is required"}"#).unwrap();
        assert!(matches!(flat, Catalog::Flat(_)));

        let localized = Catalog::from_json(
            r#"{"en": {"isRequired": "%s is required"}, "es": {"isRequired": "%s es obligatorio"}}"#,
        )
        .unwrap();
        assert_eq!(localized.languages(), vec!["en", "es"]);

        assert!(Catalog::from_json(r#"{"en": {}, "isRequired": "x"}"#).is_err());
    }

    #[test]
    fn test_select_language() {
        let catalog = Catalog::localized([
            ("en", MessageBundle::new().with("isRequired", "%s is required")),
            ("es", MessageBundle::new().with("isRequired", "%s es obligatorio")),
        ]);

        let es = catalog.select(Some("es-MX")).unwrap();
        assert_eq!(es.get("isRequired"), Some("%s es obligatorio"));
        assert!(catalog.select(Some("fr")).is_none());
        assert!(catalog.select(None).is_none());
    }

    #[test]
    fn test_flat_catalog_ignores_language() {
        let catalog = Catalog::from(MessageBundle::new().with("isInt", "%s: integer"));
        assert!(catalog.select(Some("de")).is_some());
        assert!(catalog.select(None).is_some());
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = MessageBundle::new().with("isInt", "a").with("isBool", "b");
        base.merge(MessageBundle::new().with("isInt", "c"));
        assert_eq!(base.get("isInt"), Some("c"));
        assert_eq!(base.get("isBool"), Some("b"));
        assert_eq!(base.len(), 2);
    }
}
