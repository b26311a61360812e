// Validator configuration and configuration errors

use formcheck_i18n::I18nError;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Problems found while building a validator from configuration.
///
/// Check failures are never reported through this type; they end up in
/// [`ValidationErrors`](crate::ValidationErrors).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid rule set: {0}")]
    InvalidRuleSet(String),

    #[error("Invalid rules for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Label of field '{field}' must be a string or a map of language to string")]
    InvalidLabel { field: String },

    #[error("isNullable of field '{field}' must be a boolean")]
    InvalidNullable { field: String },

    #[error("Check '{check}' on field '{field}' references an empty field name")]
    EmptyReference { field: String, check: String },

    #[error("Check '{check}' on field '{field}' references unknown field '{target}'")]
    UnknownReference {
        field: String,
        check: String,
        target: String,
    },

    #[error("Record must be a JSON object or array, got {0}")]
    InvalidRecord(String),

    #[error("Invalid setting {key}={value}")]
    InvalidSetting { key: String, value: String },

    #[error("Failed to load rule set: {0}")]
    LoadError(String),

    #[error("Failed to parse rule set: {0}")]
    ParseError(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] I18nError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How `lessDate`/`lessDatetime` order their operands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateOrdering {
    /// `greater*` fails when value <= other, `less*` fails when value >= other.
    #[default]
    Strict,
    /// `less*` fails when value <= other, exactly like `greater*`.
    Legacy,
}

impl FromStr for DateOrdering {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(DateOrdering::Strict),
            "legacy" => Ok(DateOrdering::Legacy),
            other => Err(ConfigError::InvalidSetting {
                key: "date_ordering".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Settings shared by every validator built for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Active language for labels and catalog selection
    pub language: Option<String>,
    pub date_ordering: DateOrdering,
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_date_ordering(mut self, ordering: DateOrdering) -> Self {
        self.date_ordering = ordering;
        self
    }

    /// Read `FORMCHECK_LANG` and `FORMCHECK_DATE_ORDERING`.
    pub fn from_env() -> Result<Self> {
        Self::from_loader(&EnvLoader::new(Some("FORMCHECK".to_string())))
    }

    /// Read settings through `loader`.
    pub fn from_loader(loader: &EnvLoader) -> Result<Self> {
        let language = loader
            .load_var("LANG")
            .ok()
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty());

        let date_ordering = loader.load_var_or("DATE_ORDERING", "strict").parse()?;

        Ok(Self {
            language,
            date_ordering,
        })
    }
}

/// Environment variable loader with an optional prefix
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    fn key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Load a specific variable (`PREFIX_KEY`)
    pub fn load_var(&self, key: &str) -> std::result::Result<String, env::VarError> {
        env::var(self.key(key))
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // std::env::set_var is unsafe in edition 2024, so these tests only read
    // variables that are expected to be unset.

    #[test]
    fn test_date_ordering_parse() {
        assert_eq!("strict".parse::<DateOrdering>().unwrap(), DateOrdering::Strict);
        assert_eq!(" Legacy ".parse::<DateOrdering>().unwrap(), DateOrdering::Legacy);
        let err = "sloppy".parse::<DateOrdering>().unwrap_err();
        assert!(err.to_string().contains("sloppy"));
    }

    #[test]
    fn test_env_loader_prefix() {
        let loader = EnvLoader::new(Some("FORMCHECK_TEST_NOPE".to_string()));
        assert_eq!(loader.key("lang"), "FORMCHECK_TEST_NOPE_LANG");
        assert!(loader.load_var("MISSING_VAR_67890").is_err());
        assert_eq!(loader.load_var_or("MISSING_VAR_67890", "en"), "en");
    }

    #[test]
    fn test_from_loader_defaults_when_unset() {
        let loader = EnvLoader::new(Some("FORMCHECK_TEST_UNSET_12345".to_string()));
        let config = ValidatorConfig::from_loader(&loader).unwrap();
        assert_eq!(config, ValidatorConfig::default());
    }

    #[test]
    fn test_builder_setters() {
        let config = ValidatorConfig::new()
            .with_language("es")
            .with_date_ordering(DateOrdering::Legacy);
        assert_eq!(config.language.as_deref(), Some("es"));
        assert_eq!(config.date_ordering, DateOrdering::Legacy);
    }
}
