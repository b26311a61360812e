// Rule-set file loaders

use crate::config::{ConfigError, Result};
use crate::rules::RuleSet;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported rule-set file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Loads rule sets from JSON or TOML.
///
/// TOML is converted to JSON values first, so both formats build the same
/// [`RuleSet`]. Field and check order follow the file.
#[derive(Debug, Clone, Copy)]
pub struct RuleSetLoader {
    format: FileFormat,
}

impl RuleSetLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))?;

        Ok(Self::new(format))
    }

    /// Load a rule set, picking the format from the extension.
    pub fn load(path: impl AsRef<Path>) -> Result<RuleSet> {
        Self::auto(path.as_ref())?.load_file(path)
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<RuleSet> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<RuleSet> {
        RuleSet::from_value(&self.parse_value(content)?)
    }

    /// Parse to the raw JSON value without building the rule set.
    pub fn parse_value(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => parse_json(content),
            FileFormat::Toml => parse_toml(content),
        }
    }
}

fn parse_json(content: &str) -> Result<Value> {
    serde_json::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
}

fn parse_toml(content: &str) -> Result<Value> {
    let toml_value: toml::Value = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    serde_json::to_value(toml_value)
        .map_err(|e| ConfigError::ParseError(format!("TOML to JSON conversion error: {}", e)))
}
