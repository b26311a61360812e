// Validation errors

use serde::Serialize;
use std::fmt;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Field key the check ran against (the label for standalone validators)
    pub field: String,

    /// Rendered message, as returned by `messages()`
    pub message: String,

    /// Message key of the failed check (`"maxLength"`, `"isOk:4"`)
    pub constraint: String,

    /// Template arguments: the label followed by the check parameters
    pub params: Vec<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
            params: Vec::new(),
        }
    }

    /// Set the check key
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Set the template arguments
    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Ordered collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Append every error from `other`, keeping its order
    pub fn merge(&mut self, other: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(other);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Rendered messages in evaluation order
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    /// Get errors for a specific field
    pub fn get_field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Messages grouped by field, fields in first-error order
    pub fn by_field(&self) -> Vec<(&str, Vec<&str>)> {
        let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
        for error in &self.errors {
            match grouped.iter_mut().find(|(field, _)| *field == error.field) {
                Some((_, messages)) => messages.push(error.message.as_str()),
                None => grouped.push((error.field.as_str(), vec![error.message.as_str()])),
            }
        }
        grouped
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "field": e.field,
                    "message": e.message,
                    "constraint": e.constraint,
                    "params": e.params,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValidationErrors {
        ValidationErrors::new(vec![
            ValidationError::new("name", "Name too long").with_constraint("maxLength"),
            ValidationError::new("age", "Age too high").with_constraint("max"),
            ValidationError::new("name", "Name unsafe").with_constraint("isSafeText"),
        ])
    }

    #[test]
    fn test_messages_keep_order() {
        assert_eq!(
            sample().messages(),
            vec!["Name too long", "Age too high", "Name unsafe"]
        );
    }

    #[test]
    fn test_by_field_groups_in_first_seen_order() {
        let errors = sample();
        let grouped = errors.by_field();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0], ("name", vec!["Name too long", "Name unsafe"]));
        assert_eq!(grouped[1], ("age", vec!["Age too high"]));
    }

    #[test]
    fn test_field_errors_and_json() {
        let errors = sample();
        assert_eq!(errors.get_field_errors("name").len(), 2);
        assert!(errors.get_field_errors("email").is_empty());

        let json = errors.to_json();
        assert_eq!(json["errors"][1]["constraint"], "max");
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_display_is_the_message() {
        let error = ValidationError::new("email", "Email must be valid");
        assert_eq!(error.to_string(), "Email must be valid");
        assert_eq!(error.constraint, "custom");
    }
}
