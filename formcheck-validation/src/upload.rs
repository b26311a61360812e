// Uploaded file validation

use crate::check::{ArgumentError, FileCall, FileCheck};
use crate::errors::{ValidationError, ValidationErrors};
use crate::formatter::{FallbackFormatter, SharedFormatter, formatter_for};
use crate::rules::FieldRules;
use formcheck_i18n::Catalog;
use formcheck_log::{debug, targets, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Upload status codes reported by the web server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStatus {
    Ok,
    IniSize,
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
    Unknown(i64),
}

impl UploadStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => UploadStatus::Ok,
            1 => UploadStatus::IniSize,
            2 => UploadStatus::FormSize,
            3 => UploadStatus::Partial,
            4 => UploadStatus::NoFile,
            6 => UploadStatus::NoTmpDir,
            7 => UploadStatus::CantWrite,
            8 => UploadStatus::Extension,
            other => UploadStatus::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            UploadStatus::Ok => 0,
            UploadStatus::IniSize => 1,
            UploadStatus::FormSize => 2,
            UploadStatus::Partial => 3,
            UploadStatus::NoFile => 4,
            UploadStatus::NoTmpDir => 6,
            UploadStatus::CantWrite => 7,
            UploadStatus::Extension => 8,
            UploadStatus::Unknown(code) => code,
        }
    }

    /// Catalog key for a failed `isOk` (`"isOk:4"`).
    pub fn message_key(self) -> String {
        format!("isOk:{}", self.code())
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What the web server hands over for one uploaded file.
///
/// Fields decode leniently: numeric strings are accepted for `error` and
/// `size`, and a field of the wrong type is read as absent without
/// discarding the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub mime_type: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub tmp_name: Option<PathBuf>,

    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<i64>,

    #[serde(default, deserialize_with = "lenient")]
    pub size: Option<u64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromStr,
{
    let raw = Value::deserialize(deserializer)?;
    let decoded = match raw {
        Value::Null => None,
        Value::String(ref text) => serde_json::from_value(raw.clone())
            .ok()
            .or_else(|| text.trim().parse().ok()),
        other => serde_json::from_value(other).ok(),
    };
    Ok(decoded)
}

impl UploadDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a descriptor from a record value. Anything that is not an
    /// object yields an empty descriptor.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            debug!(target: targets::UPLOAD, "not an upload descriptor: {}", err);
            Self::default()
        })
    }

    pub fn with_status(mut self, status: UploadStatus) -> Self {
        self.error = Some(status.code());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_tmp_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.tmp_name = Some(path.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn status(&self) -> Option<UploadStatus> {
        self.error.map(UploadStatus::from_code)
    }
}

/// Failure to move an uploaded file into place.
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("upload has no temporary file")]
    SourceMissing,

    #[error("move rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Commits an uploaded file to its destination.
pub trait UploadMover: Send + Sync + fmt::Debug {
    fn move_file(&self, from: &Path, to: &Path) -> Result<(), MoveError>;
}

/// Moves files on the local filesystem: rename, or copy then remove when
/// the rename crosses devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMover;

impl UploadMover for FsMover {
    fn move_file(&self, from: &Path, to: &Path) -> Result<(), MoveError> {
        if !from.is_file() {
            return Err(MoveError::SourceMissing);
        }
        if fs::rename(from, to).is_ok() {
            return Ok(());
        }
        fs::copy(from, to)?;
        fs::remove_file(from)?;
        Ok(())
    }
}

/// Validates one uploaded file.
///
/// Same contract as [`ValueValidator`](crate::ValueValidator): checks append
/// at most one error each and chain through `&mut Self`.
#[derive(Debug, Clone)]
pub struct FileValidator {
    file: UploadDescriptor,
    label: String,
    field: String,
    formatter: SharedFormatter,
    mover: Arc<dyn UploadMover>,
    errors: ValidationErrors,
}

impl FileValidator {
    pub fn new(file: UploadDescriptor, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            file,
            field: label.clone(),
            label,
            formatter: Arc::new(FallbackFormatter),
            mover: Arc::new(FsMover),
            errors: ValidationErrors::default(),
        }
    }

    pub fn with_catalog(self, catalog: &Catalog, language: Option<&str>) -> Self {
        self.with_formatter(formatter_for(Some(catalog), language))
    }

    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_mover(mut self, mover: Arc<dyn UploadMover>) -> Self {
        self.mover = mover;
        self
    }

    pub fn file(&self) -> &UploadDescriptor {
        &self.file
    }

    /// Names of the checks that can be run by name.
    pub fn callable_checks() -> impl Iterator<Item = &'static str> {
        FileCheck::ALL.iter().map(|check| check.name())
    }

    /// Whether something was submitted at all. Not a check: it never adds
    /// an error.
    pub fn is_uploaded(&self) -> bool {
        matches!(self.file.status(), Some(status) if status != UploadStatus::NoFile)
    }

    /// Fails with `isRequired` when there is no status and with
    /// `isOk:<code>` when the status is not success.
    pub fn is_ok(&mut self) -> &mut Self {
        self.apply(&FileCall::Ok)
    }

    pub fn is_mime_type<S: AsRef<str>>(&mut self, allowed: &[S]) -> &mut Self {
        let allowed = allowed.iter().map(|s| s.as_ref().to_string()).collect();
        self.apply(&FileCall::MimeType(allowed))
    }

    /// Move the temporary file to `destination` through the configured
    /// mover.
    pub fn move_to(&mut self, destination: impl AsRef<Path>) -> &mut Self {
        self.apply(&FileCall::Move(destination.as_ref().to_path_buf()))
    }

    pub fn run(&mut self, check: FileCheck, args: &[Value]) -> &mut Self {
        match FileCall::parse(check, args) {
            Ok(call) => self.apply(&call),
            Err(err) => self.reject(check, &err),
        }
    }

    pub fn run_named(&mut self, name: &str, args: &[Value]) -> bool {
        match FileCheck::from_name(name) {
            Some(check) => {
                self.run(check, args);
                true
            }
            None => false,
        }
    }

    /// Run every file check configured in `rules`, in rule order. Keys that
    /// are not file checks are skipped; `@ref` parameters have no meaning
    /// for files and fail the check.
    pub fn apply_rules(&mut self, rules: &FieldRules) -> &mut Self {
        for (name, param) in rules.checks() {
            let Some(check) = FileCheck::from_name(name) else {
                debug!(target: targets::UPLOAD, "'{}' is not a file check, skipping", name);
                continue;
            };
            match param.as_literal() {
                Some(value) => {
                    self.run(check, std::slice::from_ref(value));
                }
                None => {
                    let err = ArgumentError::Invalid {
                        check: check.name(),
                        reason: "field references are not supported".to_string(),
                    };
                    self.reject(check, &err);
                }
            }
        }
        self
    }

    pub fn apply(&mut self, call: &FileCall) -> &mut Self {
        match call {
            FileCall::Ok => match self.file.status() {
                None => self.fail("isRequired".to_string()),
                Some(UploadStatus::Ok) => {}
                Some(status) => self.fail(status.message_key()),
            },
            FileCall::MimeType(allowed) => {
                let ok = self
                    .file
                    .mime_type
                    .as_deref()
                    .is_some_and(|mime| allowed.iter().any(|a| a == mime));
                if !ok {
                    self.fail(FileCheck::MimeType.name().to_string());
                }
            }
            FileCall::Move(destination) => {
                let result = match self.file.tmp_name.as_deref() {
                    Some(source) => self.mover.move_file(source, destination),
                    None => Err(MoveError::SourceMissing),
                };
                if let Err(err) = result {
                    warn!(
                        target: targets::UPLOAD,
                        "could not move upload '{}' to {}: {}",
                        self.field,
                        destination.display(),
                        err
                    );
                    self.fail(FileCheck::Move.name().to_string());
                }
            }
        }
        self
    }

    fn reject(&mut self, check: FileCheck, err: &ArgumentError) -> &mut Self {
        debug!(target: targets::UPLOAD, "{} on '{}' failed closed: {}", check, self.field, err);
        self.fail(check.name().to_string());
        self
    }

    fn fail(&mut self, key: String) {
        let message = self.formatter.format(&key, &self.label, &[]);
        self.errors.add(
            ValidationError::new(self.field.clone(), message)
                .with_constraint(key)
                .with_params(vec![self.label.clone()]),
        );
    }

    pub fn validate(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.messages()
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}
