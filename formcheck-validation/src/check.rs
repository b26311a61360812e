// Check registry
//
// Rule sets name checks by string. Each validator kind has a closed set of
// checks; a name resolves to a variant, and the configured arguments are
// parsed into a typed call before anything runs.

use crate::value::{as_length, display};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A rule key that names no check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown check '{0}'")]
pub struct UnknownCheck(pub String);

/// Arguments that do not fit a check's signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("{check} expects {expected} argument(s), got {got}")]
    Arity {
        check: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("{check}: {reason}")]
    Invalid { check: &'static str, reason: String },
}

impl ArgumentError {
    fn invalid(check: &'static str, reason: impl Into<String>) -> Self {
        ArgumentError::Invalid {
            check,
            reason: reason.into(),
        }
    }
}

macro_rules! check_registry {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $key:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            /// Every check, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Rule-set name of the check.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            /// Resolve a rule-set name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCheck;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or_else(|| UnknownCheck(s.to_string()))
            }
        }
    };
}

check_registry! {
    /// Checks a [`ValueValidator`](crate::ValueValidator) can run by name.
    pub enum ValueCheck {
        Required => "isRequired",
        Int => "isInt",
        Numeric => "isNumeric",
        Decimal => "isDecimal",
        Bool => "isBool",
        Email => "isEmail",
        Array => "isArray",
        SafeText => "isSafeText",
        Date => "isDate",
        Time => "isTime",
        Datetime => "isDatetime",
        Regex => "regex",
        MinLength => "minLength",
        MaxLength => "maxLength",
        MbMinLength => "mbMinLength",
        MbMaxLength => "mbMaxLength",
        Min => "min",
        Max => "max",
        Greater => "greater",
        Less => "less",
        GreaterDate => "greaterDate",
        LessDate => "lessDate",
        GreaterDatetime => "greaterDatetime",
        LessDatetime => "lessDatetime",
        Equal => "equal",
        NotEqual => "notEqual",
    }
}

check_registry! {
    /// Checks a [`FileValidator`](crate::FileValidator) can run by name.
    ///
    /// `isUploaded` is a query, not a check, and is not listed.
    pub enum FileCheck {
        Ok => "isOk",
        MimeType => "isMimeType",
        Move => "move",
    }
}

impl ValueCheck {
    /// Catalog key used when the check fails.
    pub fn message_key(self) -> &'static str {
        match self {
            ValueCheck::MbMinLength => "minLength",
            ValueCheck::MbMaxLength => "maxLength",
            other => other.name(),
        }
    }

    /// Whether the check compares against another value that carries its
    /// own label. Only these receive a referenced field's label.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            ValueCheck::Greater
                | ValueCheck::Less
                | ValueCheck::GreaterDate
                | ValueCheck::LessDate
                | ValueCheck::GreaterDatetime
                | ValueCheck::LessDatetime
                | ValueCheck::Equal
                | ValueCheck::NotEqual
        )
    }
}

/// The other side of a relational check and how to name it in messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub to: Value,
    pub label: String,
}

/// A relational date/datetime check. `format` is a chrono strftime string.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalRelation {
    pub to: Value,
    pub label: String,
    pub format: Option<String>,
}

/// A value check together with its parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueCall {
    Required,
    Int,
    Numeric,
    Decimal,
    Bool,
    Email,
    Array,
    SafeText,
    Date,
    Time,
    Datetime,
    Regex(String),
    MinLength(usize),
    MaxLength(usize),
    MbMinLength(usize),
    MbMaxLength(usize),
    Min(Value),
    Max(Value),
    Greater(Relation),
    Less(Relation),
    GreaterDate(TemporalRelation),
    LessDate(TemporalRelation),
    GreaterDatetime(TemporalRelation),
    LessDatetime(TemporalRelation),
    Equal(Relation),
    NotEqual(Relation),
}

impl ValueCall {
    /// Parse configured arguments for `check`.
    ///
    /// Flag checks (`isInt: true`) take at most one ignored argument. Length
    /// checks take one non-negative integer, `min`/`max` one scalar, `regex`
    /// one string. Relational checks take the other value, then optionally
    /// its label (and for date checks a format).
    pub fn parse(check: ValueCheck, args: &[Value]) -> Result<Self, ArgumentError> {
        let name = check.name();
        let call = match check {
            ValueCheck::Required => flag(name, args, ValueCall::Required)?,
            ValueCheck::Int => flag(name, args, ValueCall::Int)?,
            ValueCheck::Numeric => flag(name, args, ValueCall::Numeric)?,
            ValueCheck::Decimal => flag(name, args, ValueCall::Decimal)?,
            ValueCheck::Bool => flag(name, args, ValueCall::Bool)?,
            ValueCheck::Email => flag(name, args, ValueCall::Email)?,
            ValueCheck::Array => flag(name, args, ValueCall::Array)?,
            ValueCheck::SafeText => flag(name, args, ValueCall::SafeText)?,
            ValueCheck::Date => flag(name, args, ValueCall::Date)?,
            ValueCheck::Time => flag(name, args, ValueCall::Time)?,
            ValueCheck::Datetime => flag(name, args, ValueCall::Datetime)?,
            ValueCheck::Regex => match single(name, args)? {
                Value::String(pattern) => ValueCall::Regex(pattern.clone()),
                other => {
                    return Err(ArgumentError::invalid(
                        name,
                        format!("pattern must be a string, got {}", other),
                    ));
                }
            },
            ValueCheck::MinLength => ValueCall::MinLength(length(name, args)?),
            ValueCheck::MaxLength => ValueCall::MaxLength(length(name, args)?),
            ValueCheck::MbMinLength => ValueCall::MbMinLength(length(name, args)?),
            ValueCheck::MbMaxLength => ValueCall::MbMaxLength(length(name, args)?),
            ValueCheck::Min => ValueCall::Min(scalar(name, args)?),
            ValueCheck::Max => ValueCall::Max(scalar(name, args)?),
            ValueCheck::Greater => ValueCall::Greater(relation(name, args)?),
            ValueCheck::Less => ValueCall::Less(relation(name, args)?),
            ValueCheck::Equal => ValueCall::Equal(relation(name, args)?),
            ValueCheck::NotEqual => ValueCall::NotEqual(relation(name, args)?),
            ValueCheck::GreaterDate => ValueCall::GreaterDate(temporal(name, args)?),
            ValueCheck::LessDate => ValueCall::LessDate(temporal(name, args)?),
            ValueCheck::GreaterDatetime => ValueCall::GreaterDatetime(temporal(name, args)?),
            ValueCheck::LessDatetime => ValueCall::LessDatetime(temporal(name, args)?),
        };
        Ok(call)
    }

    /// The check this call runs.
    pub fn check(&self) -> ValueCheck {
        match self {
            ValueCall::Required => ValueCheck::Required,
            ValueCall::Int => ValueCheck::Int,
            ValueCall::Numeric => ValueCheck::Numeric,
            ValueCall::Decimal => ValueCheck::Decimal,
            ValueCall::Bool => ValueCheck::Bool,
            ValueCall::Email => ValueCheck::Email,
            ValueCall::Array => ValueCheck::Array,
            ValueCall::SafeText => ValueCheck::SafeText,
            ValueCall::Date => ValueCheck::Date,
            ValueCall::Time => ValueCheck::Time,
            ValueCall::Datetime => ValueCheck::Datetime,
            ValueCall::Regex(_) => ValueCheck::Regex,
            ValueCall::MinLength(_) => ValueCheck::MinLength,
            ValueCall::MaxLength(_) => ValueCheck::MaxLength,
            ValueCall::MbMinLength(_) => ValueCheck::MbMinLength,
            ValueCall::MbMaxLength(_) => ValueCheck::MbMaxLength,
            ValueCall::Min(_) => ValueCheck::Min,
            ValueCall::Max(_) => ValueCheck::Max,
            ValueCall::Greater(_) => ValueCheck::Greater,
            ValueCall::Less(_) => ValueCheck::Less,
            ValueCall::GreaterDate(_) => ValueCheck::GreaterDate,
            ValueCall::LessDate(_) => ValueCheck::LessDate,
            ValueCall::GreaterDatetime(_) => ValueCheck::GreaterDatetime,
            ValueCall::LessDatetime(_) => ValueCheck::LessDatetime,
            ValueCall::Equal(_) => ValueCheck::Equal,
            ValueCall::NotEqual(_) => ValueCheck::NotEqual,
        }
    }
}

fn flag(name: &'static str, args: &[Value], call: ValueCall) -> Result<ValueCall, ArgumentError> {
    if args.len() > 1 {
        return Err(ArgumentError::Arity {
            check: name,
            expected: "0 or 1",
            got: args.len(),
        });
    }
    Ok(call)
}

fn single<'a>(name: &'static str, args: &'a [Value]) -> Result<&'a Value, ArgumentError> {
    match args {
        [only] => Ok(only),
        _ => Err(ArgumentError::Arity {
            check: name,
            expected: "1",
            got: args.len(),
        }),
    }
}

fn length(name: &'static str, args: &[Value]) -> Result<usize, ArgumentError> {
    let raw = single(name, args)?;
    as_length(raw).ok_or_else(|| {
        ArgumentError::invalid(name, format!("length must be a non-negative integer, got {}", raw))
    })
}

fn scalar(name: &'static str, args: &[Value]) -> Result<Value, ArgumentError> {
    match single(name, args)? {
        Value::Array(_) | Value::Object(_) => {
            Err(ArgumentError::invalid(name, "bound must be a scalar"))
        }
        other => Ok(other.clone()),
    }
}

fn relation(name: &'static str, args: &[Value]) -> Result<Relation, ArgumentError> {
    match args {
        [to] => Ok(Relation {
            to: to.clone(),
            label: display(to),
        }),
        [to, label] => Ok(Relation {
            to: to.clone(),
            label: display(label),
        }),
        _ => Err(ArgumentError::Arity {
            check: name,
            expected: "1 or 2",
            got: args.len(),
        }),
    }
}

fn temporal(name: &'static str, args: &[Value]) -> Result<TemporalRelation, ArgumentError> {
    let (to, label, format) = match args {
        [to] => (to, display(to), None),
        [to, label] => (to, display(label), None),
        [to, label, format] => (to, display(label), Some(format)),
        _ => {
            return Err(ArgumentError::Arity {
                check: name,
                expected: "1 to 3",
                got: args.len(),
            });
        }
    };
    let format = match format {
        None | Some(Value::Null) => None,
        Some(Value::String(f)) => Some(f.clone()),
        Some(other) => {
            return Err(ArgumentError::invalid(
                name,
                format!("format must be a string, got {}", other),
            ));
        }
    };
    Ok(TemporalRelation {
        to: to.clone(),
        label,
        format,
    })
}

/// A file check together with its parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum FileCall {
    Ok,
    MimeType(Vec<String>),
    Move(PathBuf),
}

impl FileCall {
    pub fn parse(check: FileCheck, args: &[Value]) -> Result<Self, ArgumentError> {
        let name = check.name();
        match check {
            FileCheck::Ok => {
                if args.len() > 1 {
                    return Err(ArgumentError::Arity {
                        check: name,
                        expected: "0 or 1",
                        got: args.len(),
                    });
                }
                Ok(FileCall::Ok)
            }
            FileCheck::MimeType => match single(name, args)? {
                Value::String(one) => Ok(FileCall::MimeType(vec![one.clone()])),
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            ArgumentError::invalid(name, "mime types must be strings")
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(FileCall::MimeType),
                other => Err(ArgumentError::invalid(
                    name,
                    format!("expected a list of mime types, got {}", other),
                )),
            },
            FileCheck::Move => match single(name, args)? {
                Value::String(path) if !path.trim().is_empty() => {
                    Ok(FileCall::Move(PathBuf::from(path)))
                }
                other => Err(ArgumentError::invalid(
                    name,
                    format!("destination must be a non-empty path, got {}", other),
                )),
            },
        }
    }

    pub fn check(&self) -> FileCheck {
        match self {
            FileCall::Ok => FileCheck::Ok,
            FileCall::MimeType(_) => FileCheck::MimeType,
            FileCall::Move(_) => FileCheck::Move,
        }
    }
}
