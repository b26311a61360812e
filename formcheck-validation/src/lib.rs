//! Rule-driven validation for formcheck
//!
//! Validates loosely-typed input (form fields, API payloads, uploaded files)
//! against declarative rule sets and reports localized, field-labeled
//! messages.
//!
//! # Examples
//!
//! ## Validating a record
//!
//! ```
//! use formcheck_validation::{RecordValidator, RuleSet, record_from_value};
//! use serde_json::json;
//!
//! let record = record_from_value(json!({
//!     "name": "izisaurio",
//!     "age": 30,
//!     "email": "izi.isaac@gmail"
//! })).unwrap();
//!
//! let rules = RuleSet::from_value(&json!({
//!     "name": {"isSafeText": true, "maxLength": 5},
//!     "age": {"isInt": true, "max": 25},
//!     "email": {"isEmail": true}
//! })).unwrap();
//!
//! let mut validator = RecordValidator::new(record, rules).unwrap();
//! assert!(!validator.validate());
//! assert_eq!(
//!     validator.messages(),
//!     vec!["name, 5 maxLength", "age, 25 max", "email isEmail"]
//! );
//! ```
//!
//! ## Localized messages
//!
//! ```
//! use formcheck_validation::{
//!     Catalog, FieldRules, Label, RecordValidator, RuleSet, record_from_value,
//! };
//! use serde_json::json;
//!
//! let rules = RuleSet::new().field(
//!     "name",
//!     FieldRules::new()
//!         .label(Label::localized([("es", "Nombre"), ("en", "Name")]))
//!         .check("maxLength", 5),
//! );
//!
//! let record = record_from_value(json!({"name": "izisaurio"})).unwrap();
//! let mut validator = RecordValidator::builder(record, rules)
//!     .catalog(Catalog::defaults())
//!     .language("es")
//!     .build()
//!     .unwrap();
//!
//! assert!(!validator.validate());
//! assert_eq!(validator.messages(), vec!["Nombre debe tener máximo 5 caracteres"]);
//! ```
//!
//! ## Chaining checks on one value
//!
//! ```
//! use formcheck_validation::ValueValidator;
//!
//! let mut age = ValueValidator::new(30, "Age");
//! age.is_required().is_int().min(18).max(25);
//! assert_eq!(age.messages(), vec!["Age, 25 max"]);
//! ```

mod check;
mod checks;
mod config;
mod errors;
mod formatter;
mod loader;
mod record;
mod rules;
mod upload;
mod value;
mod value_validator;

pub use check::{
    ArgumentError, FileCall, FileCheck, Relation, TemporalRelation, UnknownCheck, ValueCall,
    ValueCheck,
};
pub use checks::{DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT};
pub use config::{ConfigError, DateOrdering, EnvLoader, Result, ValidatorConfig};
pub use errors::{ValidationError, ValidationErrors};
pub use formatter::{
    CatalogFormatter, FallbackFormatter, MessageFormatter, SharedFormatter, formatter_for,
};
pub use loader::{FileFormat, RuleSetLoader};
pub use record::{Record, RecordValidator, RecordValidatorBuilder, record_from_value};
pub use rules::{FieldRules, Label, RuleParam, RuleSet};
pub use upload::{
    FileValidator, FsMover, MoveError, UploadDescriptor, UploadMover, UploadStatus,
};
pub use value_validator::ValueValidator;

pub use formcheck_i18n::{Catalog, MessageBundle};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Catalog, ConfigError, FieldRules, FileValidator, Label, MessageBundle, RecordValidator,
        RuleSet, RuleSetLoader, UploadDescriptor, ValidationError, ValidationErrors,
        ValidatorConfig, ValueValidator, record_from_value,
    };
}
