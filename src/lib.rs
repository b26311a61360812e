// formcheck - declarative validation for form records, values and uploads
//
// Rule sets are plain data: each field names the checks that apply to it,
// `@field` parameters pull in another field's value and label, and error
// messages come from localized catalogs or a deterministic fallback format.

// Re-export core functionality
pub use formcheck_validation::*;

// Re-export member crates
pub use formcheck_i18n;
pub use formcheck_log;
pub use formcheck_validation;

pub use formcheck_i18n::{I18nError, Locale};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Catalog,
        ConfigError,
        DateOrdering,
        FieldRules,
        FileValidator,
        Label,
        MessageBundle,
        // Record validation
        Record,
        RecordValidator,
        RuleSet,
        RuleSetLoader,
        UploadDescriptor,
        UploadStatus,
        ValidationError,
        ValidationErrors,
        ValidatorConfig,
        ValueValidator,
        record_from_value,
    };
}
