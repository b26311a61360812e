//! Message catalogs for formcheck
//!
//! Validation errors are rendered from printf-style templates looked up by
//! check key. This crate owns the catalog side of that:
//!
//! - **Bundles**: one language worth of `key -> template` entries
//! - **Catalogs**: a single bundle, or bundles keyed by language tag
//! - **Locale fallback**: `es-MX` resolves to `es` when needed
//! - **Defaults**: English and Spanish templates for every check
//!
//! # Quick Start
//!
//! ```rust
//! use formcheck_i18n::{Catalog, MessageBundle};
//!
//! let catalog = Catalog::localized([
//!     ("en", MessageBundle::new().with("isRequired", "%s is required")),
//!     ("es", MessageBundle::new().with("isRequired", "%s es obligatorio")),
//! ]);
//!
//! let bundle = catalog.select(Some("es")).unwrap();
//! assert_eq!(
//!     bundle.format("isRequired", &["Nombre"]).as_deref(),
//!     Some("Nombre es obligatorio")
//! );
//! ```

mod defaults;
mod error;
mod format;
mod locale;
mod messages;

pub use defaults::default_keys;
pub use error::I18nError;
pub use format::{format_template, placeholder_count};
pub use locale::{Locale, lookup_localized};
pub use messages::{Catalog, MessageBundle};

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{Catalog, I18nError, Locale, MessageBundle, Result, format_template};
}
