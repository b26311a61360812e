// Error message formatting

use formcheck_i18n::{Catalog, MessageBundle};
use formcheck_log::{targets, warn};
use std::fmt;
use std::sync::Arc;

/// Turns a failed check into the message reported to the caller.
///
/// `params` are the check's own arguments, without the label.
pub trait MessageFormatter: Send + Sync + fmt::Debug {
    fn format(&self, key: &str, label: &str, params: &[String]) -> String;
}

/// Formatter shared between the validators of one run.
pub type SharedFormatter = Arc<dyn MessageFormatter>;

/// Used when no catalog applies: the label and parameters joined with
/// `", "`, then the check key (`"Name, 5 maxLength"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackFormatter;

impl MessageFormatter for FallbackFormatter {
    fn format(&self, key: &str, label: &str, params: &[String]) -> String {
        let mut joined = String::from(label);
        for param in params {
            joined.push_str(", ");
            joined.push_str(param);
        }
        format!("{} {}", joined, key)
    }
}

/// Renders templates from one language's bundle. Keys missing from the
/// bundle use the fallback format.
#[derive(Debug, Clone)]
pub struct CatalogFormatter {
    bundle: MessageBundle,
}

impl CatalogFormatter {
    pub fn new(bundle: MessageBundle) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &MessageBundle {
        &self.bundle
    }
}

impl MessageFormatter for CatalogFormatter {
    fn format(&self, key: &str, label: &str, params: &[String]) -> String {
        let mut args = Vec::with_capacity(params.len() + 1);
        args.push(label);
        args.extend(params.iter().map(String::as_str));
        match self.bundle.format(key, &args) {
            Some(message) => message,
            None => FallbackFormatter.format(key, label, params),
        }
    }
}

/// Pick the formatter for a run.
pub fn formatter_for(catalog: Option<&Catalog>, language: Option<&str>) -> SharedFormatter {
    let Some(catalog) = catalog else {
        return Arc::new(FallbackFormatter);
    };
    match catalog.select(language) {
        Some(bundle) => Arc::new(CatalogFormatter::new(bundle.clone())),
        None => {
            warn!(
                target: targets::CATALOG,
                "no templates for language {:?} (available: {:?}), using fallback messages",
                language,
                catalog.languages()
            );
            Arc::new(FallbackFormatter)
        }
    }
}
