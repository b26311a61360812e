//! Language tags
//!
//! Catalogs and localized labels are keyed by plain language tags (`"es"`,
//! `"en-US"`). Lookups try the tag as written, then its canonical form, then
//! the language-only form.

use crate::{I18nError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language with an optional script and region.
///
/// ```
/// use formcheck_i18n::Locale;
///
/// let locale = Locale::parse("es_mx").unwrap();
/// assert_eq!(locale.tag(), "es-MX");
/// assert_eq!(locale.language_only().tag(), "es");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    /// ISO 639 language code, lower case
    pub language: String,
    /// Optional script, title case (e.g. "Latn")
    pub script: Option<String>,
    /// Optional region, upper case or UN M.49 digits
    pub region: Option<String>,
}

impl Locale {
    /// Create a locale from a language and optional region.
    pub fn new(language: impl Into<String>, region: Option<impl Into<String>>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            script: None,
            region: region.map(|r| r.into().to_uppercase()),
        }
    }

    /// Parse a BCP 47-ish tag. Both `-` and `_` separate subtags.
    pub fn parse(tag: &str) -> Result<Self> {
        let mut parts = tag.trim().split(['-', '_']);
        let language = parts.next().unwrap_or_default().to_lowercase();

        if language.len() < 2
            || language.len() > 3
            || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(I18nError::InvalidLocale(tag.to_string()));
        }

        let mut script = None;
        let mut region = None;
        for part in parts {
            if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut chars = part.chars();
                script = chars.next().map(|first| {
                    first
                        .to_uppercase()
                        .chain(chars.flat_map(|c| c.to_lowercase()))
                        .collect()
                });
            } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                region = Some(part.to_uppercase());
            } else if part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()) {
                region = Some(part.to_string());
            } else {
                return Err(I18nError::InvalidLocale(tag.to_string()));
            }
        }

        Ok(Self {
            language,
            script,
            region,
        })
    }

    /// Canonical tag (e.g. "zh-Hans-CN").
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        if let Some(ref script) = self.script {
            tag.push('-');
            tag.push_str(script);
        }
        if let Some(ref region) = self.region {
            tag.push('-');
            tag.push_str(region);
        }
        tag
    }

    /// Same language without script or region.
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            script: None,
            region: None,
        }
    }

    /// Tags to try, most specific first, without duplicates.
    pub fn fallback_chain(&self) -> Vec<String> {
        let mut chain = vec![self.tag()];
        if self.script.is_some() && self.region.is_some() {
            chain.push(format!(
                "{}-{}",
                self.language,
                self.script.as_deref().unwrap_or_default()
            ));
        }
        if chain.last().map(String::as_str) != Some(self.language.as_str()) {
            chain.push(self.language.clone());
        }
        chain
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Find the entry for `tag` using the lookup function `get`.
///
/// The raw tag is tried first so that catalogs keyed by arbitrary strings
/// still work, then the locale fallback chain when the tag parses.
pub fn lookup_localized<'a, V: ?Sized>(
    tag: &str,
    get: impl Fn(&str) -> Option<&'a V>,
) -> Option<&'a V> {
    if let Some(found) = get(tag) {
        return Some(found);
    }
    let locale = Locale::parse(tag).ok()?;
    locale
        .fallback_chain()
        .iter()
        .filter(|candidate| candidate.as_str() != tag)
        .find_map(|candidate| get(candidate.as_str()))
}
