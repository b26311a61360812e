//! Built-in templates
//!
//! Every check key the validators can report has an English and a Spanish
//! template. The first placeholder is always the field label.

use crate::{Catalog, MessageBundle};
use once_cell::sync::Lazy;

const EN: &[(&str, &str)] = &[
    ("isRequired", "%s is required"),
    ("isInt", "%s must be an integer"),
    ("isNumeric", "%s must be a number"),
    ("isDecimal", "%s must be a decimal number"),
    ("isBool", "%s must be yes or no"),
    ("isEmail", "%s must be a valid email address"),
    ("isArray", "%s must be a list of values"),
    ("isSafeText", "%s contains characters that are not allowed"),
    ("isDate", "%s must be a date (YYYY-MM-DD)"),
    ("isTime", "%s must be a time (HH:MM:SS)"),
    ("isDatetime", "%s must be a date and time (YYYY-MM-DD HH:MM:SS)"),
    ("regex", "%s has an invalid format"),
    ("minLength", "%s must be at least %s characters long"),
    ("maxLength", "%s must be at most %s characters long"),
    ("min", "%s must be at least %s"),
    ("max", "%s must be at most %s"),
    ("greater", "%s must be greater than %s"),
    ("less", "%s must be less than %s"),
    ("greaterDate", "%s must be a date after %s"),
    ("lessDate", "%s must be a date before %s"),
    ("greaterDatetime", "%s must be later than %s"),
    ("lessDatetime", "%s must be earlier than %s"),
    ("equal", "%s must match %s"),
    ("notEqual", "%s must be different from %s"),
    ("isMimeType", "%s has a file type that is not allowed"),
    ("move", "%s could not be saved"),
    ("isOk:1", "%s exceeds the maximum upload size of the server"),
    ("isOk:2", "%s exceeds the maximum size allowed by the form"),
    ("isOk:3", "%s was only partially uploaded"),
    ("isOk:4", "%s was not uploaded"),
    ("isOk:6", "%s could not be stored: missing temporary folder"),
    ("isOk:7", "%s could not be written to disk"),
    ("isOk:8", "%s upload was stopped by an extension"),
];

const ES: &[(&str, &str)] = &[
    ("isRequired", "%s es obligatorio"),
    ("isInt", "%s debe ser un número entero"),
    ("isNumeric", "%s debe ser un número"),
    ("isDecimal", "%s debe ser un número decimal"),
    ("isBool", "%s debe ser sí o no"),
    ("isEmail", "%s debe ser un correo electrónico válido"),
    ("isArray", "%s debe ser una lista de valores"),
    ("isSafeText", "%s contiene caracteres no permitidos"),
    ("isDate", "%s debe ser una fecha (AAAA-MM-DD)"),
    ("isTime", "%s debe ser una hora (HH:MM:SS)"),
    ("isDatetime", "%s debe ser una fecha y hora (AAAA-MM-DD HH:MM:SS)"),
    ("regex", "%s tiene un formato inválido"),
    ("minLength", "%s debe tener al menos %s caracteres"),
    ("maxLength", "%s debe tener máximo %s caracteres"),
    ("min", "%s debe ser mínimo %s"),
    ("max", "%s debe ser máximo %s"),
    ("greater", "%s debe ser mayor que %s"),
    ("less", "%s debe ser menor que %s"),
    ("greaterDate", "%s debe ser una fecha posterior a %s"),
    ("lessDate", "%s debe ser una fecha anterior a %s"),
    ("greaterDatetime", "%s debe ser posterior a %s"),
    ("lessDatetime", "%s debe ser anterior a %s"),
    ("equal", "%s debe coincidir con %s"),
    ("notEqual", "%s debe ser distinto de %s"),
    ("isMimeType", "%s tiene un tipo de archivo no permitido"),
    ("move", "%s no se pudo guardar"),
    ("isOk:1", "%s excede el tamaño máximo de carga del servidor"),
    ("isOk:2", "%s excede el tamaño máximo permitido por el formulario"),
    ("isOk:3", "%s se subió sólo parcialmente"),
    ("isOk:4", "%s no fue subido"),
    ("isOk:6", "%s no se pudo guardar: falta la carpeta temporal"),
    ("isOk:7", "%s no se pudo escribir en disco"),
    ("isOk:8", "la carga de %s fue detenida por una extensión"),
];

static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(|| {
    Catalog::localized([
        ("en", EN.iter().copied().collect::<MessageBundle>()),
        ("es", ES.iter().copied().collect::<MessageBundle>()),
    ])
});

impl Catalog {
    /// The built-in `en`/`es` catalog.
    pub fn defaults() -> Catalog {
        DEFAULT_CATALOG.clone()
    }
}

/// Keys present in the built-in catalog.
pub fn default_keys() -> impl Iterator<Item = &'static str> {
    EN.iter().map(|(key, _)| *key)
}
