//! Text conversion between Python objects and UTF-8.
//!
//! Everything that reaches the native side as text goes through [`to_utf8`];
//! everything that comes back goes through [`from_utf8`]. Nothing else in the
//! crate reads string data out of Python objects.

use pyo3::{exceptions::PyTypeError, prelude::*, types::PyString};

/// How [`to_utf8`] treats values that are not already `str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Only `str` and its subclasses are accepted; everything else is a `TypeError`.
    Strict,
    /// Any object is accepted and converted with `str(value)` first.
    Lenient,
}

/// Owned text that is guaranteed to be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8Text(String);

impl Utf8Text {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes, not characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Converts a Python object to UTF-8 text.
///
/// The conversion error, whatever raised it, is handed back as a value so
/// the caller decides whether to abort the surrounding operation. The input
/// object is never modified.
///
/// # Errors
/// * `TypeError` in strict mode when `value` is not a `str`
/// * any exception raised by `value.__str__` in lenient mode
/// * `UnicodeEncodeError` when the text holds lone surrogates
pub fn to_utf8(value: &Bound<'_, PyAny>, coercion: Coercion) -> Result<Utf8Text, PyErr> {
    let text = match coercion {
        Coercion::Strict => value
            .cast::<PyString>()
            .map_err(|_| PyTypeError::new_err(format!("expected str, got {}", type_name(value))))?
            .clone(),
        Coercion::Lenient => value.str()?,
    };
    Ok(Utf8Text(text.to_str()?.to_owned()))
}

/// Builds a Python `str` from native UTF-8 text.
pub fn from_utf8<'py>(py: Python<'py>, text: &str) -> Bound<'py, PyString> {
    PyString::new(py, text)
}

/// Name of the object's type, for error messages.
pub(crate) fn type_name(value: &Bound<'_, PyAny>) -> String {
    value
        .get_type()
        .name()
        .map_or_else(|_| "object".to_owned(), |name| name.to_string())
}
