//! The exception raised for native failures, and the single check that raises it.
//!
//! Argument problems keep their natural Python types (`TypeError`,
//! `OverflowError`, `UnicodeEncodeError`); only failures reported by the
//! native side become `sqlbridge.Error`.

use pyo3::{create_exception, exceptions::PyException, intern, prelude::*};
use sqlbridge::NativeResult;

use crate::encoding::from_utf8;

create_exception!(
    sqlbridge,
    Error,
    PyException,
    "Raised when a driver or the handle registry reports a failure.\n\n\
     `args[0]` is the native message, unchanged; errors raised by this module \
     also carry it as `message`."
);

/// Creates the `PyErr` for a native failure message.
///
/// The message becomes the exception's only argument, so `str(err)`,
/// `err.args[0]` and pickling all see it.
#[must_use]
pub fn native_error(py: Python<'_>, message: &str) -> PyErr {
    let err = Error::new_err(message.to_owned());
    if let Err(e) = err.value(py).setattr(intern!(py, "message"), from_utf8(py, message)) {
        return e;
    }
    err
}

/// Turns a native failure into a raised `sqlbridge.Error`, or returns the payload.
///
/// Every entry point passes its native result through here before using it.
pub fn raise_if_error<T>(py: Python<'_>, result: NativeResult<T>) -> PyResult<T> {
    result.map_err(|failure| native_error(py, failure.message()))
}
