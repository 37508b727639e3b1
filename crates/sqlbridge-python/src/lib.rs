//! Python bindings for the sqlbridge driver registry.
//!
//! Python code gets opaque proxy objects for connections and results; the
//! resources themselves stay in the native registry and are released when
//! the proxies are garbage collected.

mod convert;
mod encoding;
mod exceptions;
mod logging;
mod proxy;

use std::sync::{Arc, OnceLock};

pub use convert::{marshal_params, unmarshal_scalar};
pub use encoding::{Coercion, Utf8Text, from_utf8, to_utf8};
pub use exceptions::{Error as SqlError, native_error, raise_if_error};
pub use logging::{LOG_ENV, install as install_logging};
pub use proxy::{PyDb, PyExecResult};
use pyo3::{prelude::*, types::PyList};
use sqlbridge::{Backend, Registry};

/// Returns the package version, converting Cargo's format to Python's PEP 440.
fn get_version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();

    VERSION.get_or_init(|| {
        let version = env!("CARGO_PKG_VERSION");
        // "1.0-alpha1" -> "1.0a1"; not full PEP 440 but covers the versions we publish
        version.replace("-alpha", "a").replace("-beta", "b")
    })
}

/// The process-wide registry used by the module-level functions.
fn default_backend() -> Arc<dyn Backend> {
    Registry::global()
}

/// Lists the drivers available in `backend`.
pub fn drivers_with<'py>(py: Python<'py>, backend: &dyn Backend) -> PyResult<Bound<'py, PyList>> {
    let names = backend.drivers();
    PyList::new(py, names.iter().map(|name| from_utf8(py, name)))
}

/// Opens a connection through `backend` and wraps its handle in a `DB` proxy.
///
/// Both arguments must be `str`. No handle exists unless the native call
/// succeeded.
pub fn open_with<'py>(
    py: Python<'py>,
    backend: Arc<dyn Backend>,
    driver: &Bound<'py, PyAny>,
    dsn: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyDb>> {
    let driver = to_utf8(driver, Coercion::Strict)?;
    let dsn = to_utf8(dsn, Coercion::Strict)?;

    let result = py.detach(|| backend.open(driver.as_str(), dsn.as_str()));
    let id = raise_if_error(py, result)?;
    Bound::new(py, PyDb::bind(backend, id))
}

/// Names of the registered drivers, sorted.
#[pyfunction]
fn drivers(py: Python<'_>) -> PyResult<Bound<'_, PyList>> {
    drivers_with(py, &*default_backend())
}

/// Opens a connection.
///
/// # Arguments
/// * `driver` - registered driver name, e.g. `"sqlite3"`
/// * `dsn` - driver-specific data source string
///
/// # Raises
/// * `TypeError` if either argument is not a `str`
/// * `sqlbridge.Error` if the driver is unknown or refuses the data source
#[pyfunction]
fn open<'py>(py: Python<'py>, driver: &Bound<'py, PyAny>, dsn: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyDb>> {
    open_with(py, default_backend(), driver, dsn)
}

/// Logs native events to stderr.
///
/// Returns `False` if a subscriber was already installed.
#[pyfunction]
#[pyo3(signature = (filter = None))]
fn enable_logging(filter: Option<&str>) -> PyResult<bool> {
    logging::install(filter)
}

/// sqlbridge - native SQL drivers behind opaque Python handles.
#[pymodule]
mod _sqlbridge {
    use pyo3::prelude::*;

    #[pymodule_export]
    use super::PyDb;
    #[pymodule_export]
    use super::PyExecResult;
    #[pymodule_export]
    use super::SqlError;
    #[pymodule_export]
    use super::drivers;
    #[pymodule_export]
    use super::enable_logging;
    #[pymodule_export]
    use super::open;
    use super::{LOG_ENV, get_version, logging};

    #[pymodule_init]
    fn init(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add("__version__", get_version())?;
        m.add("LOG_ENV", LOG_ENV)?;
        logging::install_from_env(m.py());
        Ok(())
    }
}
