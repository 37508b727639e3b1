//! Optional stderr logging of native-side `tracing` events.

use pyo3::{exceptions::PyValueError, prelude::*};
use tracing_subscriber::EnvFilter;

/// Environment variable read when no explicit filter is given.
pub const LOG_ENV: &str = "SQLBRIDGE_LOG";

const DEFAULT_FILTER: &str = "sqlbridge=info,_sqlbridge=info";

/// Installs a global stderr subscriber.
///
/// `filter` uses `EnvFilter` syntax (e.g. `"sqlbridge=debug"`); without one,
/// `SQLBRIDGE_LOG` is used, then the default. Returns `false` if a subscriber
/// was already installed, by this module or by anything else in the process.
pub fn install(filter: Option<&str>) -> PyResult<bool> {
    let directives = match filter {
        Some(filter) => filter.to_owned(),
        None => std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_owned()),
    };
    let env_filter = EnvFilter::try_new(&directives)
        .map_err(|e| PyValueError::new_err(format!("invalid log filter {directives:?}: {e}")))?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .is_ok();
    Ok(installed)
}

/// Installs logging at import time when `SQLBRIDGE_LOG` is set.
///
/// A bad filter in the environment must not make the module unimportable, so
/// it is printed to stderr instead.
pub(crate) fn install_from_env(py: Python<'_>) {
    if std::env::var_os(LOG_ENV).is_none() {
        return;
    }
    if let Err(err) = install(None) {
        err.print(py);
    }
}
