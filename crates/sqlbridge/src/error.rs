use std::fmt;

use crate::handle::{HandleId, HandleKind};

/// Discriminated outcome of every native call.
///
/// Callers must inspect the discriminant before looking at the payload; an
/// `Err` never carries a handle.
pub type NativeResult<T> = Result<T, Failure>;

/// The failure arm of a [`NativeResult`]: a UTF-8 message and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    message: String,
}

impl Failure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }

    pub(crate) fn unknown_driver(name: &str) -> Self {
        Self::new(format!("sql: unknown driver {name:?} (forgotten import?)"))
    }

    pub(crate) fn invalid_handle(kind: HandleKind, id: HandleId) -> Self {
        Self::new(format!("sql: invalid {kind} handle {id}"))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

impl From<DriverError> for Failure {
    fn from(error: DriverError) -> Self {
        Self::new(error.to_string())
    }
}

/// Error raised by a [`Driver`](crate::Driver) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The data source string could not be used to open a connection.
    Open(String),
    /// The statement failed to prepare or execute.
    Exec(String),
    /// A bound parameter is not supported by the driver.
    Unsupported(String),
    /// Any other driver-reported failure.
    Other(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) | Self::Exec(msg) | Self::Other(msg) => f.write_str(msg),
            Self::Unsupported(msg) => write!(f, "unsupported: {msg}"),
        }
    }
}

impl std::error::Error for DriverError {}

/// Failure to release a handle.
///
/// Release runs from host finalizers, where there is no caller to receive an
/// error, so this is only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseError {
    /// No live handle with this id exists in the given handle space, either
    /// because it was already released or because it belongs to the other space.
    Unknown { kind: HandleKind, id: HandleId },
}

impl fmt::Display for ReleaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { kind, id } => write!(f, "no live {kind} handle {id}"),
        }
    }
}

impl std::error::Error for ReleaseError {}

/// Failure to add a driver to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// A driver is already registered under this name.
    Duplicate(String),
    /// Driver names must be non-empty.
    EmptyName,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "sql: register called twice for driver {name}"),
            Self::EmptyName => f.write_str("sql: driver name must not be empty"),
        }
    }
}

impl std::error::Error for RegisterError {}
