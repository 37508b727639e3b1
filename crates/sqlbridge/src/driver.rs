//! Traits implemented by SQL drivers.
//!
//! A driver is looked up by name and only ever invoked; dialects, pooling and
//! transactions are entirely its own business.

use crate::{error::DriverError, value::Value};

/// A named factory for connections.
pub trait Driver: Send + Sync {
    /// Opens a connection to the given data source.
    fn open(&self, data_source: &str) -> Result<Box<dyn Connection>, DriverError>;
}

/// An open connection.
///
/// The registry serialises calls on one connection, so implementations only
/// need to be `Send`.
pub trait Connection: Send {
    /// Executes a statement that returns no rows.
    ///
    /// `params[n]` binds to the statement's `n`-th placeholder.
    fn exec(&mut self, sql: &str, params: &[Value]) -> Result<Box<dyn ExecResult>, DriverError>;
}

/// Summary of an executed statement.
///
/// Both accessors may fail independently, e.g. for drivers that cannot report
/// an inserted id.
pub trait ExecResult: Send + Sync {
    fn last_insert_id(&self) -> Result<i64, DriverError>;

    fn rows_affected(&self) -> Result<u64, DriverError>;
}
