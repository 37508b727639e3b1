//! Built-in SQLite driver, registered as `"sqlite3"`.
//!
//! The data source is handed to SQLite unchanged, so plain paths, `:memory:`
//! and `file:` URIs (e.g. `file:app.db?mode=ro`) all work.

use rusqlite::{
    Batch, OpenFlags, ToSql, ffi, params_from_iter,
    types::{ToSqlOutput, ValueRef},
};

use crate::{
    driver::{Connection, Driver, ExecResult},
    error::DriverError,
    value::Value,
};

/// Name the driver is registered under.
pub const DRIVER_NAME: &str = "sqlite3";

/// Factory for [`SqliteConnection`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn open(&self, data_source: &str) -> Result<Box<dyn Connection>, DriverError> {
        let conn = rusqlite::Connection::open_with_flags(data_source, OpenFlags::default())
            .map_err(|e| DriverError::Open(e.to_string()))?;
        Ok(Box::new(SqliteConnection { conn }))
    }
}

#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Rows changed by every completed INSERT, UPDATE and DELETE since open.
    fn total_changes(&self) -> u64 {
        // SAFETY: the handle is owned by `self.conn`, which outlives the call and
        // is only used from the thread holding this connection's lock.
        let total = unsafe { ffi::sqlite3_total_changes(self.conn.handle()) };
        u64::try_from(total).unwrap_or(0)
    }
}

impl Connection for SqliteConnection {
    /// Runs every statement in `sql`, in order.
    ///
    /// Each statement consumes as many leading `params` as it has placeholders.
    /// Rows produced by `SELECT` or `PRAGMA` are read and discarded.
    fn exec(&mut self, sql: &str, params: &[Value]) -> Result<Box<dyn ExecResult>, DriverError> {
        let before = self.total_changes();
        let mut remaining = params;

        let mut batch = Batch::new(&self.conn, sql);
        while let Some(mut stmt) = batch.next().map_err(exec_error)? {
            let wanted = stmt.parameter_count();
            if wanted > remaining.len() {
                return Err(DriverError::Exec(format!(
                    "not enough args to execute query: want {wanted} got {}",
                    remaining.len()
                )));
            }
            let (bound, rest) = remaining.split_at(wanted);
            remaining = rest;

            let mut rows = stmt.query(params_from_iter(bound)).map_err(exec_error)?;
            while rows.next().map_err(exec_error)?.is_some() {}
        }

        if !remaining.is_empty() {
            return Err(DriverError::Exec(format!(
                "too many args to execute query: want {} got {}",
                params.len() - remaining.len(),
                params.len()
            )));
        }

        // snapshot both now: later statements on this connection overwrite them
        Ok(Box::new(SqliteResult {
            last_insert_id: self.conn.last_insert_rowid(),
            rows_affected: self.total_changes().saturating_sub(before),
        }))
    }
}

fn exec_error(err: rusqlite::Error) -> DriverError {
    DriverError::Exec(err.to_string())
}

/// Counters captured right after a statement ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteResult {
    last_insert_id: i64,
    rows_affected: u64,
}

impl ExecResult for SqliteResult {
    fn last_insert_id(&self) -> Result<i64, DriverError> {
        Ok(self.last_insert_id)
    }

    fn rows_affected(&self) -> Result<u64, DriverError> {
        Ok(self.rows_affected)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Self::Null => ValueRef::Null,
            Self::Bool(b) => ValueRef::Integer(i64::from(*b)),
            Self::Int(i) => ValueRef::Integer(*i),
            Self::Float(f) => ValueRef::Real(*f),
            Self::Text(s) => ValueRef::Text(s.as_bytes()),
            Self::Bytes(b) => ValueRef::Blob(b),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}
