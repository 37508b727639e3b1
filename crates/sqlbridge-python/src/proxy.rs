//! Python objects that stand for native connections and results.
//!
//! A proxy holds a handle id, never the resource. It is created only by an
//! entry point after the native call succeeded, it never changes, and when
//! Python frees it the handle is released exactly once through `Drop`.

use std::sync::Arc;

use pyo3::{
    prelude::*,
    types::{PyInt, PyTuple},
};
use sqlbridge::{Backend, HandleId, HandleKind, Scalar};

use crate::{
    convert::{marshal_params, unmarshal_scalar},
    encoding::{Coercion, to_utf8},
    exceptions::raise_if_error,
};

/// A live handle together with the backend that minted it.
///
/// Dropping it releases the handle. Release failures are logged and dropped:
/// this runs from the interpreter's deallocator, where there is no caller.
struct BoundHandle {
    backend: Arc<dyn Backend>,
    kind: HandleKind,
    id: HandleId,
}

impl BoundHandle {
    fn new(backend: Arc<dyn Backend>, kind: HandleKind, id: HandleId) -> Self {
        tracing::trace!(%kind, %id, "bound handle");
        Self { backend, kind, id }
    }
}

impl Drop for BoundHandle {
    fn drop(&mut self) {
        match self.backend.release(self.kind, self.id) {
            Ok(()) => tracing::trace!(kind = %self.kind, id = %self.id, "released handle"),
            Err(err) => tracing::warn!(%err, "failed to release handle from finalizer"),
        }
    }
}

/// An open database connection, returned by `sqlbridge.open()`.
///
/// There is no Python constructor and no `close()`: the connection lives
/// exactly as long as this object.
#[pyclass(name = "DB", module = "sqlbridge", frozen)]
pub struct PyDb {
    bound: BoundHandle,
}

impl PyDb {
    pub(crate) fn bind(backend: Arc<dyn Backend>, id: HandleId) -> Self {
        Self {
            bound: BoundHandle::new(backend, HandleKind::Connection, id),
        }
    }
}

#[pymethods]
impl PyDb {
    /// Executes a statement that returns no rows.
    ///
    /// # Arguments
    /// * `sql` - statement text, must be a `str`
    /// * `params` - values for the statement's placeholders, in order
    ///
    /// # Raises
    /// * `TypeError` / `OverflowError` if `sql` or a parameter cannot be converted;
    ///   nothing is executed in that case
    /// * `sqlbridge.Error` if the driver rejects the statement
    #[pyo3(signature = (sql, *params))]
    pub fn exec<'py>(
        &self,
        py: Python<'py>,
        sql: &Bound<'py, PyAny>,
        params: &Bound<'py, PyTuple>,
    ) -> PyResult<Bound<'py, PyExecResult>> {
        let sql = to_utf8(sql, Coercion::Strict)?;
        let params = marshal_params(params)?;

        let backend = Arc::clone(&self.bound.backend);
        let connection = self.bound.id;
        let result = py.detach(|| backend.exec(connection, sql.as_str(), &params));
        let id = raise_if_error(py, result)?;
        Bound::new(py, PyExecResult::bind(backend, id))
    }

    /// The connection's handle id.
    #[getter]
    pub fn handle(&self) -> u32 {
        self.bound.id.raw()
    }

    fn __repr__(&self) -> String {
        format!("<sqlbridge.DB handle={}>", self.bound.id.raw())
    }
}

/// The outcome of `DB.exec()`.
#[pyclass(name = "Result", module = "sqlbridge", frozen)]
pub struct PyExecResult {
    bound: BoundHandle,
}

impl PyExecResult {
    fn bind(backend: Arc<dyn Backend>, id: HandleId) -> Self {
        Self {
            bound: BoundHandle::new(backend, HandleKind::Result, id),
        }
    }
}

#[pymethods]
impl PyExecResult {
    /// Id generated by the statement, if the driver reports one.
    pub fn last_insert_id<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyInt>> {
        let backend = &self.bound.backend;
        let id = self.bound.id;
        let value = raise_if_error(py, py.detach(|| backend.last_insert_id(id)))?;
        Ok(unmarshal_scalar(py, Scalar::LastInsertId(value)))
    }

    /// Number of rows changed by the statement.
    pub fn rows_affected<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyInt>> {
        let backend = &self.bound.backend;
        let id = self.bound.id;
        let count = raise_if_error(py, py.detach(|| backend.rows_affected(id)))?;
        Ok(unmarshal_scalar(py, Scalar::RowsAffected(count)))
    }

    /// The result's handle id.
    #[getter]
    pub fn handle(&self) -> u32 {
        self.bound.id.raw()
    }

    fn __repr__(&self) -> String {
        format!("<sqlbridge.Result handle={}>", self.bound.id.raw())
    }
}
