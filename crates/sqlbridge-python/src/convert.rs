//! Conversion between Python objects and the native `Value`/`Scalar` types.
//!
//! - `marshal_params`: statement parameters, Python -> `Value`
//! - `unmarshal_scalar`: accessor results, `Scalar` -> Python `int`

use pyo3::{
    exceptions::PyTypeError,
    prelude::*,
    types::{PyBool, PyByteArray, PyBytes, PyFloat, PyInt, PyString, PyTuple},
};
use sqlbridge::{Scalar, Value};

use crate::encoding::{Coercion, to_utf8, type_name};

/// Converts statement parameters to canonical values, preserving order.
///
/// The whole tuple is converted before anything is sent to a driver, so a
/// bad parameter anywhere aborts the call with nothing executed.
pub fn marshal_params(params: &Bound<'_, PyTuple>) -> PyResult<Vec<Value>> {
    let mut values = Vec::with_capacity(params.len());
    for (slot, param) in params.iter().enumerate() {
        values.push(marshal_param(slot, &param)?);
    }
    Ok(values)
}

/// Converts a single parameter.
///
/// # Important
/// Checks `bool` before `int` since `bool` is a subclass of `int` in Python.
fn marshal_param(slot: usize, param: &Bound<'_, PyAny>) -> PyResult<Value> {
    if param.is_none() {
        Ok(Value::Null)
    } else if let Ok(b) = param.cast::<PyBool>() {
        Ok(Value::Bool(b.is_true()))
    } else if let Ok(int) = param.cast::<PyInt>() {
        // OverflowError for anything outside i64
        Ok(Value::Int(int.extract()?))
    } else if let Ok(float) = param.cast::<PyFloat>() {
        Ok(Value::Float(float.value()))
    } else if param.is_instance_of::<PyString>() {
        Ok(Value::Text(to_utf8(param, Coercion::Lenient)?.into_string()))
    } else if let Ok(bytes) = param.cast::<PyBytes>() {
        Ok(Value::Bytes(bytes.as_bytes().to_vec()))
    } else if let Ok(bytes) = param.cast::<PyByteArray>() {
        Ok(Value::Bytes(bytes.to_vec()))
    } else {
        Err(PyTypeError::new_err(format!(
            "cannot bind parameter {slot} of type {}",
            type_name(param)
        )))
    }
}

/// Converts an accessor result to a Python `int`, keeping its sign and width.
pub fn unmarshal_scalar(py: Python<'_>, scalar: Scalar) -> Bound<'_, PyInt> {
    match scalar {
        Scalar::LastInsertId(id) => id.into_pyobject(py),
        Scalar::RowsAffected(count) => count.into_pyobject(py),
    }
    .unwrap_or_else(|never| match never {})
}
