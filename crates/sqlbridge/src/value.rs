/// A statement parameter or result scalar in the form drivers consume.
///
/// Every host value bound to a statement is coerced into exactly one of these
/// variants before it crosses into a driver. Drivers never see host objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Boolean; drivers without a native boolean store it as `0`/`1`.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// IEEE-754 double.
    Float(f64),
    /// Text, always valid UTF-8.
    Text(String),
    /// Raw bytes, bound as a blob.
    Bytes(Vec<u8>),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// An integer produced by a result accessor.
///
/// Last-insert ids are signed, row counts are unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    LastInsertId(i64),
    RowsAffected(u64),
}
