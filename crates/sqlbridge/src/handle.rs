use std::fmt;

/// Opaque identifier of a resource owned by the [`Registry`](crate::Registry).
///
/// Handles are plain integers so they can be held by host objects without
/// exposing the resource itself. Id `0` is never minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u32);

impl HandleId {
    /// Creates a handle ID from a raw integer.
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer identifier.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The handle space a [`HandleId`] belongs to.
///
/// An id minted for one kind must only ever be used or released as that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// An open driver connection.
    Connection,
    /// The outcome of an executed statement.
    Result,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => f.write_str("connection"),
            Self::Result => f.write_str("result"),
        }
    }
}
