//! Native side of the sqlbridge boundary.
//!
//! Drivers are registered by name in a [`Registry`]; host bindings reach them
//! only through the [`Backend`] trait, passing [`HandleId`]s and canonical
//! [`Value`]s and receiving [`NativeResult`]s. Live connections and results
//! never leave the registry.

mod backend;
mod driver;
mod error;
mod handle;
mod registry;
#[cfg(feature = "sqlite")]
pub mod sqlite;
mod value;

pub use crate::{
    backend::Backend,
    driver::{Connection, Driver, ExecResult},
    error::{DriverError, Failure, NativeResult, RegisterError, ReleaseError},
    handle::{HandleId, HandleKind},
    registry::Registry,
    value::{Scalar, Value},
};
