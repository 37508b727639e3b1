use crate::{
    error::{NativeResult, ReleaseError},
    handle::{HandleId, HandleKind},
    value::Value,
};

/// The native side of the boundary.
///
/// Host bindings talk to drivers only through this trait: every call takes and
/// returns ids, canonical values and [`NativeResult`]s, never live resources.
/// Implementations are shared across threads and own their locking; callers
/// must not assume exclusive access to any id between calls.
pub trait Backend: Send + Sync {
    /// Names of the registered drivers, sorted.
    fn drivers(&self) -> Vec<String>;

    /// Opens a connection and returns its handle in the connection space.
    fn open(&self, driver: &str, data_source: &str) -> NativeResult<HandleId>;

    /// Executes `sql` on a connection and returns a handle in the result space.
    fn exec(&self, connection: HandleId, sql: &str, params: &[Value]) -> NativeResult<HandleId>;

    fn last_insert_id(&self, result: HandleId) -> NativeResult<i64>;

    fn rows_affected(&self, result: HandleId) -> NativeResult<u64>;

    /// Frees the resource behind `id` in the `kind` space.
    ///
    /// Releasing an id twice, or under the wrong kind, returns an error and
    /// leaves every other handle untouched.
    fn release(&self, kind: HandleKind, id: HandleId) -> Result<(), ReleaseError>;
}
