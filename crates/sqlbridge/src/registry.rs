//! The process-wide driver and handle registry.
//!
//! Resources never leave this module: hosts hold [`HandleId`]s and present them
//! back on every call. Connections and results live in two separate tables,
//! while ids come from one shared counter so an id is unique across both.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, RwLock},
};

use crate::{
    backend::Backend,
    driver::{Connection, Driver, ExecResult},
    error::{Failure, NativeResult, RegisterError, ReleaseError},
    handle::{HandleId, HandleKind},
    value::Value,
};

/// A connection shared between the table and in-flight calls.
///
/// Each connection has its own lock so a long statement on one connection
/// never blocks the handle tables or other connections.
type SharedConnection = Arc<Mutex<Box<dyn Connection>>>;

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::with_builtin_drivers()));

/// Named drivers plus the live connection and result handles.
pub struct Registry {
    drivers: RwLock<BTreeMap<String, Arc<dyn Driver>>>,
    handles: Mutex<HandleTables>,
}

#[derive(Default)]
struct HandleTables {
    connections: HashMap<HandleId, SharedConnection>,
    results: HashMap<HandleId, Arc<dyn ExecResult>>,
    last_id: u32,
}

impl HandleTables {
    /// Mints the next free id, wrapping around and skipping ids still in use.
    fn mint(&mut self) -> HandleId {
        loop {
            self.last_id = self.last_id.wrapping_add(1);
            if self.last_id == 0 {
                continue;
            }
            let id = HandleId::new(self.last_id);
            if !self.connections.contains_key(&id) && !self.results.contains_key(&id) {
                return id;
            }
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables();
        f.debug_struct("Registry")
            .field("drivers", &self.drivers())
            .field("connections", &tables.connections.len())
            .field("results", &tables.results.len())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry with no drivers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(BTreeMap::new()),
            handles: Mutex::new(HandleTables::default()),
        }
    }

    /// Creates a registry preloaded with the drivers compiled into this crate.
    #[must_use]
    pub fn with_builtin_drivers() -> Self {
        let registry = Self::new();
        #[cfg(feature = "sqlite")]
        registry.insert_driver(crate::sqlite::DRIVER_NAME, Arc::new(crate::sqlite::SqliteDriver));
        registry
    }

    /// The registry shared by every binding in the process.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Makes `driver` available under `name`.
    pub fn register(&self, name: &str, driver: Arc<dyn Driver>) -> Result<(), RegisterError> {
        if name.is_empty() {
            return Err(RegisterError::EmptyName);
        }
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);
        if drivers.contains_key(name) {
            return Err(RegisterError::Duplicate(name.to_owned()));
        }
        drivers.insert(name.to_owned(), driver);
        tracing::debug!(driver = name, "registered driver");
        Ok(())
    }

    /// Number of live handles in one handle space.
    #[must_use]
    pub fn live_handles(&self, kind: HandleKind) -> usize {
        let tables = self.tables();
        match kind {
            HandleKind::Connection => tables.connections.len(),
            HandleKind::Result => tables.results.len(),
        }
    }

    #[cfg(feature = "sqlite")]
    fn insert_driver(&self, name: &str, driver: Arc<dyn Driver>) {
        self.drivers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), driver);
    }

    fn driver(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Locks the handle tables.
    ///
    /// Every critical section leaves the maps consistent, so a panic elsewhere
    /// while holding the lock does not invalidate them.
    fn tables(&self) -> MutexGuard<'_, HandleTables> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connection(&self, id: HandleId) -> NativeResult<SharedConnection> {
        self.tables()
            .connections
            .get(&id)
            .cloned()
            .ok_or_else(|| Failure::invalid_handle(HandleKind::Connection, id))
    }

    fn result(&self, id: HandleId) -> NativeResult<Arc<dyn ExecResult>> {
        self.tables()
            .results
            .get(&id)
            .cloned()
            .ok_or_else(|| Failure::invalid_handle(HandleKind::Result, id))
    }
}

impl Backend for Registry {
    fn drivers(&self) -> Vec<String> {
        self.drivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn open(&self, driver: &str, data_source: &str) -> NativeResult<HandleId> {
        let factory = self.driver(driver).ok_or_else(|| Failure::unknown_driver(driver))?;
        let connection = factory.open(data_source)?;

        let mut tables = self.tables();
        let id = tables.mint();
        tables.connections.insert(id, Arc::new(Mutex::new(connection)));
        tracing::debug!(driver, %id, "opened connection");
        Ok(id)
    }

    fn exec(&self, connection: HandleId, sql: &str, params: &[Value]) -> NativeResult<HandleId> {
        let shared = self.connection(connection)?;
        let outcome = {
            let mut conn = shared.lock().unwrap_or_else(PoisonError::into_inner);
            conn.exec(sql, params)?
        };

        let mut tables = self.tables();
        let id = tables.mint();
        tables.results.insert(id, Arc::from(outcome));
        tracing::debug!(%connection, result = %id, params = params.len(), "executed statement");
        Ok(id)
    }

    fn last_insert_id(&self, result: HandleId) -> NativeResult<i64> {
        Ok(self.result(result)?.last_insert_id()?)
    }

    fn rows_affected(&self, result: HandleId) -> NativeResult<u64> {
        Ok(self.result(result)?.rows_affected()?)
    }

    fn release(&self, kind: HandleKind, id: HandleId) -> Result<(), ReleaseError> {
        // bind the removed entry so it is dropped after the table lock is released
        let found = match kind {
            HandleKind::Connection => {
                let removed = self.tables().connections.remove(&id);
                removed.is_some()
            }
            HandleKind::Result => {
                let removed = self.tables().results.remove(&id);
                removed.is_some()
            }
        };
        if found {
            tracing::debug!(%kind, %id, "released handle");
            Ok(())
        } else {
            Err(ReleaseError::Unknown { kind, id })
        }
    }
}
