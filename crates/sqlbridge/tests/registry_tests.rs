//! Integration tests for the driver and handle `Registry`.
//!
//! A scripted in-memory driver stands in for a real database so that id
//! minting, handle spaces and release behaviour can be checked precisely.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use pretty_assertions::assert_eq;
use sqlbridge::{
    Backend, Connection, Driver, DriverError, ExecResult, Failure, HandleKind, RegisterError, Registry, ReleaseError,
    Value,
};

/// Driver that records every statement it executes.
#[derive(Default)]
struct RecordingDriver {
    opens: AtomicUsize,
    log: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl Driver for RecordingDriver {
    fn open(&self, data_source: &str) -> Result<Box<dyn Connection>, DriverError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if data_source == "refuse" {
            return Err(DriverError::Open("connection refused".to_owned()));
        }
        Ok(Box::new(RecordingConnection {
            log: Arc::clone(&self.log),
        }))
    }
}

struct RecordingConnection {
    log: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl Connection for RecordingConnection {
    fn exec(&mut self, sql: &str, params: &[Value]) -> Result<Box<dyn ExecResult>, DriverError> {
        if sql.starts_with("BAD") {
            return Err(DriverError::Exec(format!("syntax error near {sql:?}")));
        }
        let mut log = self.log.lock().unwrap();
        log.push((sql.to_owned(), params.to_vec()));
        Ok(Box::new(FixedResult {
            last_insert_id: i64::try_from(log.len()).unwrap(),
            rows_affected: params.len() as u64,
        }))
    }
}

struct FixedResult {
    last_insert_id: i64,
    rows_affected: u64,
}

impl ExecResult for FixedResult {
    fn last_insert_id(&self) -> Result<i64, DriverError> {
        if self.rows_affected == 0 {
            return Err(DriverError::Unsupported("LastInsertId is not supported by this driver".to_owned()));
        }
        Ok(self.last_insert_id)
    }

    fn rows_affected(&self) -> Result<u64, DriverError> {
        Ok(self.rows_affected)
    }
}

fn registry_with_recorder() -> (Registry, Arc<RecordingDriver>) {
    let registry = Registry::new();
    let driver = Arc::new(RecordingDriver::default());
    registry.register("recorder", driver.clone()).unwrap();
    (registry, driver)
}

// ============================================================================
// Driver registration
// ============================================================================

#[test]
fn drivers_are_listed_sorted() {
    let registry = Registry::new();
    registry.register("zeta", Arc::new(RecordingDriver::default())).unwrap();
    registry.register("alpha", Arc::new(RecordingDriver::default())).unwrap();
    assert_eq!(registry.drivers(), vec!["alpha".to_owned(), "zeta".to_owned()]);
}

#[test]
fn duplicate_registration_is_rejected() {
    let (registry, _) = registry_with_recorder();
    let err = registry
        .register("recorder", Arc::new(RecordingDriver::default()))
        .unwrap_err();
    assert_eq!(err, RegisterError::Duplicate("recorder".to_owned()));
}

#[test]
fn empty_driver_name_is_rejected() {
    let registry = Registry::new();
    let err = registry.register("", Arc::new(RecordingDriver::default())).unwrap_err();
    assert_eq!(err, RegisterError::EmptyName);
}

#[test]
fn unknown_driver_fails_without_minting() {
    let registry = Registry::new();
    let err = registry.open("nope", "dsn").unwrap_err();
    assert_eq!(err.message(), "sql: unknown driver \"nope\" (forgotten import?)");
    assert_eq!(registry.live_handles(HandleKind::Connection), 0);
}

#[cfg(feature = "sqlite")]
#[test]
fn builtin_registry_has_sqlite() {
    let registry = Registry::with_builtin_drivers();
    assert_eq!(registry.drivers(), vec!["sqlite3".to_owned()]);
    assert!(Registry::global().drivers().contains(&"sqlite3".to_owned()));
}

// ============================================================================
// Handle minting
// ============================================================================

#[test]
fn ids_are_unique_across_handle_spaces() {
    let (registry, _) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    let first = registry.exec(conn, "INSERT", &[Value::Int(1)]).unwrap();
    let second = registry.exec(conn, "INSERT", &[Value::Int(2)]).unwrap();

    assert_eq!(conn.raw(), 1);
    assert_eq!(first.raw(), 2);
    assert_eq!(second.raw(), 3);
    assert_eq!(registry.live_handles(HandleKind::Connection), 1);
    assert_eq!(registry.live_handles(HandleKind::Result), 2);
}

#[test]
fn driver_open_failure_surfaces_message() {
    let (registry, driver) = registry_with_recorder();
    let err = registry.open("recorder", "refuse").unwrap_err();
    assert_eq!(err, Failure::new("connection refused"));
    assert_eq!(driver.opens.load(Ordering::SeqCst), 1);
    assert_eq!(registry.live_handles(HandleKind::Connection), 0);
}

#[test]
fn exec_failure_mints_no_result() {
    let (registry, _) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    let err = registry.exec(conn, "BAD SQL", &[]).unwrap_err();
    assert_eq!(err.message(), "syntax error near \"BAD SQL\"");
    assert_eq!(registry.live_handles(HandleKind::Result), 0);
}

#[test]
fn exec_passes_params_in_order() {
    let (registry, driver) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    let params = vec![Value::Int(1), Value::from("a"), Value::Null, Value::Bytes(vec![0, 255])];
    registry.exec(conn, "INSERT INTO t VALUES (?, ?, ?, ?)", &params).unwrap();

    let log = driver.log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0, "INSERT INTO t VALUES (?, ?, ?, ?)");
    assert_eq!(log[0].1, params);
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn accessors_read_the_result_snapshot() {
    let (registry, _) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    let result = registry.exec(conn, "INSERT", &[Value::Int(1), Value::Int(2)]).unwrap();
    assert_eq!(registry.rows_affected(result), Ok(2));
    assert_eq!(registry.last_insert_id(result), Ok(1));
}

#[test]
fn accessor_failure_is_independent() {
    let (registry, _) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    let result = registry.exec(conn, "DELETE", &[]).unwrap();
    assert_eq!(registry.rows_affected(result), Ok(0));
    let err = registry.last_insert_id(result).unwrap_err();
    assert_eq!(err.message(), "unsupported: LastInsertId is not supported by this driver");
}

#[test]
fn connection_id_is_not_a_result_id() {
    let (registry, _) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    let err = registry.rows_affected(conn).unwrap_err();
    assert_eq!(err.message(), "sql: invalid result handle #1");
    let err = registry.exec(sqlbridge::HandleId::new(99), "INSERT", &[]).unwrap_err();
    assert_eq!(err.message(), "sql: invalid connection handle #99");
}

// ============================================================================
// Release
// ============================================================================

#[test]
fn release_frees_only_the_named_handle() {
    let (registry, _) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    let result = registry.exec(conn, "INSERT", &[]).unwrap();

    registry.release(HandleKind::Connection, conn).unwrap();
    assert_eq!(registry.live_handles(HandleKind::Connection), 0);
    // results outlive the connection that produced them
    assert_eq!(registry.rows_affected(result), Ok(0));
}

#[test]
fn double_release_is_reported_not_fatal() {
    let (registry, _) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    registry.release(HandleKind::Connection, conn).unwrap();
    assert_eq!(
        registry.release(HandleKind::Connection, conn),
        Err(ReleaseError::Unknown {
            kind: HandleKind::Connection,
            id: conn,
        })
    );
}

#[test]
fn wrong_kind_release_leaves_handle_alive() {
    let (registry, _) = registry_with_recorder();
    let conn = registry.open("recorder", "dsn").unwrap();
    assert!(registry.release(HandleKind::Result, conn).is_err());
    assert_eq!(registry.live_handles(HandleKind::Connection), 1);
    assert!(registry.exec(conn, "INSERT", &[]).is_ok());
}

#[test]
fn released_ids_are_not_reused_immediately() {
    let (registry, _) = registry_with_recorder();
    let first = registry.open("recorder", "dsn").unwrap();
    registry.release(HandleKind::Connection, first).unwrap();
    let second = registry.open("recorder", "dsn").unwrap();
    assert_ne!(first, second);
}

#[test]
fn concurrent_exec_and_release() {
    let (registry, _) = registry_with_recorder();
    let registry = Arc::new(registry);
    let conn = registry.open("recorder", "dsn").unwrap();

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let result = registry.exec(conn, "INSERT", &[Value::Int(i)]).unwrap();
                    registry.release(HandleKind::Result, result).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(registry.live_handles(HandleKind::Result), 0);
    assert_eq!(registry.live_handles(HandleKind::Connection), 1);
}
