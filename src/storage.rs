//! Shared SQLite connection handling.
//!
//! The emissions tables (owned by the CRUD side of the backend) and the
//! `emissions_onchain` ledger table live in the same database file, so the
//! ledger store and the emission source share one connection.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::ledger::types::{StoreError, StoreResult};

/// Connection handle shared between stores.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Open (or create) the database at `path`. `":memory:"` opens a private
/// in-memory database.
pub fn open(path: impl AsRef<Path>) -> StoreResult<SharedConnection> {
    let path = path.as_ref();
    let conn = if path == Path::new(":memory:") {
        Connection::open_in_memory()?
    } else {
        Connection::open(path)?
    };
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Open a private in-memory database.
pub fn in_memory() -> StoreResult<SharedConnection> {
    open(":memory:")
}

/// Run connection work on the blocking thread pool, so lock waits and
/// SQLite busy waits never stall an async worker.
pub async fn run_blocking<T, F>(work: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// Acquire the connection. Callers must not hold the guard across `.await`.
pub(crate) fn lock(conn: &SharedConnection) -> StoreResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| StoreError::LockPoisoned)
}
