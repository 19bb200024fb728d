//! Durable ledger record store backed by `SQLite`.
//!
//! # Schema
//!
//! The `emissions_onchain` table has columns: `id`, `emission_id` (unique),
//! `status`, `tx_hash` (unique, nullable), `error_msg`, `created_at`,
//! `updated_at`.
//!
//! Every mutation is a single statement keyed on a unique column, so
//! concurrent submissions and callbacks for the same emission never produce
//! a second row or a torn read-modify-write.

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::ledger::types::{
    LedgerStatus, OnChainLedgerRecord, Reconciliation, StoreResult,
};
use crate::storage::{self, SharedConnection};

/// Keyed storage for one on-chain status record per emission.
pub trait LedgerStore: Send + Sync {
    /// Create the record as `pending`, or reset an existing one to `pending`
    /// and clear its diagnostic, whatever its previous status.
    fn upsert_pending(&self, emission_id: i64) -> StoreResult<()>;

    /// Read the record for an emission.
    fn get_status(&self, emission_id: i64) -> StoreResult<Option<OnChainLedgerRecord>>;

    /// Apply a callback status change to an existing record.
    ///
    /// Matches on `tx_hash` first; when that changes nothing (or no hash was
    /// given) falls back to `emission_id`, also storing the hash if one was
    /// supplied. Returns the number of rows changed and never inserts.
    fn reconcile(&self, update: &Reconciliation) -> StoreResult<usize>;
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS emissions_onchain (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        emission_id INTEGER NOT NULL UNIQUE,
        status      TEXT    NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'submitted', 'confirmed', 'failed')),
        tx_hash     TEXT    UNIQUE,
        error_msg   TEXT,
        created_at  TEXT    NOT NULL,
        updated_at  TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_emissions_onchain_status ON emissions_onchain (status);
    CREATE INDEX IF NOT EXISTS idx_emissions_onchain_updated_at ON emissions_onchain (updated_at);
";

/// [`LedgerStore`] over the `emissions_onchain` table.
#[derive(Debug, Clone)]
pub struct SqliteLedgerStore {
    conn: SharedConnection,
}

impl SqliteLedgerStore {
    /// Wrap a shared connection, creating the table if needed.
    pub fn new(conn: SharedConnection) -> StoreResult<Self> {
        let store = Self { conn };
        store.bootstrap()?;
        Ok(store)
    }

    fn bootstrap(&self) -> StoreResult<()> {
        let conn = storage::lock(&self.conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<OnChainLedgerRecord> {
        let status: String = row.get(2)?;
        let status = status
            .parse::<LedgerStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

        Ok(OnChainLedgerRecord {
            id: row.get(0)?,
            emission_id: row.get(1)?,
            status,
            tx_hash: row.get(3)?,
            error_msg: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn reconcile_in(conn: &mut Connection, update: &Reconciliation) -> StoreResult<usize> {
        let now = Utc::now();
        let status = update.status.as_str();
        let tx = conn.transaction()?;

        let mut affected = 0;
        if let Some(tx_hash) = &update.tx_hash {
            affected = tx.execute(
                "UPDATE emissions_onchain
                 SET status = ?1, error_msg = ?2, updated_at = ?3
                 WHERE tx_hash = ?4",
                params![status, update.error_msg, now, tx_hash],
            )?;
        }

        if affected == 0 {
            if let Some(emission_id) = update.emission_id {
                affected = tx.execute(
                    "UPDATE emissions_onchain
                     SET tx_hash = COALESCE(?1, tx_hash), status = ?2, error_msg = ?3, updated_at = ?4
                     WHERE emission_id = ?5",
                    params![update.tx_hash, status, update.error_msg, now, emission_id],
                )?;
            }
        }

        tx.commit()?;
        Ok(affected)
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn upsert_pending(&self, emission_id: i64) -> StoreResult<()> {
        let conn = storage::lock(&self.conn)?;
        conn.execute(
            "INSERT INTO emissions_onchain (emission_id, status, created_at, updated_at)
             VALUES (?1, 'pending', ?2, ?2)
             ON CONFLICT (emission_id) DO UPDATE SET
                 status = 'pending',
                 error_msg = NULL,
                 updated_at = excluded.updated_at",
            params![emission_id, Utc::now()],
        )?;
        Ok(())
    }

    fn get_status(&self, emission_id: i64) -> StoreResult<Option<OnChainLedgerRecord>> {
        let conn = storage::lock(&self.conn)?;
        let record = conn
            .query_row(
                "SELECT id, emission_id, status, tx_hash, error_msg, created_at, updated_at
                 FROM emissions_onchain
                 WHERE emission_id = ?1",
                params![emission_id],
                Self::map_row,
            )
            .optional()?;
        Ok(record)
    }

    fn reconcile(&self, update: &Reconciliation) -> StoreResult<usize> {
        let mut conn = storage::lock(&self.conn)?;
        Self::reconcile_in(&mut conn, update)
    }
}
