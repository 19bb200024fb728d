//! On-chain ledger record subsystem.
//!
//! # Lifecycle
//! ```text
//! (absent) ──submit──▶ pending ──callback──▶ submitted | confirmed | failed
//!                        ▲                              │
//!                        └──────── resubmit ────────────┘
//! ```
//!
//! # Invariants
//! - At most one record per emission (unique-key upsert)
//! - A transaction hash never belongs to two emissions
//! - Records are never deleted

pub mod store;
pub mod types;

pub use store::{LedgerStore, SqliteLedgerStore};
pub use types::{
    CallbackStatus, LedgerStatus, OnChainLedgerRecord, Reconciliation, StoreError, StoreResult,
    UnknownStatus,
};
