//! Ledger record types and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum stored length of a transaction hash (`0x` + 64 hex digits).
pub const MAX_TX_HASH_LEN: usize = 66;

/// Maximum stored length of a diagnostic message.
pub const MAX_ERROR_MSG_LEN: usize = 500;

/// Submission lifecycle status of one emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    /// Intent recorded locally; the chain service may or may not have it.
    Pending,
    /// The chain service broadcast a transaction.
    Submitted,
    /// The transaction is anchored.
    Confirmed,
    /// The chain service gave up on the submission.
    Failed,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Pending => "pending",
            LedgerStatus::Submitted => "submitted",
            LedgerStatus::Confirmed => "confirmed",
            LedgerStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status string outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for LedgerStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LedgerStatus::Pending),
            "submitted" => Ok(LedgerStatus::Submitted),
            "confirmed" => Ok(LedgerStatus::Confirmed),
            "failed" => Ok(LedgerStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// The subset of statuses a chain service callback may write.
///
/// `pending` is excluded: only resubmission re-enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Submitted,
    Confirmed,
    Failed,
}

impl CallbackStatus {
    pub fn as_str(&self) -> &'static str {
        LedgerStatus::from(*self).as_str()
    }
}

impl From<CallbackStatus> for LedgerStatus {
    fn from(status: CallbackStatus) -> Self {
        match status {
            CallbackStatus::Submitted => LedgerStatus::Submitted,
            CallbackStatus::Confirmed => LedgerStatus::Confirmed,
            CallbackStatus::Failed => LedgerStatus::Failed,
        }
    }
}

impl FromStr for CallbackStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<LedgerStatus>()? {
            LedgerStatus::Submitted => Ok(CallbackStatus::Submitted),
            LedgerStatus::Confirmed => Ok(CallbackStatus::Confirmed),
            LedgerStatus::Failed => Ok(CallbackStatus::Failed),
            LedgerStatus::Pending => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for CallbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emission's on-chain status row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnChainLedgerRecord {
    pub id: i64,
    pub emission_id: i64,
    pub status: LedgerStatus,
    pub tx_hash: Option<String>,
    pub error_msg: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated status change to apply to an existing ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub tx_hash: Option<String>,
    pub emission_id: Option<i64>,
    pub status: CallbackStatus,
    pub error_msg: Option<String>,
}

/// Errors raised by the local record stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite rejected the statement or the connection failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous holder of the connection panicked.
    #[error("database connection lock poisoned")]
    LockPoisoned,

    /// The blocking task running the statement panicked or was cancelled.
    #[error("database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
