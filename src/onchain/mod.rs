//! Submission and status reconciliation.
//!
//! # Data Flow
//! ```text
//! POST /onchain/emissions/{id}
//!     → submission.rs (emission → payload → pending row → chain client)
//!
//! PUT /onchain/callback
//!     → callback.rs (secret → body validation → ledger reconcile)
//! ```
//!
//! Both entry points may run concurrently for the same emission; all
//! coordination happens in the ledger store's atomic statements.

pub mod callback;
pub mod error;
pub mod submission;

pub use callback::{CallbackReceipt, CallbackReceiver, CHAIN_SECRET_HEADER};
pub use error::OnchainError;
pub use submission::{SubmissionAccepted, SubmissionOrchestrator};
