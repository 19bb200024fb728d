//! Chain service integration subsystem.
//!
//! # Data Flow
//! ```text
//! EmissionRecord
//!     → payload.rs (canonical projection)
//!     → client.rs (POST /send with connect/read timeouts)
//!     → types.rs (ChainResponse | ChainError)
//! ```
//!
//! # Constraints
//! - The bridge never broadcasts or verifies transactions itself
//! - Every outbound call has a deadline
//! - Failures are returned, never retried here

pub mod client;
pub mod payload;
pub mod types;

pub use client::ChainClient;
pub use payload::ChainPayload;
pub use types::{ChainError, ChainResponse, ChainResult};
