//! Carbon emission chain bridge library.
//!
//! Submits locally recorded emissions to an external chain service and
//! reconciles the asynchronous status callbacks it sends back.

pub mod chain;
pub mod config;
pub mod emissions;
pub mod http;
pub mod ledger;
pub mod lifecycle;
pub mod observability;
pub mod onchain;
pub mod storage;

pub use config::BridgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
