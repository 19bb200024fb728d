//! Emission lookup, the bridge's only view of the emissions CRUD data.

pub mod source;
pub mod types;

pub use source::{EmissionSource, SqliteEmissionSource};
pub use types::EmissionRecord;
