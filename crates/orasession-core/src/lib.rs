//! orasession core - shared types and traits
//!
//! This crate provides the pieces every other orasession crate depends on:
//!
//! - `DatabaseDriver` - Trait for opening sessions against a server
//! - `Connection` - Trait for a live session handle
//! - `SessionError` / `DriverError` - Error taxonomy
//! - `ConnectionParams` / `SessionConfig` - Configuration
//! - `RowProjector` - Positional rows to keyed records
//! - Common types like `Value`, `ColumnMeta`, `QueryResult`
//!
//! The `testing` feature adds a scriptable in-memory driver.

mod config;
mod connection;
mod driver;
mod error;
pub mod records;
mod types;

#[cfg(feature = "testing")]
pub mod testing;

pub use config::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use records::{Record, RowProjector, project_to_records, records_to_json};
pub use types::*;
