//! orasession connection - session lifecycle with auto-reconnect
//!
//! This crate keeps one shared connection per logical database target:
//!
//! - `ConnectionRegistry` - Configured parameters and the live handle
//! - `ConnectionGate` - Single-flight connect, release
//! - `SessionLostClassifier` - Which driver errors mean the session is gone
//! - `QueryExecutor` - Query execution with at most one reconnect
//! - `OracleSession` - Facade exposing configure/connect/disconnect/query

mod classifier;
mod executor;
mod gate;
pub mod health;
mod registry;
mod session;
mod stats;

pub use classifier::SessionLostClassifier;
pub use executor::QueryExecutor;
pub use gate::ConnectionGate;
pub use health::{HealthStatus, HealthThresholds, PingReport};
pub use registry::ConnectionRegistry;
pub use session::OracleSession;
pub use stats::SessionStats;
