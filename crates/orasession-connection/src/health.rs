//! Health checks for a session
//!
//! A ping runs a trivial query through the normal query path, so it also
//! connects or reconnects the session when needed.
//!
//! # Example
//!
//! ```ignore
//! let report = session.ping().await?;
//! if !report.status.is_usable() {
//!     tracing::warn!(latency = ?report.latency, "session is slow");
//! }
//! ```

mod ping;
mod status;


pub use ping::{PingReport, ping};
pub use status::{HealthStatus, HealthThresholds};
