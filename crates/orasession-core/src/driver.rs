//! Database driver trait definition

use crate::{Connection, ConnectionParams, DriverResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Driver that opens sessions against a database server
///
/// Parameters are handed over verbatim; the driver owns transport,
/// authentication and its own timeouts.
#[async_trait]
pub trait DatabaseDriver: Send + Sync + 'static {
    /// Human-readable name (e.g., "Oracle")
    fn name(&self) -> &'static str;

    /// Open a new session
    async fn connect(&self, params: &ConnectionParams) -> DriverResult<Arc<dyn Connection>>;
}

#[async_trait]
impl<T: DatabaseDriver> DatabaseDriver for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn connect(&self, params: &ConnectionParams) -> DriverResult<Arc<dyn Connection>> {
        (**self).connect(params).await
    }
}
