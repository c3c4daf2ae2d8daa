//! Connection trait implemented by database drivers

use crate::{DriverResult, QueryResult, Value};
use async_trait::async_trait;

/// A live database session returned by [`DatabaseDriver::connect`]
///
/// [`DatabaseDriver::connect`]: crate::DatabaseDriver::connect
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "oracle")
    fn driver_name(&self) -> &str;

    /// Execute a statement with positional bind parameters
    ///
    /// Both queries and DML go through this call; DML yields a result with
    /// no columns and `affected_rows` set.
    async fn execute(&self, sql: &str, params: &[Value]) -> DriverResult<QueryResult>;

    /// Release the session back to the server
    ///
    /// The handle must not be used afterwards.
    async fn release(&self) -> DriverResult<()>;
}
