//! Session ping

use std::time::{Duration, Instant};

use orasession_core::Result;
use serde::Serialize;

use super::status::{HealthStatus, HealthThresholds};
use crate::executor::QueryExecutor;

/// Round-trip time of a successful ping and what it says about the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PingReport {
    pub latency: Duration,
    pub status: HealthStatus,
}

/// Run `query` through `executor` and classify the round trip
///
/// The query takes the normal path, so a ping also connects or reconnects
/// the session. Failures carry the same error taxonomy as any other query.
pub async fn ping(
    executor: &QueryExecutor,
    query: &str,
    thresholds: &HealthThresholds,
) -> Result<PingReport> {
    let start = Instant::now();
    executor.run(query, &[]).await?;
    let latency = start.elapsed();
    let status = thresholds.classify(latency);

    tracing::debug!(latency_ms = latency.as_millis() as u64, ?status, "ping succeeded");
    Ok(PingReport { latency, status })
}
