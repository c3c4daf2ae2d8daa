//! Latency-based health classification

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health of a session as judged by its last ping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Healthy,
    /// Answered, but slower than the healthy threshold
    Degraded,
    /// Too slow, or the ping failed outright
    Unhealthy,
}

impl HealthStatus {
    /// Classify latency against [`HealthThresholds::default`]
    ///
    /// ```
    /// use orasession_connection::health::HealthStatus;
    /// use std::time::Duration;
    ///
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(50)), HealthStatus::Healthy);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(200)), HealthStatus::Degraded);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_secs(1)), HealthStatus::Unhealthy);
    /// ```
    pub fn from_latency(latency: Duration) -> Self {
        HealthThresholds::default().classify(latency)
    }

    pub fn is_usable(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }
}

/// Upper latency bounds for `Healthy` and `Degraded`, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthThresholds {
    pub healthy: Duration,
    pub degraded: Duration,
}

impl HealthThresholds {
    /// `degraded_ms` is raised to `healthy_ms` when smaller
    pub fn new(healthy_ms: u64, degraded_ms: u64) -> Self {
        Self {
            healthy: Duration::from_millis(healthy_ms),
            degraded: Duration::from_millis(degraded_ms.max(healthy_ms)),
        }
    }

    pub fn classify(&self, latency: Duration) -> HealthStatus {
        if latency <= self.healthy {
            HealthStatus::Healthy
        } else if latency <= self.degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        }
    }
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self::new(100, 500)
    }
}
