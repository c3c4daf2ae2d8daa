//! Session facade tying the gate, executor and projector together

use std::sync::Arc;

use orasession_core::{
    Connection, ConnectionParams, DEFAULT_PING_QUERY, DatabaseDriver, QueryResult, Record, Result,
    RowProjector, SessionConfig, Value,
};
use uuid::Uuid;

use crate::classifier::SessionLostClassifier;
use crate::executor::QueryExecutor;
use crate::gate::ConnectionGate;
use crate::health::{self, HealthStatus, HealthThresholds, PingReport};
use crate::registry::ConnectionRegistry;
use crate::stats::{AtomicSessionStats, SessionStats};

/// One logical database target with auto-connect and auto-reconnect
///
/// Holds at most one live connection. Queries connect on first use, and a
/// query that finds its session dropped by the server is transparently
/// retried once on a new connection.
///
/// # Example
///
/// ```ignore
/// use orasession_connection::OracleSession;
/// use orasession_core::ConnectionParams;
///
/// let session = OracleSession::new(driver);
/// session.configure(ConnectionParams::new("db:1521/ORCLPDB1", "scott", "tiger"));
///
/// let result = session.query("SELECT id, name FROM people WHERE id = :1", &[1.into()]).await?;
/// let records = OracleSession::project_to_records(&result)?;
/// ```
pub struct OracleSession {
    id: Uuid,
    name: String,
    executor: QueryExecutor,
    stats: Arc<AtomicSessionStats>,
    ping_query: String,
    health_thresholds: HealthThresholds,
}

impl OracleSession {
    /// Create an unconfigured session with the default session-lost codes
    pub fn new<D: DatabaseDriver>(driver: D) -> Self {
        Self::build(
            Arc::new(driver),
            "default".to_string(),
            ConnectionRegistry::new(),
            SessionLostClassifier::default(),
            DEFAULT_PING_QUERY.to_string(),
        )
    }

    /// Create a session from a loaded configuration
    ///
    /// Fails with `Configuration` when a session-lost code is malformed.
    pub fn from_config(driver: Arc<dyn DatabaseDriver>, config: SessionConfig) -> Result<Self> {
        let classifier = SessionLostClassifier::new(&config.session_lost_codes)?;
        Ok(Self::build(
            driver,
            config.name,
            ConnectionRegistry::with_params(config.params),
            classifier,
            config.ping_query,
        ))
    }

    fn build(
        driver: Arc<dyn DatabaseDriver>,
        name: String,
        registry: ConnectionRegistry,
        classifier: SessionLostClassifier,
        ping_query: String,
    ) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, session = %name, driver = driver.name(), "creating session");

        let stats = Arc::new(AtomicSessionStats::default());
        let gate = Arc::new(ConnectionGate::with_registry(
            driver,
            registry,
            stats.clone(),
        ));
        Self {
            id,
            name,
            executor: QueryExecutor::with_stats(gate, classifier, stats.clone()),
            stats,
            ping_query,
            health_thresholds: HealthThresholds::default(),
        }
    }

    /// Latency bounds used to classify [`OracleSession::ping`] results
    pub fn with_health_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.health_thresholds = thresholds;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the parameters used by every future connect
    ///
    /// An open connection keeps running on the old parameters until it is
    /// released.
    pub fn configure(&self, params: ConnectionParams) {
        self.executor.gate().configure(params);
    }

    /// Open the connection now instead of on first query
    ///
    /// Returns the existing handle when already connected.
    #[tracing::instrument(skip(self), fields(session_id = %self.id, session = %self.name))]
    pub async fn connect(&self) -> Result<Arc<dyn Connection>> {
        self.executor.gate().acquire().await
    }

    /// Release the connection; a no-op when not connected
    #[tracing::instrument(skip(self), fields(session_id = %self.id, session = %self.name))]
    pub async fn disconnect(&self) -> Result<()> {
        tracing::info!("disconnecting session");
        self.executor.gate().release().await
    }

    /// Run a query with auto-connect and at most one reconnect
    #[tracing::instrument(
        skip(self, params),
        fields(session_id = %self.id, session = %self.name, param_count = params.len())
    )]
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.executor.run(sql, params).await
    }

    /// Run a query and project its rows into records
    pub async fn query_records(&self, sql: &str, params: &[Value]) -> Result<Vec<Record>> {
        let result = self.query(sql, params).await?;
        Self::project_to_records(&result)
    }

    /// Turn a raw result into one keyed record per row
    pub fn project_to_records(result: &QueryResult) -> Result<Vec<Record>> {
        RowProjector::project(result)
    }

    /// Run the configured ping query and classify its round-trip time
    #[tracing::instrument(skip(self), fields(session_id = %self.id, session = %self.name))]
    pub async fn ping(&self) -> Result<PingReport> {
        health::ping(&self.executor, &self.ping_query, &self.health_thresholds).await
    }

    /// Ping and reduce the outcome to a status; a failed ping is `Unhealthy`
    pub async fn health(&self) -> HealthStatus {
        match self.ping().await {
            Ok(report) => report.status,
            Err(err) => {
                tracing::warn!(session_id = %self.id, error = %err, "health check failed");
                HealthStatus::Unhealthy
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.executor.gate().is_connected()
    }

    pub fn is_connecting(&self) -> bool {
        self.executor.gate().is_connecting()
    }

    pub fn params(&self) -> Option<ConnectionParams> {
        self.executor.gate().params()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.snapshot()
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }
}

impl std::fmt::Debug for OracleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleSession")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("executor", &self.executor)
            .finish()
    }
}
