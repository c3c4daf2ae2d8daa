//! Query execution with at-most-once reconnect
//!
//! A query that fails because the server dropped the session is retried
//! once on a fresh connection. Any other failure, or a second session loss,
//! releases the connection and surfaces as [`SessionError::QueryFailed`].

use std::sync::Arc;

use async_recursion::async_recursion;
use orasession_core::{QueryResult, Result, SessionError, Value};

use crate::classifier::SessionLostClassifier;
use crate::gate::ConnectionGate;
use crate::stats::AtomicSessionStats;


/// Runs queries through a [`ConnectionGate`]
pub struct QueryExecutor {
    gate: Arc<ConnectionGate>,
    classifier: SessionLostClassifier,
    stats: Arc<AtomicSessionStats>,
}

impl QueryExecutor {
    pub fn new(gate: Arc<ConnectionGate>, classifier: SessionLostClassifier) -> Self {
        Self::with_stats(gate, classifier, Arc::default())
    }

    pub(crate) fn with_stats(
        gate: Arc<ConnectionGate>,
        classifier: SessionLostClassifier,
        stats: Arc<AtomicSessionStats>,
    ) -> Self {
        Self {
            gate,
            classifier,
            stats,
        }
    }

    pub fn gate(&self) -> &Arc<ConnectionGate> {
        &self.gate
    }

    pub fn classifier(&self) -> &SessionLostClassifier {
        &self.classifier
    }

    /// Run a query, connecting first if needed
    pub async fn run(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.run_attempt(sql, params, false).await
    }

    /// Run a query; `is_retry` marks the single reconnect attempt
    ///
    /// Connection failures propagate unchanged. On session loss during a
    /// first attempt the stale handle is released and the query re-run with
    /// `is_retry = true`, whose outcome becomes this call's outcome.
    #[async_recursion]
    pub async fn run_attempt(
        &self,
        sql: &str,
        params: &[Value],
        is_retry: bool,
    ) -> Result<QueryResult> {
        let handle = self.gate.acquire().await?;

        let err = match handle.execute(sql, params).await {
            Ok(result) => {
                self.stats.record_query_success();
                return Ok(result);
            }
            Err(err) => err,
        };

        let session_lost = self.classifier.is_session_lost(&err.message);

        if session_lost && !is_retry {
            tracing::warn!(error = %err, "connection lost, reconnecting");
            if let Err(release_err) = self.gate.release_if_current(&handle).await {
                tracing::debug!(error = %release_err, "ignoring release failure before retry");
            }
            self.stats.record_reconnect();
            return self.run_attempt(sql, params, true).await;
        }

        if session_lost {
            tracing::error!(error = %err, "connection lost again after reconnect");
        } else {
            tracing::error!(error = %err, is_retry, "query failed");
        }

        // the handle is presumed unusable after any failure
        if let Err(release_err) = self.gate.release_if_current(&handle).await {
            tracing::debug!(error = %release_err, "ignoring release failure after query error");
        }
        self.stats.record_query_failure();
        Err(SessionError::QueryFailed(err.message))
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("gate", &self.gate)
            .field("session_lost_codes", &self.classifier.codes())
            .finish()
    }
}
