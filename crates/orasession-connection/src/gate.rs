//! Single-flight coordination of connection attempts
//!
//! The gate owns the [`ConnectionRegistry`] and the in-flight attempt slot
//! behind one lock. Concurrent callers of [`ConnectionGate::acquire`] that
//! find no registered handle all await the same shared connect future, so
//! the driver sees exactly one physical connect per attempt.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use orasession_core::{Connection, ConnectionParams, DatabaseDriver, Result, SessionError};
use parking_lot::Mutex;

use crate::registry::ConnectionRegistry;
use crate::stats::AtomicSessionStats;


type ConnectFuture = Shared<BoxFuture<'static, Result<Arc<dyn Connection>>>>;

/// The outstanding connect attempt, tagged with the generation that started it
struct InFlight {
    generation: u64,
    future: ConnectFuture,
}

struct GateState {
    registry: ConnectionRegistry,
    in_flight: Option<InFlight>,
    /// Bumped on every new attempt and every release; an attempt whose
    /// generation no longer matches the slot has been superseded.
    generation: u64,
}

/// Coordination point for the one shared connection of a session
pub struct ConnectionGate {
    driver: Arc<dyn DatabaseDriver>,
    state: Arc<Mutex<GateState>>,
    stats: Arc<AtomicSessionStats>,
}

impl ConnectionGate {
    /// Create a gate with no parameters configured yet
    pub fn new(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self::with_registry(driver, ConnectionRegistry::new(), Arc::default())
    }

    pub(crate) fn with_registry(
        driver: Arc<dyn DatabaseDriver>,
        registry: ConnectionRegistry,
        stats: Arc<AtomicSessionStats>,
    ) -> Self {
        Self {
            driver,
            state: Arc::new(Mutex::new(GateState {
                registry,
                in_flight: None,
                generation: 0,
            })),
            stats,
        }
    }

    /// Store parameters for future connect calls
    pub fn configure(&self, params: ConnectionParams) {
        tracing::debug!(
            connect_string = %params.connect_string,
            user = %params.user,
            "connection parameters configured"
        );
        self.state.lock().registry.configure(params);
    }

    /// Snapshot of the configured parameters
    pub fn params(&self) -> Option<ConnectionParams> {
        self.state.lock().registry.params().cloned()
    }

    /// The registered handle, without connecting
    pub fn current(&self) -> Option<Arc<dyn Connection>> {
        self.state.lock().registry.current()
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().registry.current().is_some()
    }

    /// Check whether a connect attempt is outstanding
    pub fn is_connecting(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Get the registered handle, connecting if necessary
    ///
    /// Joins an outstanding attempt instead of starting a second one. A
    /// failed attempt surfaces as [`SessionError::ConnectionFailed`] to every
    /// caller that joined it.
    pub async fn acquire(&self) -> Result<Arc<dyn Connection>> {
        let attempt = {
            let mut state = self.state.lock();

            if let Some(handle) = state.registry.current() {
                return Ok(handle);
            }

            let joined = state
                .in_flight
                .as_ref()
                .map(|in_flight| (in_flight.generation, in_flight.future.clone()));

            match joined {
                Some((generation, future)) => {
                    tracing::debug!(generation, "joining in-flight connection attempt");
                    future
                }
                None => {
                    let params = state.registry.params().cloned().ok_or_else(|| {
                        SessionError::ConnectionFailed(
                            "connection parameters not configured".into(),
                        )
                    })?;

                    state.generation += 1;
                    let generation = state.generation;
                    let future = connect_attempt(
                        self.driver.clone(),
                        self.state.clone(),
                        self.stats.clone(),
                        params,
                        generation,
                    )
                    .boxed()
                    .shared();

                    state.in_flight = Some(InFlight {
                        generation,
                        future: future.clone(),
                    });
                    future
                }
            }
        };

        attempt.await
    }

    /// Tear down the registered handle and forget any outstanding attempt
    ///
    /// Local state is always reset, even when the driver fails to release;
    /// that failure is logged and returned as
    /// [`SessionError::DisconnectFailed`]. No-op when nothing is held.
    pub async fn release(&self) -> Result<()> {
        let handle = {
            let mut state = self.state.lock();
            if let Some(in_flight) = state.in_flight.take() {
                tracing::debug!(
                    generation = in_flight.generation,
                    "abandoning in-flight connection attempt"
                );
            }
            state.generation += 1;
            state.registry.set_handle(None)
        };

        match handle {
            Some(handle) => release_handle(handle).await,
            None => {
                tracing::debug!("release requested while disconnected");
                Ok(())
            }
        }
    }

    /// Release `handle` only if it is still the registered one
    ///
    /// A caller holding a stale handle must not tear down a connection that
    /// somebody else has already re-established.
    pub async fn release_if_current(&self, handle: &Arc<dyn Connection>) -> Result<()> {
        let registered = {
            let mut state = self.state.lock();
            if state.registry.is_current(handle) {
                state.generation += 1;
                state.registry.set_handle(None)
            } else {
                None
            }
        };

        match registered {
            Some(handle) => release_handle(handle).await,
            None => {
                tracing::debug!("handle already replaced, skipping release");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for ConnectionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConnectionGate")
            .field("driver", &self.driver.name())
            .field("registry", &state.registry)
            .field("connecting", &state.in_flight.is_some())
            .finish()
    }
}

/// One physical connect call and the state transition that follows it
///
/// The slot is cleared and the handle registered under the gate lock before
/// the shared future resolves, so no waiter can observe the outcome while
/// the slot still points at this attempt.
async fn connect_attempt(
    driver: Arc<dyn DatabaseDriver>,
    state: Arc<Mutex<GateState>>,
    stats: Arc<AtomicSessionStats>,
    params: ConnectionParams,
    generation: u64,
) -> Result<Arc<dyn Connection>> {
    stats.record_connect_attempt();
    tracing::info!(
        driver = driver.name(),
        connect_string = %params.connect_string,
        user = %params.user,
        generation,
        "connecting"
    );

    let outcome = driver.connect(&params).await;

    let superseded = {
        let mut state = state.lock();
        let owns_slot = state
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == generation);

        if owns_slot {
            state.in_flight = None;
            state.registry.set_handle(outcome.as_ref().ok().cloned());
        }
        !owns_slot
    };

    match outcome {
        Ok(handle) if superseded => {
            tracing::info!(generation, "connection attempt superseded by disconnect");
            if let Err(err) = handle.release().await {
                tracing::warn!(error = %err, "failed to release superseded connection");
            }
            Err(SessionError::ConnectionFailed(
                "connection attempt superseded by disconnect".into(),
            ))
        }
        Ok(handle) => {
            stats.record_connect();
            tracing::info!(generation, "connection established");
            Ok(handle)
        }
        Err(err) => {
            tracing::error!(error = %err, generation, "failed to connect");
            Err(SessionError::ConnectionFailed(err.message))
        }
    }
}

async fn release_handle(handle: Arc<dyn Connection>) -> Result<()> {
    match handle.release().await {
        Ok(()) => {
            tracing::info!("connection released");
            Ok(())
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to release connection");
            Err(SessionError::DisconnectFailed(err.message))
        }
    }
}
