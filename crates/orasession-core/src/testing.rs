//! Scriptable in-memory driver for exercising session code without a server
//!
//! Enabled by the `testing` feature. Every outcome is queued up front: an
//! unscripted connect, execute or release succeeds.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    Connection, ConnectionParams, DatabaseDriver, DriverError, DriverResult, QueryResult, Value,
};

/// One statement as the mock server saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedStatement {
    /// Id of the connection it ran on; connections are numbered from 1
    pub connection: u32,
    pub sql: String,
    pub param_count: usize,
}

/// Counters and scripted outcomes shared by a driver and its connections
#[derive(Default)]
pub struct MockState {
    connect_calls: AtomicU32,
    execute_calls: AtomicU32,
    release_calls: AtomicU32,
    /// `None` lets a connect through, `Some` fails it
    connect_script: Mutex<VecDeque<Option<String>>>,
    execute_script: Mutex<VecDeque<std::result::Result<QueryResult, String>>>,
    release_failures: Mutex<VecDeque<String>>,
    connect_delay: Mutex<Option<Duration>>,
    execute_delay: Mutex<Option<Duration>>,
    last_params: Mutex<Option<ConnectionParams>>,
    executed: Mutex<Vec<ExecutedStatement>>,
}

impl MockState {
    pub fn connects(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn executes(&self) -> u32 {
        self.execute_calls.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> u32 {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// Parameters passed to the most recent connect
    pub fn last_params(&self) -> Option<ConnectionParams> {
        self.last_params.lock().clone()
    }

    /// Every execute in call order
    pub fn statements(&self) -> Vec<ExecutedStatement> {
        self.executed.lock().clone()
    }

    /// Connection id of every execute in call order
    pub fn executed_on(&self) -> Vec<u32> {
        self.executed
            .lock()
            .iter()
            .map(|statement| statement.connection)
            .collect()
    }
}

/// Driver whose behaviour is scripted call by call
///
/// Clones share the same state, so a test can keep one clone for assertions
/// after handing another to a session.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<MockState> {
        self.state.clone()
    }

    /// Fail the next unscripted connect with `message`
    pub fn fail_next_connect(&self, message: &str) -> &Self {
        self.state
            .connect_script
            .lock()
            .push_back(Some(message.to_string()));
        self
    }

    /// Let the next unscripted connect succeed
    pub fn succeed_next_connect(&self) -> &Self {
        self.state.connect_script.lock().push_back(None);
        self
    }

    pub fn fail_next_execute(&self, message: &str) -> &Self {
        self.state
            .execute_script
            .lock()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn succeed_next_execute(&self, result: QueryResult) -> &Self {
        self.state.execute_script.lock().push_back(Ok(result));
        self
    }

    pub fn fail_next_release(&self, message: &str) -> &Self {
        self.state
            .release_failures
            .lock()
            .push_back(message.to_string());
        self
    }

    pub fn with_connect_delay(self, delay: Duration) -> Self {
        *self.state.connect_delay.lock() = Some(delay);
        self
    }

    pub fn with_execute_delay(self, delay: Duration) -> Self {
        *self.state.execute_delay.lock() = Some(delay);
        self
    }
}

#[async_trait]
impl DatabaseDriver for MockDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn connect(&self, params: &ConnectionParams) -> DriverResult<Arc<dyn Connection>> {
        let id = self.state.connect_calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.last_params.lock() = Some(params.clone());

        let delay = *self.state.connect_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.state.connect_script.lock().pop_front().flatten();
        match failure {
            Some(message) => Err(DriverError::new(message)),
            None => Ok(Arc::new(MockConnection {
                id,
                state: self.state.clone(),
            })),
        }
    }
}

/// Live session handed out by [`MockDriver`]
pub struct MockConnection {
    id: u32,
    state: Arc<MockState>,
}

impl MockConnection {
    pub fn id(&self) -> u32 {
        self.id
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DriverResult<QueryResult> {
        self.state.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.state.executed.lock().push(ExecutedStatement {
            connection: self.id,
            sql: sql.to_string(),
            param_count: params.len(),
        });

        let delay = *self.state.execute_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.state.execute_script.lock().pop_front();
        match outcome {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(DriverError::new(message)),
            None => Ok(QueryResult::empty()),
        }
    }

    async fn release(&self) -> DriverResult<()> {
        self.state.release_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self.state.release_failures.lock().pop_front();
        match failure {
            Some(message) => Err(DriverError::new(message)),
            None => Ok(()),
        }
    }
}

pub fn params() -> ConnectionParams {
    ConnectionParams::new("localhost:1521/XEPDB1", "scott", "tiger")
}

/// Two-row `ID`/`NAME` result
pub fn people() -> QueryResult {
    QueryResult::new(
        ["ID", "NAME"],
        vec![vec![1.into(), "JOHN".into()], vec![2.into(), "JARYN".into()]],
    )
}
