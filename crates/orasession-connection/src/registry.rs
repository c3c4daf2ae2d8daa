//! In-memory holder for connection parameters and the live handle

use std::sync::Arc;

use orasession_core::{Connection, ConnectionParams};

/// Current connection parameters and the registered session handle
///
/// Pure state, no I/O. Lives inside [`ConnectionGate`](crate::ConnectionGate),
/// which is the only writer of the handle.
#[derive(Default)]
pub struct ConnectionRegistry {
    params: Option<ConnectionParams>,
    handle: Option<Arc<dyn Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: ConnectionParams) -> Self {
        Self {
            params: Some(params),
            handle: None,
        }
    }

    /// Replace the parameters used by future connect calls
    ///
    /// An already registered handle is left untouched.
    pub fn configure(&mut self, params: ConnectionParams) {
        self.params = Some(params);
    }

    pub fn params(&self) -> Option<&ConnectionParams> {
        self.params.as_ref()
    }

    /// The registered handle, if any
    pub fn current(&self) -> Option<Arc<dyn Connection>> {
        self.handle.clone()
    }

    /// Check whether `handle` is the registered one
    pub fn is_current(&self, handle: &Arc<dyn Connection>) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    /// Swap the registered handle, returning the previous one
    pub(crate) fn set_handle(
        &mut self,
        handle: Option<Arc<dyn Connection>>,
    ) -> Option<Arc<dyn Connection>> {
        std::mem::replace(&mut self.handle, handle)
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("params", &self.params)
            .field("connected", &self.handle.is_some())
            .finish()
    }
}
