//! Connection parameters and session configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::Result;

/// ORA codes that mean the server no longer knows our session
///
/// - ORA-03113: end-of-file on communication channel
/// - ORA-03114: not connected to ORACLE
/// - ORA-03135: connection lost contact
/// - ORA-02396: exceeded maximum idle time, please connect again
/// - ORA-01012: not logged on
pub const DEFAULT_SESSION_LOST_CODES: &[&str] = &["03113", "03114", "03135", "02396", "01012"];

/// Lightweight query used by health pings
pub const DEFAULT_PING_QUERY: &str = "SELECT 1 FROM DUAL";

/// Endpoint and credentials handed to the driver on every connect
///
/// Stored verbatim; this crate never interprets the fields.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Easy Connect string or TNS alias (e.g. `db.example.com:1521/ORCLPDB1`)
    pub connect_string: String,
    pub user: String,
    pub password: String,
    /// Extra driver properties passed through unchanged
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
}

impl ConnectionParams {
    pub fn new(
        connect_string: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            connect_string: connect_string.into(),
            user: user.into(),
            password: password.into(),
            properties: HashMap::new(),
        }
    }

    /// Add a driver property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.properties.keys().collect();
        keys.sort();
        f.debug_struct("ConnectionParams")
            .field("connect_string", &self.connect_string)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("properties", &keys)
            .finish()
    }
}

/// Configuration for one logical database target
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Display name used in logs
    #[serde(default = "default_name")]
    pub name: String,

    pub params: ConnectionParams,

    /// ORA codes (digits only) treated as a lost session
    #[serde(default = "default_session_lost_codes")]
    pub session_lost_codes: Vec<String>,

    #[serde(default = "default_ping_query")]
    pub ping_query: String,
}

fn default_name() -> String {
    "default".to_string()
}

fn default_session_lost_codes() -> Vec<String> {
    DEFAULT_SESSION_LOST_CODES
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_ping_query() -> String {
    DEFAULT_PING_QUERY.to_string()
}

impl SessionConfig {
    pub fn new(params: ConnectionParams) -> Self {
        Self {
            name: default_name(),
            params,
            session_lost_codes: default_session_lost_codes(),
            ping_query: default_ping_query(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_session_lost_codes<S: Into<String>>(
        mut self,
        codes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.session_lost_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ping_query(mut self, query: impl Into<String>) -> Self {
        self.ping_query = query.into();
        self
    }

    /// Parse a configuration from TOML
    ///
    /// ```
    /// use orasession_core::SessionConfig;
    ///
    /// let config = SessionConfig::from_toml_str(r#"
    ///     name = "billing"
    ///
    ///     [params]
    ///     connect_string = "localhost:1521/XEPDB1"
    ///     user = "scott"
    ///     password = "tiger"
    /// "#).unwrap();
    /// assert_eq!(config.name, "billing");
    /// assert_eq!(config.session_lost_codes.len(), 5);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content)?;
        tracing::debug!(
            name = %config.name,
            connect_string = %config.params.connect_string,
            "session config parsed"
        );
        Ok(config)
    }

    /// Load a configuration from a TOML file
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&content)
    }
}
