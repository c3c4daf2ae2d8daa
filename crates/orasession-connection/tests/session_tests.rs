//! Session lifecycle tests
//!
//! Exercise the public `OracleSession` surface against the scripted mock
//! driver: auto-connect, single-flight connect, session-loss recovery,
//! failure propagation and disconnect.

mod support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use orasession_connection::{HealthStatus, HealthThresholds, OracleSession};
use orasession_core::testing::{MockDriver, params, people};
use orasession_core::{SessionConfig, SessionError, records_to_json};
use pretty_assertions::assert_eq;
use rstest::rstest;

use support::initialize_logging;

fn session_with(driver: &MockDriver) -> OracleSession {
    initialize_logging();
    let session = OracleSession::new(driver.clone());
    session.configure(params());
    session
}

#[tokio::test]
async fn test_first_query_connects_exactly_once() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    driver.succeed_next_execute(people());
    let session = session_with(&driver);
    assert!(!session.is_connected());

    let result = session
        .query("SELECT id, name FROM people", &[])
        .await
        .context("query should auto-connect")?;

    let state = driver.state();
    assert_eq!(result, people());
    assert_eq!(state.connects(), 1);
    assert_eq!(state.executes(), 1);
    assert!(session.is_connected());
    Ok(())
}

#[tokio::test]
async fn test_connect_failure_fails_query_without_execute() {
    let driver = MockDriver::new();
    driver.fail_next_connect("ORA-01017: invalid username/password; logon denied");
    let session = session_with(&driver);

    let err = session.query("SELECT 1 FROM DUAL", &[]).await.unwrap_err();

    assert_eq!(
        err,
        SessionError::ConnectionFailed("ORA-01017: invalid username/password; logon denied".into())
    );
    assert_eq!(driver.state().executes(), 0);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_concurrent_connects_share_one_physical_connect() -> anyhow::Result<()> {
    let driver = MockDriver::new().with_connect_delay(Duration::from_millis(40));
    let session = session_with(&driver);

    let (a, b) = tokio::join!(session.connect(), session.connect());
    let (a, b) = (a?, b?);

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(driver.state().connects(), 1);
    assert!(!session.is_connecting());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_queries_share_one_physical_connect() -> anyhow::Result<()> {
    let driver = MockDriver::new().with_connect_delay(Duration::from_millis(40));
    let session = session_with(&driver);

    let (a, b, c) = tokio::join!(
        session.query("SELECT 1 FROM DUAL", &[]),
        session.query("SELECT 2 FROM DUAL", &[]),
        session.query("SELECT 3 FROM DUAL", &[])
    );
    a?;
    b?;
    c?;

    let state = driver.state();
    assert_eq!(state.connects(), 1);
    assert_eq!(state.executes(), 3);
    Ok(())
}

#[rstest]
#[case("ORA-03113: not connected")]
#[case("ORA-03114: not connected to ORACLE")]
#[case("ORA-03135: connection lost contact")]
#[case("ORA-02396: exceeded maximum idle time, please connect again")]
#[case("ORA-01012: not logged on")]
#[tokio::test]
async fn test_session_lost_is_recovered_transparently(#[case] lost: &str) {
    let driver = MockDriver::new();
    driver.fail_next_execute(lost).succeed_next_execute(people());
    let session = session_with(&driver);

    let result = session
        .query("SELECT id, name FROM people WHERE id > :1", &[0.into()])
        .await
        .unwrap();

    let state = driver.state();
    assert_eq!(result, people());
    assert_eq!(state.connects(), 2);
    assert_eq!(state.releases(), 1);
    assert_eq!(state.executed_on(), vec![1, 2]);
    assert!(state.statements().iter().all(|s| s.param_count == 1));

    let stats = session.stats();
    assert_eq!(stats.reconnects, 1);
    assert_eq!(stats.queries_succeeded, 1);
}

#[tokio::test]
async fn test_session_lost_twice_fails_after_one_retry() {
    let driver = MockDriver::new();
    driver
        .fail_next_execute("ORA-03113: not connected")
        .fail_next_execute("ORA-03113: not connected")
        .succeed_next_execute(people());
    let session = session_with(&driver);

    let err = session.query("SELECT 1 FROM DUAL", &[]).await.unwrap_err();

    assert_eq!(
        err,
        SessionError::QueryFailed("ORA-03113: not connected".into())
    );
    assert_eq!(driver.state().executes(), 2);
    assert!(!session.is_connected());
    assert_eq!(session.stats().queries_failed, 1);
}

#[tokio::test]
async fn test_other_error_releases_and_fails_immediately() {
    let driver = MockDriver::new();
    driver.fail_next_execute("ORA-00001: unique constraint violated");
    let session = session_with(&driver);

    let err = session
        .query("INSERT INTO people (id) VALUES (:1)", &[1.into()])
        .await
        .unwrap_err();

    let state = driver.state();
    assert_eq!(
        err,
        SessionError::QueryFailed("ORA-00001: unique constraint violated".into())
    );
    assert_eq!(state.executes(), 1);
    assert_eq!(state.releases(), 1);
    assert!(!session.is_connected());

    // next query reconnects on demand
    session.query("SELECT 1 FROM DUAL", &[]).await.unwrap();
    assert_eq!(state.connects(), 2);
}

#[tokio::test]
async fn test_project_to_records() -> anyhow::Result<()> {
    let records = OracleSession::project_to_records(&people())?;

    assert_eq!(
        records_to_json(&records),
        serde_json::json!([
            {"ID": 1, "NAME": "JOHN"},
            {"ID": 2, "NAME": "JARYN"}
        ])
    );
    Ok(())
}

#[tokio::test]
async fn test_query_records() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    driver.succeed_next_execute(people());
    let session = session_with(&driver);

    let records = session.query_records("SELECT id, name FROM people", &[]).await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["NAME"].as_str(), Some("JOHN"));
    Ok(())
}

#[tokio::test]
async fn test_disconnect_when_disconnected_is_noop() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let session = session_with(&driver);

    session.disconnect().await?;
    session.disconnect().await?;

    assert_eq!(driver.state().releases(), 0);
    assert!(!session.is_connected());
    assert!(!session.is_connecting());
    Ok(())
}

#[tokio::test]
async fn test_disconnect_releases_and_next_query_reconnects() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let session = session_with(&driver);
    session.connect().await?;

    session.disconnect().await?;
    assert_eq!(driver.state().releases(), 1);
    assert!(!session.is_connected());

    session.query("SELECT 1 FROM DUAL", &[]).await?;
    assert_eq!(driver.state().connects(), 2);
    Ok(())
}

#[tokio::test]
async fn test_disconnect_failure_resets_state() {
    let driver = MockDriver::new();
    driver.fail_next_release("ORA-03135: connection lost contact");
    let session = session_with(&driver);
    session.connect().await.unwrap();

    let err = session.disconnect().await.unwrap_err();

    assert_eq!(
        err,
        SessionError::DisconnectFailed("ORA-03135: connection lost contact".into())
    );
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_unconfigured_session_fails_to_connect() {
    initialize_logging();
    let driver = MockDriver::new();
    let session = OracleSession::new(driver.clone());

    let err = session.connect().await.err();

    assert!(matches!(err, Some(SessionError::ConnectionFailed(_))));
    assert_eq!(driver.state().connects(), 0);
}

#[tokio::test]
async fn test_reconfigure_applies_after_disconnect() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let session = session_with(&driver);
    session.connect().await?;

    let mut other = params();
    other.user = "hr".into();
    session.configure(other);
    assert_eq!(driver.state().connects(), 1);
    assert_eq!(session.params().map(|p| p.user), Some("hr".to_string()));

    session.disconnect().await?;
    session.connect().await?;
    assert_eq!(driver.state().connects(), 2);
    assert_eq!(driver.state().last_params().map(|p| p.user), Some("hr".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_from_config_uses_custom_codes() -> anyhow::Result<()> {
    initialize_logging();
    let config = SessionConfig::from_toml_str(
        r#"
        name = "reporting"
        session_lost_codes = ["28547"]

        [params]
        connect_string = "localhost:1521/FREEPDB1"
        user = "hr"
        password = "hr"
        "#,
    )?;
    let driver = MockDriver::new();
    driver
        .fail_next_execute("ORA-28547: connection to server failed")
        .fail_next_execute("ORA-03114: not connected to ORACLE");
    let session = OracleSession::from_config(Arc::new(driver.clone()), config)?;
    assert_eq!(session.name(), "reporting");

    let err = session.query("SELECT 1 FROM DUAL", &[]).await.unwrap_err();

    // 28547 triggered the retry; 03114 is not a marker for this session
    assert_eq!(
        err,
        SessionError::QueryFailed("ORA-03114: not connected to ORACLE".into())
    );
    assert_eq!(driver.state().executes(), 2);
    Ok(())
}

#[tokio::test]
async fn test_from_config_rejects_bad_codes() {
    let config = SessionConfig::new(params()).with_session_lost_codes(["ORA-03114"]);
    let err = OracleSession::from_config(Arc::new(MockDriver::new()), config).unwrap_err();
    assert!(matches!(err, SessionError::Configuration(_)));
}

#[tokio::test]
async fn test_ping_uses_configured_query() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let config = SessionConfig::new(params()).with_ping_query("SELECT 'ok' FROM DUAL");
    let session = OracleSession::from_config(Arc::new(driver.clone()), config)?;

    let report = session.ping().await?;

    assert!(report.status.is_usable());
    assert_eq!(driver.state().statements()[0].sql, "SELECT 'ok' FROM DUAL");
    Ok(())
}

#[tokio::test]
async fn test_health_classifies_slow_ping() {
    let driver = MockDriver::new().with_execute_delay(Duration::from_millis(30));
    let session = session_with(&driver).with_health_thresholds(HealthThresholds::new(5, 10_000));

    assert_eq!(session.health().await, HealthStatus::Degraded);
}

#[tokio::test]
async fn test_health_is_unhealthy_when_ping_fails() {
    let driver = MockDriver::new();
    driver.fail_next_connect("ORA-12541: TNS:no listener");
    let session = session_with(&driver);

    assert_eq!(session.health().await, HealthStatus::Unhealthy);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_independent_sessions_do_not_share_state() -> anyhow::Result<()> {
    let first = MockDriver::new();
    let second = MockDriver::new();
    let a = session_with(&first);
    let b = session_with(&second);

    a.connect().await?;

    assert!(a.is_connected());
    assert!(!b.is_connected());
    assert_ne!(a.id(), b.id());
    assert_eq!(second.state().connects(), 0);
    Ok(())
}

#[tokio::test]
async fn test_stats_track_connects() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    driver.fail_next_connect("ORA-12541: TNS:no listener");
    let session = session_with(&driver);

    assert!(session.connect().await.is_err());
    session.connect().await?;

    let stats = session.stats();
    assert_eq!(stats.connect_attempts, 2);
    assert_eq!(stats.connects, 1);
    assert_eq!(stats.connect_failure_rate(), 0.5);
    Ok(())
}
