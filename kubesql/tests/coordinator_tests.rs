//! Query coordinator tests
//!
//! Exercise the background refresh-and-serve loop end to end: query results,
//! staleness, refresh atomicity as seen by queries, timeouts and shutdown.
//! Timing-sensitive, so every test is serialized.

#[path = "testutils/mod.rs"]
mod testutils;

use kubesql::{
    ClusterSnapshot, CoordinatorConfig, CoordinatorError, QueryCoordinator, SnapshotSource, Value,
};
use serial_test::serial;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use testutils::bags::node_bag;
use testutils::init_logging;
use testutils::sources::{GenerationSource, PanickingSource, SlowSource};

/// Idle refreshes effectively disabled
fn quiet_config() -> CoordinatorConfig {
    CoordinatorConfig::default()
        .with_idle_timeout(Duration::from_secs(3600))
        .with_response_timeout(Duration::from_secs(5))
        .with_shutdown_timeout(Duration::from_secs(5))
}

fn text(value: Option<&Value>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[test]
#[serial]
fn test_select_from_snapshot_file() {
    init_logging();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "nodes": [{{
                "metadata": {{"uid": "n1", "name": "node-a"}},
                "status": {{"addresses": [{{"type": "InternalIP", "address": "10.0.0.1"}}]}}
            }}]
        }}"#
    )
    .unwrap();

    let source = Arc::new(SnapshotSource::from_path(file.path()).unwrap());
    let coordinator = QueryCoordinator::start(source, quiet_config()).unwrap();

    let result = coordinator.submit("SELECT name, ip FROM nodes").unwrap();
    assert_eq!(result.columns, vec!["name", "ip"]);
    assert_eq!(result.rows.len(), 1);
    assert_eq!(text(result.value(0, "name")), "node-a");
    assert_eq!(text(result.value(0, "ip")), "10.0.0.1");

    coordinator.shutdown().unwrap();
}

#[test]
#[serial]
fn test_query_error_does_not_end_session() {
    init_logging();
    let source = Arc::new(SnapshotSource::new(ClusterSnapshot {
        nodes: vec![node_bag("n1", "node-a", "10.0.0.1")],
        ..ClusterSnapshot::default()
    }));
    let coordinator = QueryCoordinator::start(source, quiet_config()).unwrap();

    let err = coordinator.submit("SELECT * FROM nosuchtable").unwrap_err();
    assert!(matches!(err, CoordinatorError::Query(_)), "{:?}", err);
    assert!(err.to_string().contains("nosuchtable"), "{}", err);

    let result = coordinator.submit("SELECT name FROM nodes").unwrap();
    assert_eq!(result.rows.len(), 1);

    coordinator.shutdown().unwrap();
}

#[test]
#[serial]
fn test_refresh_follows_every_query() {
    init_logging();
    let source = Arc::new(GenerationSource::new(2, 2));
    let coordinator = QueryCoordinator::start(source.clone(), quiet_config()).unwrap();

    let sql = "SELECT DISTINCT ip FROM nodes";
    let first = coordinator.submit(sql).unwrap();
    assert_eq!(text(first.value(0, "ip")), "gen-1");

    // The post-query refresh completes before the next query is taken.
    let second = coordinator.submit(sql).unwrap();
    assert_eq!(text(second.value(0, "ip")), "gen-2");

    let third = coordinator.submit(sql).unwrap();
    assert_eq!(text(third.value(0, "ip")), "gen-3");

    coordinator.shutdown().unwrap();
    assert!(source.generation() >= 3);
}

#[test]
#[serial]
fn test_queries_never_observe_partial_refresh() {
    init_logging();
    let source =
        Arc::new(GenerationSource::new(5, 5).with_pause(Duration::from_millis(2)));
    let config = quiet_config().with_idle_timeout(Duration::from_millis(1));
    let coordinator = QueryCoordinator::start(source.clone(), config).unwrap();

    // One generation across both tables, or the query saw a torn refresh.
    let sql = "SELECT ip AS generation FROM nodes \
               UNION SELECT value FROM annotations WHERE key = 'generation'";

    let mut seen = Vec::new();
    for _ in 0..50 {
        let result = coordinator.submit(sql).unwrap();
        assert_eq!(result.rows.len(), 1, "mixed generations: {:?}", result.rows);
        seen.push(text(result.value(0, "generation")));

        // Give the idle timeout a chance to start a refresh first.
        thread::sleep(Duration::from_millis(8));
    }

    coordinator.shutdown().unwrap();

    assert!(source.generation() >= 50);
    seen.dedup();
    assert!(seen.len() > 1);
}

#[test]
#[serial]
fn test_slow_refresh_times_out_then_busy() {
    init_logging();
    let source = Arc::new(SlowSource::new(Duration::from_millis(1500)));
    let config = quiet_config().with_response_timeout(Duration::from_millis(200));
    let coordinator = QueryCoordinator::start(source.clone(), config).unwrap();

    // Served from the initial refresh; the post-query refresh is slow.
    coordinator.submit("SELECT * FROM nodes").unwrap();

    let err = coordinator.submit("SELECT * FROM nodes").unwrap_err();
    assert!(
        matches!(err, CoordinatorError::Timeout(d) if d == Duration::from_millis(200)),
        "{:?}",
        err
    );
    assert!(err.is_recoverable());

    // The timed-out query still occupies the request slot.
    let err = coordinator.submit("SELECT 1").unwrap_err();
    assert!(matches!(err, CoordinatorError::Busy), "{:?}", err);

    coordinator.shutdown().unwrap();
}

#[test]
#[serial]
fn test_shutdown_while_refreshing_is_bounded() {
    init_logging();
    let source = Arc::new(SlowSource::new(Duration::from_millis(500)));
    let config = quiet_config().with_idle_timeout(Duration::from_millis(10));
    let coordinator = QueryCoordinator::start(source.clone(), config).unwrap();

    // Let the loop enter a slow idle refresh.
    thread::sleep(Duration::from_millis(100));
    assert!(source.calls() >= 2);

    let started = Instant::now();
    coordinator.shutdown().unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
#[serial]
fn test_shutdown_while_idle_is_prompt() {
    init_logging();
    let source = Arc::new(SnapshotSource::default());
    let coordinator = QueryCoordinator::start(source, quiet_config()).unwrap();

    let started = Instant::now();
    coordinator.shutdown().unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
#[serial]
fn test_shutdown_timeout_is_reported() {
    init_logging();
    let source = Arc::new(SlowSource::new(Duration::from_secs(2)));
    let config = quiet_config()
        .with_idle_timeout(Duration::from_millis(10))
        .with_shutdown_timeout(Duration::from_millis(100));
    let coordinator = QueryCoordinator::start(source, config).unwrap();

    thread::sleep(Duration::from_millis(100));

    let err = coordinator.shutdown().unwrap_err();
    assert!(matches!(err, CoordinatorError::Shutdown(_)), "{:?}", err);
    assert!(!err.is_recoverable());
}

#[test]
#[serial]
fn test_stats_track_queries_and_refreshes() {
    init_logging();
    let source = Arc::new(GenerationSource::new(1, 0));
    let coordinator = QueryCoordinator::start(source, quiet_config()).unwrap();

    coordinator.submit("SELECT * FROM nodes").unwrap();
    coordinator.submit("SELECT * FROM pods").unwrap();

    let stats = coordinator.stats();
    assert_eq!(stats.queries_served, 2);
    assert!(stats.refreshes_completed >= 2);
    assert_eq!(stats.refreshes_failed, 0);
    assert_eq!(stats.last_refresh.map(|r| r.nodes), Some(1));

    coordinator.shutdown().unwrap();
}

#[test]
#[serial]
fn test_runaway_query_times_out_and_session_continues() {
    init_logging();
    let source = Arc::new(GenerationSource::new(1, 1));
    let config = quiet_config()
        .with_response_timeout(Duration::from_millis(300))
        .with_shutdown_timeout(Duration::from_secs(1));
    let coordinator = QueryCoordinator::start(source.clone(), config).unwrap();

    let err = coordinator
        .submit("WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) SELECT count(*) FROM c")
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Timeout(_)), "{:?}", err);

    let result = coordinator.submit("SELECT 1").unwrap();
    assert_eq!(result.rows.len(), 1);

    // Refreshes resumed after the interrupted query.
    assert!(source.generation() >= 2);
    coordinator.shutdown().unwrap();
}

#[test]
#[serial]
fn test_dead_worker_reports_unavailable() {
    init_logging();
    let source = Arc::new(PanickingSource::new());
    let coordinator = QueryCoordinator::start(source, quiet_config()).unwrap();

    // Answered from the initial refresh; the refresh after it panics.
    coordinator.submit("SELECT * FROM nodes").unwrap();

    let err = coordinator.submit("SELECT * FROM nodes").unwrap_err();
    assert!(matches!(err, CoordinatorError::Unavailable), "{:?}", err);
    assert!(err.is_recoverable());

    let err = coordinator.shutdown().unwrap_err();
    match err {
        CoordinatorError::Shutdown(reason) => assert!(reason.contains("panicked"), "{}", reason),
        other => panic!("unexpected error: {:?}", other),
    }
}
