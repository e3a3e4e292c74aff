// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query Coordinator - the single owner of the store
//!
//! The store lives on one background thread. That thread alternates between
//! waiting for a query, executing it, and refreshing the store from the
//! cluster. The foreground talks to it through a strict rendezvous:
//!
//! - a request channel with room for exactly one request
//! - a per-request completion channel with room for exactly one reply
//!
//! Because only the background thread ever touches the store, a query can
//! never observe a refresh in progress, and a refresh never starts while a
//! query is executing.

use super::cancellation::CancellationToken;
use super::error::CoordinatorError;
use crate::config::CoordinatorConfig;
use crate::exec::{QueryError, QueryExecutor, QueryResult};
use crate::source::ResourceSource;
use crate::storage::Store;
use crate::sync::{RefreshReport, SyncError, Synchronizer};
use parking_lot::Mutex;
use rusqlite::InterruptHandle;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const WORKER_THREAD_NAME: &str = "kubesql-coordinator";

/// Messages accepted by the background loop
enum Request {
    Query {
        text: String,
        reply: SyncSender<Result<QueryResult, QueryError>>,
    },
    /// Wakes the loop so it exits without a trailing refresh
    Shutdown,
}

/// Where the background loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    WaitingForWork,
    Refreshing,
    ExecutingQuery,
    Stopped,
}

/// Counters maintained by the background loop
#[derive(Debug, Clone, Default)]
pub struct CoordinatorStats {
    pub queries_served: u64,
    pub refreshes_completed: u64,
    pub refreshes_failed: u64,
    pub last_refresh: Option<RefreshReport>,
}

/// State visible to both the foreground handle and the worker
struct Shared {
    state: Mutex<CoordinatorState>,
    stats: Mutex<CoordinatorStats>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(CoordinatorState::Idle),
            stats: Mutex::new(CoordinatorStats::default()),
        }
    }

    fn set_state(&self, state: CoordinatorState) {
        *self.state.lock() = state;
    }

    fn record_refresh(&self, report: RefreshReport) {
        let mut stats = self.stats.lock();
        stats.refreshes_completed += 1;
        stats.last_refresh = Some(report);
    }
}

/// Foreground handle to the background refresh-and-serve loop
pub struct QueryCoordinator {
    requests: SyncSender<Request>,
    /// Disconnects when the worker thread exits, for any reason
    stopped: Receiver<()>,
    worker: Option<JoinHandle<()>>,
    cancel: CancellationToken,
    /// Aborts the statement currently running on the worker's connection
    interrupt: InterruptHandle,
    shared: Arc<Shared>,
    config: CoordinatorConfig,
}

impl QueryCoordinator {
    /// Open the store, run the initial refresh, and start the background loop
    ///
    /// The initial refresh runs on the calling thread, so the store is fully
    /// populated before the first query can be submitted.
    pub fn start(
        source: Arc<dyn ResourceSource>,
        config: CoordinatorConfig,
    ) -> Result<Self, CoordinatorError> {
        let mut store = Store::open_in_memory()?;
        let synchronizer = Synchronizer::new(source, config.retention);
        let cancel = CancellationToken::new();
        let shared = Arc::new(Shared::new());

        let report = synchronizer.refresh(&mut store, &cancel)?;
        shared.record_refresh(report);
        let interrupt = store.connection().get_interrupt_handle();

        let (requests, inbox) = mpsc::sync_channel(1);
        let (stopped_tx, stopped) = mpsc::sync_channel(1);

        let worker = Worker {
            store,
            synchronizer,
            inbox,
            cancel: cancel.clone(),
            shared: Arc::clone(&shared),
            idle_timeout: config.idle_timeout,
            _stopped: stopped_tx,
        };

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker.run())
            .map_err(|e| CoordinatorError::Startup(format!("Failed to spawn worker: {}", e)))?;

        log::debug!(
            "Coordinator started (idle timeout {:?}, response timeout {:?})",
            config.idle_timeout,
            config.response_timeout
        );

        Ok(Self {
            requests,
            stopped,
            worker: Some(handle),
            cancel,
            interrupt,
            shared,
            config,
        })
    }

    /// Submit one query and block until it completes or the response timeout elapses
    pub fn submit(&self, query: &str) -> Result<QueryResult, CoordinatorError> {
        let (reply, completion) = mpsc::sync_channel(1);
        let request = Request::Query {
            text: query.to_string(),
            reply,
        };

        match self.requests.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => return Err(CoordinatorError::Busy),
            Err(TrySendError::Disconnected(_)) => return Err(CoordinatorError::Unavailable),
        }

        match completion.recv_timeout(self.config.response_timeout) {
            Ok(result) => result.map_err(CoordinatorError::from),
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "Query not completed within {:?}",
                    self.config.response_timeout
                );
                self.interrupt_query();
                Err(CoordinatorError::Timeout(self.config.response_timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(CoordinatorError::Unavailable),
        }
    }

    /// Abort the query the worker is executing, if any, so the loop can move on
    fn interrupt_query(&self) {
        if self.state() == CoordinatorState::ExecutingQuery {
            log::warn!("Interrupting running query");
            self.interrupt.interrupt();
        }
    }

    pub fn state(&self) -> CoordinatorState {
        *self.shared.state.lock()
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.shared.stats.lock().clone()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Stop the background loop and wait for its thread to exit
    ///
    /// Fails with [`CoordinatorError::Shutdown`] if the thread does not stop
    /// within the configured shutdown timeout or terminated by panicking.
    pub fn shutdown(mut self) -> Result<(), CoordinatorError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), CoordinatorError> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };

        self.cancel.cancel();
        // A full slot means the worker has a pending request; it sees the
        // cancelled token at its next wait boundary instead.
        if let Err(TrySendError::Disconnected(_)) = self.requests.try_send(Request::Shutdown) {
            log::debug!("Coordinator worker already exited");
        }
        self.interrupt_query();

        wait_for_exit(&self.stopped, self.config.shutdown_timeout)?;
        handle
            .join()
            .map_err(|_| CoordinatorError::Shutdown("background thread panicked".to_string()))?;

        log::debug!("Coordinator stopped");
        Ok(())
    }
}

fn wait_for_exit(stopped: &Receiver<()>, timeout: Duration) -> Result<(), CoordinatorError> {
    match stopped.recv_timeout(timeout) {
        Ok(()) | Err(RecvTimeoutError::Disconnected) => Ok(()),
        Err(RecvTimeoutError::Timeout) => Err(CoordinatorError::Shutdown(format!(
            "background thread did not stop within {:?}",
            timeout
        ))),
    }
}

impl Drop for QueryCoordinator {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::error!("{}", e);
        }
    }
}

/// Background side of the coordinator; owns the store exclusively
struct Worker {
    store: Store,
    synchronizer: Synchronizer,
    inbox: Receiver<Request>,
    cancel: CancellationToken,
    shared: Arc<Shared>,
    idle_timeout: Duration,
    /// Dropped when the thread exits, which wakes `wait_for_exit`
    _stopped: SyncSender<()>,
}

impl Worker {
    fn run(mut self) {
        log::debug!("Coordinator loop running");

        while !self.cancel.is_cancelled() {
            self.shared.set_state(CoordinatorState::WaitingForWork);

            match self.inbox.recv_timeout(self.idle_timeout) {
                Ok(Request::Query { text, reply }) => {
                    self.shared.set_state(CoordinatorState::ExecutingQuery);
                    let result = QueryExecutor::execute(&self.store, &text);
                    if let Err(ref e) = result {
                        log::debug!("Query failed: {}", e);
                    }
                    self.shared.stats.lock().queries_served += 1;

                    // The submitter may have timed out and dropped its receiver.
                    if reply.try_send(result).is_err() {
                        log::warn!("Query completed after its submitter stopped waiting");
                    }

                    if self.cancel.is_cancelled() {
                        break;
                    }
                    self.refresh();
                }
                Ok(Request::Shutdown) => {
                    log::debug!("Shutdown requested");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    log::debug!("No query within {:?}, refreshing", self.idle_timeout);
                    self.refresh();
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.shared.set_state(CoordinatorState::Idle);
        }

        self.shared.set_state(CoordinatorState::Stopped);
        log::debug!("Coordinator loop exited");
    }

    fn refresh(&mut self) {
        self.shared.set_state(CoordinatorState::Refreshing);
        match self.synchronizer.refresh(&mut self.store, &self.cancel) {
            Ok(report) => self.shared.record_refresh(report),
            Err(SyncError::Cancelled) => log::debug!("Refresh abandoned for shutdown"),
            Err(e) => {
                log::error!("Refresh failed: {}", e);
                self.shared.stats.lock().refreshes_failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ClusterSnapshot, SnapshotSource};
    use serde_json::json;

    fn source() -> Arc<SnapshotSource> {
        Arc::new(SnapshotSource::new(ClusterSnapshot {
            nodes: vec![json!({
                "metadata": {"uid": "n1", "name": "node-a"},
                "status": {"addresses": [{"address": "10.0.0.1"}]}
            })],
            ..ClusterSnapshot::default()
        }))
    }

    #[test]
    fn test_start_refreshes_before_first_query() {
        let coordinator = QueryCoordinator::start(source(), CoordinatorConfig::default()).unwrap();
        let stats = coordinator.stats();
        assert_eq!(stats.refreshes_completed, 1);
        assert_eq!(stats.last_refresh.map(|r| r.nodes), Some(1));
        coordinator.shutdown().unwrap();
    }

    #[test]
    fn test_query_then_refresh() {
        let coordinator = QueryCoordinator::start(source(), CoordinatorConfig::default()).unwrap();

        let result = coordinator.submit("SELECT name, ip FROM nodes").unwrap();
        assert_eq!(result.rows.len(), 1);

        // The next submit waits behind the post-query refresh.
        coordinator.submit("SELECT 1").unwrap();
        let stats = coordinator.stats();
        assert_eq!(stats.queries_served, 2);
        assert!(stats.refreshes_completed >= 2);

        coordinator.shutdown().unwrap();
    }

    #[test]
    fn test_query_error_is_recoverable() {
        let coordinator = QueryCoordinator::start(source(), CoordinatorConfig::default()).unwrap();

        let err = coordinator.submit("SELECT * FROM nosuchtable").unwrap_err();
        assert!(matches!(err, CoordinatorError::Query(_)));
        assert!(err.is_recoverable());

        assert!(coordinator.submit("SELECT * FROM nodes").is_ok());
        coordinator.shutdown().unwrap();
    }

    #[test]
    fn test_runaway_query_is_interrupted() {
        let config = CoordinatorConfig::default()
            .with_response_timeout(Duration::from_millis(300))
            .with_shutdown_timeout(Duration::from_secs(2));
        let coordinator = QueryCoordinator::start(source(), config).unwrap();

        let err = coordinator
            .submit("WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) SELECT count(*) FROM c")
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::Timeout(_)), "{:?}", err);

        let result = coordinator.submit("SELECT 1").unwrap();
        assert_eq!(result.rows.len(), 1);
        coordinator.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_while_idle_is_prompt() {
        let config = CoordinatorConfig::default().with_idle_timeout(Duration::from_secs(3600));
        let coordinator = QueryCoordinator::start(source(), config).unwrap();

        let started = std::time::Instant::now();
        coordinator.shutdown().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_drop_stops_worker() {
        let coordinator = QueryCoordinator::start(source(), CoordinatorConfig::default()).unwrap();
        let shared = Arc::clone(&coordinator.shared);
        drop(coordinator);
        assert_eq!(*shared.state.lock(), CoordinatorState::Stopped);
    }
}
