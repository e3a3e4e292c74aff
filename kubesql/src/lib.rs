// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! kubesql - SQL queries over a live mirror of cluster state
//!
//! kubesql copies the resources of a remote cluster (nodes, pods, containers,
//! services, replication controllers and their labels/annotations) into an
//! in-memory SQLite database and keeps that copy fresh while an operator runs
//! ad hoc queries against it.
//!
//! # Architecture
//!
//! - [`ResourceSource`] lists raw resources from the cluster (or a snapshot file)
//! - the projector decodes them into typed records and upserts rows
//! - [`Synchronizer`] drives one full refresh inside a single transaction
//! - [`QueryCoordinator`] owns the [`Store`] on a background thread and
//!   serializes refreshes with queries through a one-slot rendezvous
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use kubesql::{CoordinatorConfig, QueryCoordinator, SnapshotSource};
//!
//! let source = Arc::new(SnapshotSource::from_path("cluster.json").unwrap());
//! let coordinator = QueryCoordinator::start(source, CoordinatorConfig::default()).unwrap();
//!
//! let result = coordinator.submit("SELECT name, ip FROM nodes").unwrap();
//! println!("{} rows", result.rows.len());
//!
//! coordinator.shutdown().unwrap();
//! ```

pub mod config;
pub mod coordinator;
pub mod exec;
pub mod projector;
pub mod resource;
pub mod schema;
pub mod source;
pub mod storage;
pub mod sync;

pub use config::{CoordinatorConfig, RetentionPolicy};
pub use coordinator::{
    CancellationToken, CoordinatorError, CoordinatorState, CoordinatorStats, QueryCoordinator,
};
pub use exec::{QueryError, QueryExecutor, QueryResult, Row, Value};
pub use projector::{ProjectionError, Projector};
pub use schema::{ResourceKind, Table};
pub use source::{
    AttributeBag, ClusterSnapshot, EnumerationError, ListKind, ResourceSource, SnapshotSource,
    SourceError,
};
pub use storage::{Store, StorageError, StoreWriter};
pub use sync::{RefreshReport, SyncError, Synchronizer};

#[cfg(feature = "kube-client")]
pub use source::KubeSource;

/// kubesql version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
