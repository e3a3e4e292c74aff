// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Relational schema for mirrored cluster state
//!
//! Resource tables are keyed by the remote uid. Metadata tables (labels and
//! annotations) are keyed by `(kind, uid, key)` so a key on one owner is a
//! single row. Every write goes through `INSERT OR REPLACE`, which makes
//! re-applying a snapshot idempotent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Owner discriminator stored in the `kind` column of the metadata tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Node,
    Pod,
    Service,
    ReplicationController,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Node,
        ResourceKind::Pod,
        ResourceKind::Service,
        ResourceKind::ReplicationController,
    ];

    /// Value written to `labels.kind` / `annotations.kind`
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Node => "node",
            ResourceKind::Pod => "pod",
            ResourceKind::Service => "service",
            ResourceKind::ReplicationController => "replicationController",
        }
    }

    /// Table holding the resource rows of this kind
    pub fn table(&self) -> Table {
        match self {
            ResourceKind::Node => Table::Nodes,
            ResourceKind::Pod => Table::Pods,
            ResourceKind::Service => Table::Services,
            ResourceKind::ReplicationController => Table::ReplicationControllers,
        }
    }

    /// Whether rows of this kind carry a `namespace` column
    pub fn is_namespaced(&self) -> bool {
        !matches!(self, ResourceKind::Node)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every table in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Nodes,
    Pods,
    Containers,
    Services,
    ReplicationControllers,
    Labels,
    Annotations,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Services,
        Table::Pods,
        Table::ReplicationControllers,
        Table::Nodes,
        Table::Labels,
        Table::Annotations,
        Table::Containers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Nodes => "nodes",
            Table::Pods => "pods",
            Table::Containers => "containers",
            Table::Services => "services",
            Table::ReplicationControllers => "replicationcontrollers",
            Table::Labels => "labels",
            Table::Annotations => "annotations",
        }
    }

    /// Column names in declaration order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Nodes => &["uid", "name", "ip"],
            Table::Pods => &["uid", "name", "namespace", "host"],
            Table::Containers => &["name", "image", "pod_uid", "restarts"],
            Table::Services => &["uid", "name", "namespace", "ip"],
            Table::ReplicationControllers => &["uid", "name", "namespace", "replicas"],
            Table::Labels | Table::Annotations => &["key", "value", "kind", "uid"],
        }
    }

    pub fn create_statement(&self) -> &'static str {
        match self {
            Table::Nodes => {
                "CREATE TABLE nodes (uid TEXT NOT NULL PRIMARY KEY, name TEXT, ip TEXT)"
            }
            Table::Pods => {
                "CREATE TABLE pods (uid TEXT NOT NULL PRIMARY KEY, name TEXT, namespace TEXT, host TEXT)"
            }
            Table::Containers => {
                "CREATE TABLE containers (name TEXT NOT NULL, image TEXT, pod_uid TEXT NOT NULL, restarts INTEGER, \
                 PRIMARY KEY (pod_uid, name))"
            }
            Table::Services => {
                "CREATE TABLE services (uid TEXT NOT NULL PRIMARY KEY, name TEXT, namespace TEXT, ip TEXT)"
            }
            Table::ReplicationControllers => {
                "CREATE TABLE replicationcontrollers (uid TEXT NOT NULL PRIMARY KEY, name TEXT, namespace TEXT, \
                 replicas INTEGER)"
            }
            Table::Labels => {
                "CREATE TABLE labels (key TEXT NOT NULL, value TEXT, kind TEXT NOT NULL, uid TEXT NOT NULL, \
                 PRIMARY KEY (kind, uid, key))"
            }
            Table::Annotations => {
                "CREATE TABLE annotations (key TEXT NOT NULL, value TEXT, kind TEXT NOT NULL, uid TEXT NOT NULL, \
                 PRIMARY KEY (kind, uid, key))"
            }
        }
    }

    /// `INSERT OR REPLACE` statement with one positional parameter per column
    pub fn upsert_statement(&self) -> String {
        let columns = self.columns();
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
            self.name(),
            columns.join(", "),
            placeholders
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
