// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! File-backed resource source
//!
//! Serves listings from a JSON document shaped like:
//!
//! ```json
//! {
//!   "nodes": [ ... ],
//!   "namespaces": [ ... ],
//!   "pods": [ ... ],
//!   "services": [ ... ],
//!   "replicationcontrollers": [ ... ]
//! }
//! ```
//!
//! Namespaced objects are filtered by their `metadata.namespace`. When the
//! document has no `namespaces` array, namespaces are inferred from the
//! namespaced objects themselves.

use super::{AttributeBag, EnumerationError, ResourceSource, SourceError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;

/// Complete set of listings at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSnapshot {
    pub nodes: Vec<AttributeBag>,
    pub namespaces: Vec<AttributeBag>,
    pub pods: Vec<AttributeBag>,
    pub services: Vec<AttributeBag>,
    #[serde(rename = "replicationcontrollers", alias = "replicationControllers")]
    pub replication_controllers: Vec<AttributeBag>,
}

impl ClusterSnapshot {
    fn namespaced(&self) -> impl Iterator<Item = &AttributeBag> {
        self.pods
            .iter()
            .chain(self.services.iter())
            .chain(self.replication_controllers.iter())
    }
}

/// [`ResourceSource`] over an in-memory [`ClusterSnapshot`] that can be swapped at runtime
#[derive(Debug, Default)]
pub struct SnapshotSource {
    snapshot: RwLock<ClusterSnapshot>,
}

impl SnapshotSource {
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let snapshot: ClusterSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let source = Self::from_json(&contents)?;
        log::debug!("Loaded snapshot from {}", path.display());
        Ok(source)
    }

    /// Replace the served snapshot; later refreshes see the new one
    pub fn replace(&self, snapshot: ClusterSnapshot) {
        *self.snapshot.write() = snapshot;
    }

    /// Edit the served snapshot in place
    pub fn update(&self, f: impl FnOnce(&mut ClusterSnapshot)) {
        f(&mut self.snapshot.write());
    }

    pub fn snapshot(&self) -> ClusterSnapshot {
        self.snapshot.read().clone()
    }

    fn in_namespace(items: &[AttributeBag], namespace: &str) -> Vec<AttributeBag> {
        items
            .iter()
            .filter(|bag| namespace_of(bag) == Some(namespace))
            .cloned()
            .collect()
    }
}

fn namespace_of(bag: &AttributeBag) -> Option<&str> {
    bag.pointer("/metadata/namespace").and_then(|ns| ns.as_str())
}

impl ResourceSource for SnapshotSource {
    fn list_nodes(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(self.snapshot.read().nodes.clone())
    }

    fn list_namespaces(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        let snapshot = self.snapshot.read();
        if !snapshot.namespaces.is_empty() {
            return Ok(snapshot.namespaces.clone());
        }

        let names: BTreeSet<&str> = snapshot.namespaced().filter_map(namespace_of).collect();
        Ok(names
            .into_iter()
            .map(|name| json!({"metadata": {"name": name}}))
            .collect())
    }

    fn list_pods(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Self::in_namespace(&self.snapshot.read().pods, namespace))
    }

    fn list_services(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Self::in_namespace(&self.snapshot.read().services, namespace))
    }

    fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> Result<Vec<AttributeBag>, EnumerationError> {
        Ok(Self::in_namespace(
            &self.snapshot.read().replication_controllers,
            namespace,
        ))
    }
}
