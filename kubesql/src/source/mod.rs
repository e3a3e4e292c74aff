// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Resource sources - where raw cluster listings come from
//!
//! A [`ResourceSource`] lists one resource kind at a time and hands back the
//! objects as untyped attribute bags in the remote API's native layout
//! (`metadata.uid`, `metadata.labels`, `spec.*`, `status.*`).

pub mod error;
#[cfg(feature = "kube-client")]
pub mod cluster;
pub mod snapshot;

pub use crate::resource::AttributeBag;
pub use error::{EnumerationError, SourceError};
#[cfg(feature = "kube-client")]
pub use cluster::KubeSource;
pub use snapshot::{ClusterSnapshot, SnapshotSource};

use std::fmt;
use std::sync::Arc;

/// The listings a refresh performs, in the order it performs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Nodes,
    Namespaces,
    Pods,
    Services,
    ReplicationControllers,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Nodes => "nodes",
            ListKind::Namespaces => "namespaces",
            ListKind::Pods => "pods",
            ListKind::Services => "services",
            ListKind::ReplicationControllers => "replicationcontrollers",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote resource API as seen by the synchronizer
///
/// Implementations are called from the coordinator's background thread only,
/// one listing at a time.
pub trait ResourceSource: Send + Sync {
    fn list_nodes(&self) -> Result<Vec<AttributeBag>, EnumerationError>;

    fn list_namespaces(&self) -> Result<Vec<AttributeBag>, EnumerationError>;

    fn list_pods(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError>;

    fn list_services(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError>;

    fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> Result<Vec<AttributeBag>, EnumerationError>;
}

impl<T: ResourceSource + ?Sized> ResourceSource for Arc<T> {
    fn list_nodes(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        (**self).list_nodes()
    }

    fn list_namespaces(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        (**self).list_namespaces()
    }

    fn list_pods(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        (**self).list_pods(namespace)
    }

    fn list_services(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        (**self).list_services(namespace)
    }

    fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> Result<Vec<AttributeBag>, EnumerationError> {
        (**self).list_replication_controllers(namespace)
    }
}
