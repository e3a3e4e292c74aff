// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Live cluster source backed by the `kube` client
//!
//! Listings are issued through a private current-thread tokio runtime so the
//! synchronous coordinator loop can call them directly. Credentials come from
//! the ambient kubeconfig or in-cluster service account.

use super::{AttributeBag, EnumerationError, ListKind, ResourceSource, SourceError};
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, ReplicationController, Service};
use kube::api::{Api, ListParams};
use kube::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tokio::runtime::{Builder, Runtime};

pub struct KubeSource {
    client: Client,
    runtime: Runtime,
}

impl KubeSource {
    /// Connect using the default kubeconfig resolution
    pub fn connect() -> Result<Self, SourceError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::ConnectionError(e.to_string()))?;
        let client = runtime
            .block_on(Client::try_default())
            .map_err(|e| SourceError::ConnectionError(e.to_string()))?;
        log::info!(
            "Connected to cluster (default namespace {})",
            client.default_namespace()
        );
        Ok(Self { client, runtime })
    }

    fn list<K>(
        &self,
        api: Api<K>,
        kind: ListKind,
        namespace: Option<&str>,
    ) -> Result<Vec<AttributeBag>, EnumerationError>
    where
        K: Clone + DeserializeOwned + Debug + Serialize,
    {
        let failed = |reason: String| match namespace {
            Some(ns) => EnumerationError::in_namespace(kind, ns, reason),
            None => EnumerationError::new(kind, reason),
        };

        let list = self
            .runtime
            .block_on(api.list(&ListParams::default()))
            .map_err(|e| failed(e.to_string()))?;

        list.items
            .iter()
            .map(|item| serde_json::to_value(item).map_err(|e| failed(e.to_string())))
            .collect()
    }
}

impl ResourceSource for KubeSource {
    fn list_nodes(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        let api: Api<Node> = Api::all(self.client.clone());
        self.list(api, ListKind::Nodes, None)
    }

    fn list_namespaces(&self) -> Result<Vec<AttributeBag>, EnumerationError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        self.list(api, ListKind::Namespaces, None)
    }

    fn list_pods(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        self.list(api, ListKind::Pods, Some(namespace))
    }

    fn list_services(&self, namespace: &str) -> Result<Vec<AttributeBag>, EnumerationError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        self.list(api, ListKind::Services, Some(namespace))
    }

    fn list_replication_controllers(
        &self,
        namespace: &str,
    ) -> Result<Vec<AttributeBag>, EnumerationError> {
        let api: Api<ReplicationController> = Api::namespaced(self.client.clone(), namespace);
        self.list(api, ListKind::ReplicationControllers, Some(namespace))
    }
}
