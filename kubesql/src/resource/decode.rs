// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Validating decode from attribute bags into typed records
//!
//! Each bag is first deserialized into a permissive raw shape where every
//! field is optional, then checked path by path. A missing required path
//! becomes a [`ProjectionError::MissingField`] naming that path.

use super::{
    AttributeBag, ContainerRecord, NodeRecord, ObjectMeta, PodRecord,
    ReplicationControllerRecord, ServiceRecord,
};
use crate::projector::ProjectionError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Replica count the API server assigns when `spec.replicas` is omitted
const DEFAULT_REPLICAS: i64 = 1;

const UNKNOWN_RESOURCE: &str = "<unknown>";

#[derive(Debug, Deserialize)]
struct RawMeta {
    uid: Option<String>,
    name: Option<String>,
    labels: Option<BTreeMap<String, String>>,
    annotations: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    metadata: Option<RawMeta>,
    status: Option<RawNodeStatus>,
}

#[derive(Debug, Deserialize)]
struct RawNodeStatus {
    addresses: Option<Vec<RawNodeAddress>>,
}

#[derive(Debug, Deserialize)]
struct RawNodeAddress {
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPod {
    metadata: Option<RawMeta>,
    spec: Option<RawPodSpec>,
    status: Option<RawPodStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPodSpec {
    node_name: Option<String>,
    containers: Option<Vec<RawContainer>>,
}

#[derive(Debug, Deserialize)]
struct RawContainer {
    name: Option<String>,
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPodStatus {
    container_statuses: Option<Vec<RawContainerStatus>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContainerStatus {
    restart_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawService {
    metadata: Option<RawMeta>,
    spec: Option<RawServiceSpec>,
}

#[derive(Debug, Deserialize)]
struct RawServiceSpec {
    #[serde(rename = "clusterIP")]
    cluster_ip: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReplicationController {
    metadata: Option<RawMeta>,
    spec: Option<RawReplicationControllerSpec>,
}

#[derive(Debug, Deserialize)]
struct RawReplicationControllerSpec {
    replicas: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawNamespace {
    metadata: Option<RawMeta>,
}

/// Best-effort uid lookup that works even when the rest of the bag is invalid
pub fn bag_uid(bag: &AttributeBag) -> Option<&str> {
    bag.pointer("/metadata/uid").and_then(|uid| uid.as_str())
}

/// Human-readable identifier used in error messages
fn describe(bag: &AttributeBag) -> String {
    let name = bag.pointer("/metadata/name").and_then(|n| n.as_str());
    let namespace = bag.pointer("/metadata/namespace").and_then(|n| n.as_str());
    match (namespace, name) {
        (Some(ns), Some(name)) => format!("{}/{}", ns, name),
        (None, Some(name)) => name.to_string(),
        _ => bag_uid(bag).unwrap_or(UNKNOWN_RESOURCE).to_string(),
    }
}

/// Decoding context for one bag: carries the kind and identifier for errors
struct Ctx<'a> {
    kind: &'static str,
    bag: &'a AttributeBag,
}

impl<'a> Ctx<'a> {
    fn new(kind: &'static str, bag: &'a AttributeBag) -> Self {
        Self { kind, bag }
    }

    fn parse<T: Deserialize<'a>>(&self) -> Result<T, ProjectionError> {
        T::deserialize(self.bag).map_err(|e| ProjectionError::Malformed {
            kind: self.kind,
            resource: describe(self.bag),
            reason: e.to_string(),
        })
    }

    fn missing(&self, path: impl Into<String>) -> ProjectionError {
        ProjectionError::MissingField {
            kind: self.kind,
            resource: describe(self.bag),
            path: path.into(),
        }
    }

    fn require<T>(&self, value: Option<T>, path: impl Into<String>) -> Result<T, ProjectionError> {
        value.ok_or_else(|| self.missing(path))
    }

    fn metadata(&self, raw: Option<RawMeta>) -> Result<ObjectMeta, ProjectionError> {
        let raw = self.require(raw, "metadata")?;
        Ok(ObjectMeta {
            uid: self.require(raw.uid, "metadata.uid")?,
            name: self.require(raw.name, "metadata.name")?,
            labels: raw.labels.unwrap_or_default(),
            annotations: raw.annotations.unwrap_or_default(),
        })
    }
}

pub fn decode_node(bag: &AttributeBag) -> Result<NodeRecord, ProjectionError> {
    let ctx = Ctx::new("node", bag);
    let raw: RawNode = ctx.parse()?;
    let metadata = ctx.metadata(raw.metadata)?;

    let address = raw
        .status
        .and_then(|status| status.addresses)
        .and_then(|addresses| addresses.into_iter().next());
    let address = ctx.require(address, "status.addresses[0]")?;
    let ip = ctx.require(address.address, "status.addresses[0].address")?;

    Ok(NodeRecord { metadata, ip })
}

pub fn decode_pod(bag: &AttributeBag) -> Result<PodRecord, ProjectionError> {
    let ctx = Ctx::new("pod", bag);
    let raw: RawPod = ctx.parse()?;
    let metadata = ctx.metadata(raw.metadata)?;

    let spec = ctx.require(raw.spec, "spec")?;
    let declared = ctx.require(spec.containers, "spec.containers")?;
    let statuses = raw.status.and_then(|status| status.container_statuses);

    // Statuses are matched to declared containers by position, so the two
    // lists must line up exactly once the kubelet has reported them.
    if let Some(ref statuses) = statuses {
        if statuses.len() != declared.len() {
            return Err(ProjectionError::ContainerStatusMismatch {
                resource: describe(bag),
                declared: declared.len(),
                reported: statuses.len(),
            });
        }
    }

    let mut containers = Vec::with_capacity(declared.len());
    for (ix, container) in declared.into_iter().enumerate() {
        let restarts = match statuses.as_ref() {
            Some(statuses) => Some(ctx.require(
                statuses[ix].restart_count,
                format!("status.containerStatuses[{}].restartCount", ix),
            )?),
            None => None,
        };
        containers.push(ContainerRecord {
            name: ctx.require(container.name, format!("spec.containers[{}].name", ix))?,
            image: ctx.require(container.image, format!("spec.containers[{}].image", ix))?,
            restarts,
        });
    }

    Ok(PodRecord {
        metadata,
        host: spec.node_name,
        containers,
    })
}

pub fn decode_service(bag: &AttributeBag) -> Result<ServiceRecord, ProjectionError> {
    let ctx = Ctx::new("service", bag);
    let raw: RawService = ctx.parse()?;
    let metadata = ctx.metadata(raw.metadata)?;

    Ok(ServiceRecord {
        metadata,
        cluster_ip: raw.spec.and_then(|spec| spec.cluster_ip),
    })
}

pub fn decode_replication_controller(
    bag: &AttributeBag,
) -> Result<ReplicationControllerRecord, ProjectionError> {
    let ctx = Ctx::new("replicationController", bag);
    let raw: RawReplicationController = ctx.parse()?;
    let metadata = ctx.metadata(raw.metadata)?;

    Ok(ReplicationControllerRecord {
        metadata,
        replicas: raw
            .spec
            .and_then(|spec| spec.replicas)
            .unwrap_or(DEFAULT_REPLICAS),
    })
}

/// Namespaces only contribute their name, which scopes later listings
pub fn decode_namespace(bag: &AttributeBag) -> Result<String, ProjectionError> {
    let ctx = Ctx::new("namespace", bag);
    let raw: RawNamespace = ctx.parse()?;
    let meta = ctx.require(raw.metadata, "metadata")?;
    ctx.require(meta.name, "metadata.name")
}
