// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed records for the resource kinds mirrored into the store
//!
//! Raw listings arrive as untyped attribute bags. [`decode`] turns each bag
//! into one of the records below, or reports which required path was missing.

pub mod decode;

use crate::schema::ResourceKind;
use std::collections::BTreeMap;

/// One resource exactly as the remote API returned it
pub type AttributeBag = serde_json::Value;

/// Identity and key/value metadata shared by every resource kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub uid: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }
}

/// Common access for records that own label/annotation rows
pub trait Resource {
    const KIND: ResourceKind;

    fn metadata(&self) -> &ObjectMeta;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub metadata: ObjectMeta,
    /// First reported address of the node
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRecord {
    pub metadata: ObjectMeta,
    /// Node the pod is scheduled on, `None` while pending
    pub host: Option<String>,
    pub containers: Vec<ContainerRecord>,
}

/// A declared container joined with the status entry at the same index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRecord {
    pub name: String,
    pub image: String,
    /// `None` until the kubelet reports container statuses
    pub restarts: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub metadata: ObjectMeta,
    pub cluster_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationControllerRecord {
    pub metadata: ObjectMeta,
    pub replicas: i64,
}

impl Resource for NodeRecord {
    const KIND: ResourceKind = ResourceKind::Node;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl Resource for PodRecord {
    const KIND: ResourceKind = ResourceKind::Pod;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl Resource for ServiceRecord {
    const KIND: ResourceKind = ResourceKind::Service;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

impl Resource for ReplicationControllerRecord {
    const KIND: ResourceKind = ResourceKind::ReplicationController;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
