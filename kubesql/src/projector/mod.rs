// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Projector - turns one kind's listing into upserts against the store
//!
//! Every bag is decoded independently. A bag that fails validation produces a
//! [`ProjectionError`] and is skipped; the rest of the listing still lands.
//! Storage failures are not per-resource and abort the whole projection.

pub mod error;

pub use error::ProjectionError;

use crate::resource::decode::{
    bag_uid, decode_namespace, decode_node, decode_pod, decode_replication_controller,
    decode_service,
};
use crate::resource::{AttributeBag, Resource};
use crate::storage::{StorageResult, StoreWriter};
use std::collections::HashSet;

/// Outcome of projecting one listing
#[derive(Debug, Default)]
pub struct ProjectionSummary {
    /// Resources written to the store
    pub upserted: usize,
    /// Container rows written (pods only)
    pub containers: usize,
    /// Every uid present in the listing, including ones that failed to decode
    pub seen: HashSet<String>,
    pub errors: Vec<ProjectionError>,
}

/// Applies decoded resources through a [`StoreWriter`]
pub struct Projector<'w, 'a> {
    writer: &'w StoreWriter<'a>,
}

impl<'w, 'a> Projector<'w, 'a> {
    pub fn new(writer: &'w StoreWriter<'a>) -> Self {
        Self { writer }
    }

    pub fn nodes(&self, bags: &[AttributeBag]) -> StorageResult<ProjectionSummary> {
        project(bags, decode_node, |node| {
            self.writer.upsert_node(node)?;
            Ok(0)
        })
    }

    pub fn pods(&self, namespace: &str, bags: &[AttributeBag]) -> StorageResult<ProjectionSummary> {
        project(bags, decode_pod, |pod| {
            self.writer.upsert_pod(pod, namespace)?;
            Ok(pod.containers.len())
        })
    }

    pub fn services(
        &self,
        namespace: &str,
        bags: &[AttributeBag],
    ) -> StorageResult<ProjectionSummary> {
        project(bags, decode_service, |service| {
            self.writer.upsert_service(service, namespace)?;
            Ok(0)
        })
    }

    pub fn replication_controllers(
        &self,
        namespace: &str,
        bags: &[AttributeBag],
    ) -> StorageResult<ProjectionSummary> {
        project(bags, decode_replication_controller, |rc| {
            self.writer.upsert_replication_controller(rc, namespace)?;
            Ok(0)
        })
    }
}

/// Extract namespace names; namespaces scope listings but are not stored
pub fn namespace_names(bags: &[AttributeBag]) -> (Vec<String>, Vec<ProjectionError>) {
    let mut names = Vec::with_capacity(bags.len());
    let mut errors = Vec::new();
    for bag in bags {
        match decode_namespace(bag) {
            Ok(name) => names.push(name),
            Err(err) => {
                log::warn!("Skipping namespace: {}", err);
                errors.push(err);
            }
        }
    }
    (names, errors)
}

fn project<R, D, W>(bags: &[AttributeBag], decode: D, mut write: W) -> StorageResult<ProjectionSummary>
where
    R: Resource,
    D: Fn(&AttributeBag) -> Result<R, ProjectionError>,
    W: FnMut(&R) -> StorageResult<usize>,
{
    let mut summary = ProjectionSummary::default();
    for bag in bags {
        if let Some(uid) = bag_uid(bag) {
            summary.seen.insert(uid.to_string());
        }
        match decode(bag) {
            Ok(record) => {
                summary.containers += write(&record)?;
                summary.upserted += 1;
            }
            Err(err) => {
                log::warn!("Skipping {}: {}", R::KIND, err);
                summary.errors.push(err);
            }
        }
    }
    Ok(summary)
}
