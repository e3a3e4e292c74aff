// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Synchronizer - one full enumeration of the cluster into the store
//!
//! A refresh lists nodes, then namespaces, then pods, services and
//! replication controllers per namespace. All writes go through a single
//! transaction, so readers see either the previous snapshot or the new one.
//!
//! A failed listing skips only that kind (and namespace) for this pass. A
//! failed resource skips only that resource. Storage failures and
//! cancellation roll the whole pass back.

use super::error::SyncError;
use super::report::RefreshReport;
use crate::config::RetentionPolicy;
use crate::coordinator::CancellationToken;
use crate::projector::{namespace_names, ProjectionSummary, Projector};
use crate::resource::AttributeBag;
use crate::schema::ResourceKind;
use crate::source::{EnumerationError, ResourceSource};
use crate::storage::{StorageResult, Store, StoreWriter};
use std::collections::HashSet;
use std::sync::Arc;

pub struct Synchronizer {
    source: Arc<dyn ResourceSource>,
    retention: RetentionPolicy,
}

impl Synchronizer {
    pub fn new(source: Arc<dyn ResourceSource>, retention: RetentionPolicy) -> Self {
        Self { source, retention }
    }

    /// Run one refresh pass and commit it
    pub fn refresh(
        &self,
        store: &mut Store,
        cancel: &CancellationToken,
    ) -> Result<RefreshReport, SyncError> {
        let mut report = RefreshReport::begin();
        let writer = store.writer()?;

        if let Err(err) = self.apply(&writer, cancel, &mut report) {
            if let Err(rollback_err) = writer.rollback() {
                log::error!("Failed to roll back refresh: {}", rollback_err);
            }
            return Err(err);
        }

        writer.commit()?;
        report.finish();
        log::info!("Refresh completed: {}", report);
        Ok(report)
    }

    fn apply(
        &self,
        writer: &StoreWriter<'_>,
        cancel: &CancellationToken,
        report: &mut RefreshReport,
    ) -> Result<(), SyncError> {
        let projector = Projector::new(writer);

        self.step(
            writer,
            report,
            ResourceKind::Node,
            None,
            self.source.list_nodes(),
            |bags| projector.nodes(bags),
        )?;
        checkpoint(cancel)?;

        let bags = match self.source.list_namespaces() {
            Ok(bags) => bags,
            Err(err) => {
                log::warn!("{}", err);
                report.enumeration_errors.push(err);
                return Ok(());
            }
        };

        let (namespaces, errors) = namespace_names(&bags);
        // An undecodable namespace might still own rows, so only prune
        // vanished namespaces when every entry was understood.
        if self.retention.prunes() && errors.is_empty() {
            let keep: HashSet<String> = namespaces.iter().cloned().collect();
            report.pruned += writer.prune_namespaces(&keep)?;
        }
        report.projection_errors.extend(errors);
        report.namespaces = namespaces.len();

        for namespace in &namespaces {
            checkpoint(cancel)?;
            let ns = Some(namespace.as_str());

            self.step(
                writer,
                report,
                ResourceKind::Pod,
                ns,
                self.source.list_pods(namespace),
                |bags| projector.pods(namespace, bags),
            )?;
            self.step(
                writer,
                report,
                ResourceKind::Service,
                ns,
                self.source.list_services(namespace),
                |bags| projector.services(namespace, bags),
            )?;
            self.step(
                writer,
                report,
                ResourceKind::ReplicationController,
                ns,
                self.source.list_replication_controllers(namespace),
                |bags| projector.replication_controllers(namespace, bags),
            )?;
        }

        checkpoint(cancel)
    }

    /// Project one listing, then prune its scope if the policy asks for it
    fn step<P>(
        &self,
        writer: &StoreWriter<'_>,
        report: &mut RefreshReport,
        kind: ResourceKind,
        namespace: Option<&str>,
        listing: Result<Vec<AttributeBag>, EnumerationError>,
        project: P,
    ) -> Result<(), SyncError>
    where
        P: FnOnce(&[AttributeBag]) -> StorageResult<ProjectionSummary>,
    {
        let bags = match listing {
            Ok(bags) => bags,
            Err(err) => {
                log::warn!("{}", err);
                report.enumeration_errors.push(err);
                return Ok(());
            }
        };

        let summary = project(&bags)?;
        if self.retention.prunes() {
            report.pruned += writer.prune(kind, namespace, &summary.seen)?;
        }
        report.record(kind, summary);
        Ok(())
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<(), SyncError> {
    if cancel.is_cancelled() {
        log::debug!("Refresh cancelled, rolling back");
        Err(SyncError::Cancelled)
    } else {
        Ok(())
    }
}
