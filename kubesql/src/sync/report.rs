// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Refresh outcome reporting

use crate::projector::{ProjectionError, ProjectionSummary};
use crate::schema::ResourceKind;
use crate::source::EnumerationError;
use std::fmt;
use std::time::{Duration, Instant};

/// What one refresh pass wrote, pruned and failed on
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub started: Instant,
    pub duration: Duration,
    pub namespaces: usize,
    pub nodes: usize,
    pub pods: usize,
    pub containers: usize,
    pub services: usize,
    pub replication_controllers: usize,
    pub pruned: usize,
    pub enumeration_errors: Vec<EnumerationError>,
    pub projection_errors: Vec<ProjectionError>,
}

impl RefreshReport {
    pub(crate) fn begin() -> Self {
        Self {
            started: Instant::now(),
            duration: Duration::ZERO,
            namespaces: 0,
            nodes: 0,
            pods: 0,
            containers: 0,
            services: 0,
            replication_controllers: 0,
            pruned: 0,
            enumeration_errors: Vec::new(),
            projection_errors: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, kind: ResourceKind, summary: ProjectionSummary) {
        let counter = match kind {
            ResourceKind::Node => &mut self.nodes,
            ResourceKind::Pod => &mut self.pods,
            ResourceKind::Service => &mut self.services,
            ResourceKind::ReplicationController => &mut self.replication_controllers,
        };
        *counter += summary.upserted;
        self.containers += summary.containers;
        self.projection_errors.extend(summary.errors);
    }

    pub(crate) fn finish(&mut self) {
        self.duration = self.started.elapsed();
    }

    /// No listing or resource failed during the pass
    pub fn is_clean(&self) -> bool {
        self.enumeration_errors.is_empty() && self.projection_errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.enumeration_errors.len() + self.projection_errors.len()
    }
}

impl fmt::Display for RefreshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} pods ({} containers), {} services, {} replication controllers \
             across {} namespaces in {} ms",
            self.nodes,
            self.pods,
            self.containers,
            self.services,
            self.replication_controllers,
            self.namespaces,
            self.duration.as_millis()
        )?;
        if self.pruned > 0 {
            write!(f, ", {} pruned", self.pruned)?;
        }
        if !self.is_clean() {
            write!(f, ", {} errors", self.error_count())?;
        }
        Ok(())
    }
}
