// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Projection error types

use thiserror::Error;

/// A single resource could not be turned into rows; only that resource is skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("{kind} {resource}: missing required field '{path}'")]
    MissingField {
        kind: &'static str,
        resource: String,
        path: String,
    },

    #[error("{kind} {resource}: malformed resource: {reason}")]
    Malformed {
        kind: &'static str,
        resource: String,
        reason: String,
    },

    #[error(
        "pod {resource}: {declared} containers declared but {reported} container statuses reported"
    )]
    ContainerStatusMismatch {
        resource: String,
        declared: usize,
        reported: usize,
    },
}

impl ProjectionError {
    /// Identifier (namespace/name, or uid) of the offending resource
    pub fn resource(&self) -> &str {
        match self {
            ProjectionError::MissingField { resource, .. }
            | ProjectionError::Malformed { resource, .. }
            | ProjectionError::ContainerStatusMismatch { resource, .. } => resource,
        }
    }
}
