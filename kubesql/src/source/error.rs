// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Source error types

use super::ListKind;
use thiserror::Error;

/// One listing failed; only that kind (and namespace) is skipped this cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to list {kind}{}: {reason}", scope(.namespace))]
pub struct EnumerationError {
    pub kind: ListKind,
    pub namespace: Option<String>,
    pub reason: String,
}

fn scope(namespace: &Option<String>) -> String {
    match namespace {
        Some(ns) => format!(" in namespace {}", ns),
        None => String::new(),
    }
}

impl EnumerationError {
    pub fn new(kind: ListKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: None,
            reason: reason.into(),
        }
    }

    pub fn in_namespace(kind: ListKind, namespace: &str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: Some(namespace.to_string()),
            reason: reason.into(),
        }
    }
}

/// Failure to construct a source (snapshot file, cluster connection)
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::InvalidSnapshot(err.to_string())
    }
}
