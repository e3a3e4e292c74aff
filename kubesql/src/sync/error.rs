// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Synchronizer error types

use crate::storage::StorageError;
use thiserror::Error;

/// A refresh that did not commit; the store keeps its previous contents
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Refresh cancelled")]
    Cancelled,
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        SyncError::Storage(err.to_string())
    }
}
