// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordinator error types

use crate::exec::QueryError;
use crate::storage::StorageError;
use crate::sync::SyncError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CoordinatorError {
    /// The engine rejected the query; the session can continue
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// No completion signal within the response timeout
    #[error("Coordinator unavailable: query not completed within {0:?}")]
    Timeout(Duration),

    /// An earlier request is still waiting in the hand-off slot
    #[error("Coordinator busy: a previous query is still pending")]
    Busy,

    /// The background thread is gone
    #[error("Coordinator unavailable: background thread has stopped")]
    Unavailable,

    #[error("Startup failed: {0}")]
    Startup(String),

    /// The background thread did not stop cleanly; fatal
    #[error("Shutdown failed: {0}")]
    Shutdown(String),
}

impl From<StorageError> for CoordinatorError {
    fn from(err: StorageError) -> Self {
        CoordinatorError::Startup(err.to_string())
    }
}

impl From<SyncError> for CoordinatorError {
    fn from(err: SyncError) -> Self {
        CoordinatorError::Startup(err.to_string())
    }
}

impl CoordinatorError {
    /// Whether the session can keep going after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CoordinatorError::Startup(_) | CoordinatorError::Shutdown(_)
        )
    }
}
