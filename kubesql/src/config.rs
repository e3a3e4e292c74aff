// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordinator configuration and retention policy

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wait for a query before the coordinator refreshes on its own
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on how long a submitter waits for its query to complete
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on joining the background thread at shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for [`crate::QueryCoordinator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// How long the background loop waits for a query before refreshing anyway
    pub idle_timeout: Duration,

    /// How long `submit` waits for the completion signal
    pub response_timeout: Duration,

    /// How long `shutdown` waits for the background thread to stop
    pub shutdown_timeout: Duration,

    /// What happens to rows whose resource vanished from the cluster
    pub retention: RetentionPolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            retention: RetentionPolicy::default(),
        }
    }
}

impl CoordinatorConfig {
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }
}

/// Reconciliation policy for resources that disappear between refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep rows for vanished resources until the process exits
    #[default]
    Retain,
    /// Delete rows that a successful enumeration of their scope no longer returns
    Prune,
}

impl RetentionPolicy {
    pub fn prunes(self) -> bool {
        matches!(self, RetentionPolicy::Prune)
    }
}
