// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query Coordinator - serializes refreshes and queries over one store
//!
//! The QueryCoordinator is the only entry point that touches the store after
//! startup. It owns the background thread's lifetime and the shutdown sequence.

pub mod cancellation;
pub mod error;
pub mod query_coordinator;

pub use cancellation::CancellationToken;
pub use error::CoordinatorError;
pub use query_coordinator::{CoordinatorState, CoordinatorStats, QueryCoordinator};
