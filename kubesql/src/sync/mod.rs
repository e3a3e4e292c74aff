// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Synchronization of cluster state into the store

pub mod error;
pub mod report;
pub mod synchronizer;

pub use error::SyncError;
pub use report::RefreshReport;
pub use synchronizer::Synchronizer;
