// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Relational store backing the mirrored cluster state
//!
//! The store is a single in-memory SQLite connection. It is `Send` but not
//! `Sync`: exactly one thread may own it, and the coordinator makes sure that
//! thread never runs a refresh and a query at the same time.

pub mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::{Store, StoreWriter};
