// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution against the store

pub mod error;
pub mod executor;
pub mod result;

pub use error::QueryError;
pub use executor::QueryExecutor;
pub use result::{QueryResult, Row, Value};
