// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query error types

use thiserror::Error;

/// A query the engine refused; the store is left as it was
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Empty query")]
    Empty,

    #[error("{0}")]
    Engine(String),
}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        QueryError::Engine(err.to_string())
    }
}
