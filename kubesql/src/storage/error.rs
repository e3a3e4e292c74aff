// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage error types

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(String),

    #[error("Failed to create table {table}: {reason}")]
    Schema { table: &'static str, reason: String },

    #[error("Transaction error: {0}")]
    Transaction(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Sqlite(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
