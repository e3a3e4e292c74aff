// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query executor - hands query text to SQLite and collects the result
//!
//! The executor does not classify statements. Anything the engine accepts is
//! run: statements with result columns produce rows, everything else reports
//! the number of changed rows.

use super::error::QueryError;
use super::result::{QueryResult, Row, Value};
use crate::storage::Store;
use rusqlite::Connection;
use std::time::Instant;

pub struct QueryExecutor;

impl QueryExecutor {
    /// Execute one statement against the store
    pub fn execute(store: &Store, query: &str) -> Result<QueryResult, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::Empty);
        }

        let conn = store.connection();
        let started = Instant::now();
        let outcome = Self::run(conn, query);
        let elapsed = started.elapsed();

        // A refresh needs autocommit mode to open its own transaction.
        let rolled_back = Self::close_dangling_transaction(conn);

        let mut result = outcome?;
        result.execution_time_ms = elapsed.as_millis() as u64;
        if rolled_back {
            result.add_warning(
                "Open transaction was rolled back; the store only accepts self-contained statements"
                    .to_string(),
            );
        }
        log::debug!(
            "Executed query in {} ms ({} rows)",
            result.execution_time_ms,
            result.rows.len()
        );
        Ok(result)
    }

    fn run(conn: &Connection, query: &str) -> Result<QueryResult, QueryError> {
        let mut stmt = conn.prepare(query)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        if columns.is_empty() {
            let affected = stmt.execute([])?;
            let mut result = QueryResult::new(columns);
            result.rows_affected = affected;
            return Ok(result);
        }

        let width = columns.len();
        let mut result = QueryResult::new(columns);
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|i| row.get_ref(i).map(Value::from))
                .collect::<Result<Vec<_>, _>>()?;
            result.rows.push(Row::new(values));
        }
        Ok(result)
    }

    fn close_dangling_transaction(conn: &Connection) -> bool {
        if conn.is_autocommit() {
            return false;
        }
        match conn.execute_batch("ROLLBACK") {
            Ok(()) => {
                log::warn!("Rolled back transaction left open by query");
                true
            }
            Err(e) => {
                log::error!("Failed to roll back transaction left open by query: {}", e);
                false
            }
        }
    }
}
