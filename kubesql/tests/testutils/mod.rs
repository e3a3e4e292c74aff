//! Test utilities for kubesql integration tests
//!
//! - bags: builders for raw resource attribute bags
//! - sources: scripted `ResourceSource` implementations (failing, slow,
//!   generation-counting)

#![allow(dead_code)]

pub mod bags;
pub mod sources;

use kubesql::{QueryExecutor, Store, Table, Value};

/// Route library logs to the test harness; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every row of every table in a stable order, for whole-store comparisons
pub fn dump(store: &Store) -> Vec<(Table, Vec<Vec<Value>>)> {
    Table::ALL
        .iter()
        .map(|table| {
            let columns = table.columns().join(", ");
            let sql = format!("SELECT {} FROM {} ORDER BY {}", columns, table.name(), columns);
            let result = QueryExecutor::execute(store, &sql).expect("dump query failed");
            let rows = result.rows.into_iter().map(|row| row.values).collect();
            (*table, rows)
        })
        .collect()
}

/// Single-column query results as strings
pub fn column(store: &Store, sql: &str) -> Vec<String> {
    let result = QueryExecutor::execute(store, sql).expect("query failed");
    result
        .rows
        .iter()
        .map(|row| row.get(0).map(|v| v.to_string()).unwrap_or_default())
        .collect()
}
