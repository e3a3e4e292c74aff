// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use kubesql::{QueryResult, Value};

use super::commands::OutputFormat;

/// Result formatter for different output formats
pub struct ResultFormatter;

impl ResultFormatter {
    /// Format query results in the specified format
    pub fn format(result: &QueryResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(result),
            OutputFormat::Json => Self::format_json(result),
            OutputFormat::Csv => Self::format_csv(result),
        }
    }

    /// Format results as a table using comfy-table
    fn format_table(result: &QueryResult) -> String {
        let mut output = String::new();

        if result.is_statement() {
            output.push_str(&format!(
                "{}\n",
                format!("{} row(s) affected", result.rows_affected).green()
            ));
        } else if result.rows.is_empty() {
            output.push_str(&format!("{}\n", "No results found".yellow()));
        } else {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);

            let header_cells: Vec<Cell> = result
                .columns
                .iter()
                .map(|col| Cell::new(col).fg(Color::Green))
                .collect();
            table.set_header(header_cells);

            for row in &result.rows {
                let row_values: Vec<String> = (0..result.columns.len())
                    .map(|i| {
                        row.get(i)
                            .map(Value::to_string)
                            .unwrap_or_else(|| "NULL".to_string())
                    })
                    .collect();
                table.add_row(row_values);
            }

            output.push_str(&table.to_string());
            output.push('\n');
            output.push_str(&format!(
                "{} row(s) in {} ms\n",
                result.rows.len(),
                result.execution_time_ms
            ));
        }

        if !result.warnings.is_empty() {
            output.push_str(&format!("\n{}\n", "Warnings:".bold().yellow()));
            for (i, warning) in result.warnings.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, warning.yellow()));
            }
        }

        output
    }

    /// Format results as JSON, one object per row keyed by column name
    fn format_json(result: &QueryResult) -> String {
        let rows: Vec<serde_json::Value> = result
            .rows
            .iter()
            .map(|row| {
                let mut row_map = serde_json::Map::new();
                for (i, col) in result.columns.iter().enumerate() {
                    let value = row
                        .get(i)
                        .map(Self::value_to_json)
                        .unwrap_or(serde_json::Value::Null);
                    row_map.insert(col.clone(), value);
                }
                serde_json::Value::Object(row_map)
            })
            .collect();

        let mut json_obj = serde_json::json!({
            "status": "success",
            "columns": result.columns,
            "rows": rows,
            "rows_affected": result.rows_affected,
            "execution_time_ms": result.execution_time_ms,
        });

        if !result.warnings.is_empty() {
            if let serde_json::Value::Object(ref mut map) = json_obj {
                map.insert("warnings".to_string(), serde_json::json!(result.warnings));
            }
        }

        serde_json::to_string_pretty(&json_obj).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize results to JSON\"}".to_string()
        })
    }

    /// Format results as CSV
    fn format_csv(result: &QueryResult) -> String {
        let mut output = String::new();

        output.push_str(&result.columns.join(","));
        output.push('\n');

        for row in &result.rows {
            let row_values: Vec<String> = (0..result.columns.len())
                .map(|i| row.get(i).map(Self::value_to_csv_string).unwrap_or_default())
                .collect();
            output.push_str(&row_values.join(","));
            output.push('\n');
        }

        if !result.warnings.is_empty() {
            output.push_str("\n# Warnings:\n");
            for (i, warning) in result.warnings.iter().enumerate() {
                output.push_str(&format!("# {}. {}\n", i + 1, warning));
            }
        }

        output
    }

    fn value_to_json(value: &Value) -> serde_json::Value {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Integer(i) => serde_json::json!(i),
            Value::Real(r) => serde_json::json!(r),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Blob(b) => serde_json::json!(b),
        }
    }

    /// Convert a Value to a CSV-safe string; NULL becomes an empty field
    fn value_to_csv_string(value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        let s = value.to_string();
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s
        }
    }
}
