// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use kubesql::{CoordinatorConfig, RetentionPolicy};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "kubesql", version, about = "SQL queries over a live mirror of cluster state")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read cluster state from a JSON snapshot instead of the live cluster
    #[arg(long, global = true, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Seconds without a query before the store is refreshed
    #[arg(long, global = true, value_name = "SECS", default_value_t = 30)]
    pub idle_timeout: u64,

    /// Seconds to wait for a query to complete
    #[arg(long, global = true, value_name = "SECS", default_value_t = 10)]
    pub query_timeout: u64,

    /// Seconds to wait for the background thread to stop
    #[arg(long, global = true, value_name = "SECS", default_value_t = 30)]
    pub shutdown_timeout: u64,

    /// Delete rows for resources that no longer exist in the cluster
    #[arg(long, global = true)]
    pub prune: bool,

    /// History file (default: $HOME/.kubesql-history)
    #[arg(long, global = true, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,
}

impl Cli {
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        let retention = if self.prune {
            RetentionPolicy::Prune
        } else {
            RetentionPolicy::Retain
        };

        CoordinatorConfig::default()
            .with_idle_timeout(Duration::from_secs(self.idle_timeout))
            .with_response_timeout(Duration::from_secs(self.query_timeout))
            .with_shutdown_timeout(Duration::from_secs(self.shutdown_timeout))
            .with_retention(retention)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Run a single query and exit
    Query {
        /// SQL text
        query: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print version information
    Version,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
