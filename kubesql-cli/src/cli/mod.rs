// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for kubesql
//!
//! Provides the interactive SQL shell (REPL) and one-off query execution
//! against an in-memory mirror of the cluster.

pub mod commands;
pub mod output;
pub mod shell;

pub use commands::{Cli, Commands};
pub use shell::{handle_query, handle_shell};
