// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for kubesql

use colored::Colorize;
use rustyline::{error::ReadlineError, CompletionType, Config, EditMode, Editor};
use std::path::PathBuf;
use std::sync::Arc;

use super::commands::{Cli, OutputFormat};
use super::output::ResultFormatter;
use kubesql::{KubeSource, QueryCoordinator, ResourceSource, SnapshotSource};

const HISTORY_FILE: &str = ".kubesql-history";
const MAX_HISTORY: usize = 1000;
const PROMPT: &str = "> ";

/// Handle the shell (REPL) command
pub fn handle_shell(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = start_coordinator(cli)?;

    println!("{}", "kubesql".bold().green());
    println!("Type 'q' or 'quit' to exit\n");

    let config = Config::builder()
        .edit_mode(EditMode::Emacs)
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .max_history_size(MAX_HISTORY)?
        .build();

    let mut rl = Editor::<(), _>::with_config(config)?;

    let history_path = cli.history.clone().unwrap_or_else(default_history_path);
    if rl.load_history(&history_path).is_err() {
        log::debug!("No history loaded from {:?}", history_path);
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let query = match classify(&line) {
            Input::Skip => continue,
            Input::Exit => break,
            Input::Query(query) => query,
        };

        rl.add_history_entry(query)?;

        match coordinator.submit(query) {
            Ok(result) => println!("{}", ResultFormatter::format(&result, OutputFormat::Table)),
            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        log::warn!("Failed to save history to {:?}: {}", history_path, e);
    }

    coordinator.shutdown()?;
    Ok(())
}

/// What the shell does with one line of input
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Skip,
    Exit,
    Query(&'a str),
}

/// Only an exact `q` or `quit` exits; every other non-empty line goes to SQLite verbatim
fn classify(line: &str) -> Input<'_> {
    match line {
        "" => Input::Skip,
        "q" | "quit" => Input::Exit,
        _ => Input::Query(line),
    }
}

/// Handle the query command (one-off query execution)
pub fn handle_query(
    cli: &Cli,
    query: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = start_coordinator(cli)?;

    let outcome = coordinator.submit(query);
    coordinator.shutdown()?;

    match outcome {
        Ok(result) => {
            println!("{}", ResultFormatter::format(&result, format));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            Err(e.into())
        }
    }
}

/// Pick the resource source and run the initial refresh
fn start_coordinator(cli: &Cli) -> Result<QueryCoordinator, Box<dyn std::error::Error>> {
    let source: Arc<dyn ResourceSource> = match &cli.snapshot {
        Some(path) => {
            log::info!("Loading cluster snapshot from {:?}", path);
            Arc::new(SnapshotSource::from_path(path)?)
        }
        None => Arc::new(KubeSource::connect()?),
    };

    let coordinator = QueryCoordinator::start(source, cli.coordinator_config())?;

    if let Some(report) = coordinator.stats().last_refresh {
        if !report.is_clean() {
            eprintln!(
                "{}",
                format!("Initial refresh reported {} error(s)", report.error_count()).yellow()
            );
        }
    }

    Ok(coordinator)
}

fn default_history_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(HISTORY_FILE),
        None => PathBuf::from(HISTORY_FILE),
    }
}
