// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! kubesql CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // RUST_LOG can still override this
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command.clone().unwrap_or(Commands::Shell) {
        Commands::Version => {
            println!("{} {}", "kubesql".bold().green(), kubesql::VERSION);
            println!("SQL over a live mirror of cluster state");
            Ok(())
        }
        Commands::Shell => cli::handle_shell(&cli),
        Commands::Query { query, format } => cli::handle_query(&cli, &query, format),
    }
}
