// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! STG CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --verbose wins over --log-level; RUST_LOG still applies per module
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "STG".bold().green(), stg::VERSION);
            println!("Schema templates for typed property graphs");
            Ok(())
        }

        Commands::Check { schema } => cli::handle_check(&schema),

        Commands::Validate {
            schema,
            data,
            mode,
            fail_fast,
        } => cli::handle_validate(&schema, &data, mode.into(), fail_fast),
    }
}
