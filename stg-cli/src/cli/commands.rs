// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use stg::EnforcementMode;

/// STG - schema templates for typed property graphs
#[derive(Parser, Debug)]
#[command(name = "stg")]
#[command(about = "Check graph schema templates and validate graph data against them")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (overridden by --verbose)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a schema template and report every problem found
    Check {
        /// Path to the schema template (.yaml)
        schema: PathBuf,
    },

    /// Validate a graph data file against a schema template
    Validate {
        /// Path to the schema template (.yaml)
        schema: PathBuf,

        /// Path to the graph data file (.yaml)
        data: PathBuf,

        /// How validation failures are treated
        #[arg(short, long, value_enum, default_value = "strict")]
        mode: ModeArg,

        /// Stop at the first rejected item
        #[arg(long)]
        fail_fast: bool,
    },

    /// Show version information
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Strict,
    Advisory,
    Disabled,
}

impl From<ModeArg> for EnforcementMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => EnforcementMode::Strict,
            ModeArg::Advisory => EnforcementMode::Advisory,
            ModeArg::Disabled => EnforcementMode::Disabled,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
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
