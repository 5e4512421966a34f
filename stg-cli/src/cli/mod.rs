// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for STG
//!
//! Provides schema checking and validation of graph data files.

pub mod commands;
pub mod data;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_check, handle_validate};
