// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Report formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use stg::{Schema, SchemaIssue, ValidationConfig, ValidationStats};

/// Formats schema and validation reports
pub struct ReportFormatter;

impl ReportFormatter {
    /// Node and edge types of a schema with their connection rules
    pub fn schema_summary(schema: &Schema) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Schema is valid".bold().green()));
        output.push_str(&format!(
            "Node types: {}, edge types: {}, connections: {}\n\n",
            schema.node_count(),
            schema.edge_count(),
            schema.connection_count()
        ));

        let mut types = Table::new();
        types.load_preset(UTF8_FULL);
        types.set_header(vec![
            Cell::new("Kind").fg(Color::Green),
            Cell::new("Type").fg(Color::Green),
            Cell::new("Properties").fg(Color::Green),
        ]);
        let mut nodes: Vec<_> = schema.node_types().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        let mut edges: Vec<_> = schema.edge_types().collect();
        edges.sort_by(|a, b| a.name.cmp(&b.name));
        for definition in nodes.into_iter().chain(edges) {
            let mut properties: Vec<String> = definition
                .properties
                .values()
                .map(|p| format!("{}: {}", p.name, p.descriptor))
                .collect();
            properties.sort();
            types.add_row(vec![
                definition.kind.to_string(),
                definition.name.clone(),
                properties.join("\n"),
            ]);
        }
        output.push_str(&types.to_string());
        output.push('\n');

        let connections = schema.connections();
        if !connections.is_empty() {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                Cell::new("Main").fg(Color::Green),
                Cell::new("Edge").fg(Color::Green),
                Cell::new("Subject").fg(Color::Green),
                Cell::new("Ratio").fg(Color::Green),
            ]);
            for connection in connections {
                table.add_row(vec![
                    connection.main,
                    connection.edge,
                    connection.subject,
                    connection.bounds.to_string(),
                ]);
            }
            output.push('\n');
            output.push_str(&table.to_string());
            output.push('\n');
        }
        output
    }

    /// Every issue found while building a schema, one per line
    pub fn schema_issues(issues: &[SchemaIssue]) -> String {
        let mut output = format!(
            "{}\n",
            format!("Schema has {} issue(s):", issues.len()).bold().red()
        );
        for issue in issues {
            output.push_str(&format!("  {}\n", issue.to_string().red()));
        }
        output
    }

    /// Batch statistics table followed by recorded errors and warnings
    pub fn validation_report(stats: &ValidationStats, config: &ValidationConfig) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n",
            format!("Validation Results ({} mode)", config.mode).bold().green()
        ));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Metric").fg(Color::Green),
            Cell::new("Value").fg(Color::Green),
        ]);
        table.add_row(vec!["Total records".to_string(), stats.total_records.to_string()]);
        table.add_row(vec![
            "Valid records".to_string(),
            format!("{} ({:.2}%)", stats.valid_records, stats.success_rate()),
        ]);
        table.add_row(vec!["Invalid records".to_string(), stats.invalid_records.to_string()]);
        table.add_row(vec!["Skipped records".to_string(), stats.skipped_records.to_string()]);
        output.push_str(&table.to_string());
        output.push('\n');

        if !stats.errors.is_empty() {
            output.push_str(&format!("\n{}\n", "Errors:".bold().red()));
            for (i, error) in stats.errors.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, error.red()));
            }
        }
        if !stats.warnings.is_empty() {
            output.push_str(&format!("\n{}\n", "Warnings:".bold().yellow()));
            for (i, warning) in stats.warnings.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, warning.yellow()));
            }
        }
        output
    }
}
