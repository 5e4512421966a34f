// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command handlers

use colored::Colorize;
use std::fs::File;
use std::path::Path;

use stg::{
    BatchValidator, Duplet, Edge, EnforcementMode, Graph, Node, Schema, SchemaError, Triplet,
    Validatable, ValidationConfig,
};

use super::data::GraphData;
use super::output::ReportFormatter;

fn load_schema(path: &Path) -> Result<Schema, Box<dyn std::error::Error>> {
    log::debug!("Loading schema from {:?}", path);
    let file = File::open(path).map_err(|e| format!("can't open schema {:?}: {}", path, e))?;
    match Schema::from_reader(file) {
        Ok(schema) => Ok(schema),
        Err(SchemaError::Invalid(issues)) => {
            print!("{}", ReportFormatter::schema_issues(issues.as_slice()));
            Err(format!("schema {:?} has {} issue(s)", path, issues.len()).into())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn handle_check(schema: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let schema = load_schema(schema)?;
    print!("{}", ReportFormatter::schema_summary(&schema));
    Ok(())
}

pub fn handle_validate(
    schema: &Path,
    data: &Path,
    mode: EnforcementMode,
    fail_fast: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = load_schema(schema)?;
    let data = GraphData::load(data, &schema)?;
    log::info!(
        "Loaded {} node(s) and {} triplet(s)",
        data.nodes.len(),
        data.triplets.len()
    );

    let config = ValidationConfig::default()
        .with_mode(mode)
        .with_stop_on_first_error(fail_fast);
    let stats = validate_data(&schema, &data, config.clone());

    print!("{}", ReportFormatter::validation_report(&stats, &config));
    if stats.invalid_records > 0 {
        println!();
        return Err(format!("{} record(s) failed validation", stats.invalid_records).into());
    }
    println!("\n{}", "✅ Data is valid".green());
    Ok(())
}

/// Validate every node and triplet, then the graph they form as a whole
fn validate_data(schema: &Schema, data: &GraphData, config: ValidationConfig) -> stg::ValidationStats {
    let mut batch = BatchValidator::with_config(schema, config);

    let nodes = data
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (format!("node #{}", i + 1), Validatable::from(node)));
    let shapes: Vec<TripletShape> = data.triplets.iter().map(TripletShape::of).collect();
    let triplets = shapes.iter().enumerate().flat_map(|(i, shape)| {
        let label = format!("triplet #{}", i + 1);
        shape.items().into_iter().map(move |item| (label.clone(), item))
    });
    let results = batch.validate_all(nodes.chain(triplets));

    let stopped = results.iter().any(|accepted| !accepted) && batch.config().stop_on_first_error;
    if !stopped {
        let graph = Graph::from_parts(data.nodes.clone(), data.triplets.clone());
        log::debug!(
            "Validating assembled graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        batch.validate_item("graph", &graph);
    }
    batch.stats().clone()
}

/// What a data-file triplet is checked as, following the parts it carries
enum TripletShape<'a> {
    Complete(&'a Triplet),
    /// One node plus the edge; the missing side is unknown
    Attached(Duplet),
    /// No edge, or an edge with no node
    Loose(Vec<&'a Node>, Option<&'a Edge>),
}

impl<'a> TripletShape<'a> {
    fn of(triplet: &'a Triplet) -> Self {
        match (&triplet.main, &triplet.subject, &triplet.edge) {
            (Some(_), Some(_), Some(_)) => TripletShape::Complete(triplet),
            (Some(node), None, Some(edge)) | (None, Some(node), Some(edge)) => {
                TripletShape::Attached(Duplet::new(node.clone(), edge.clone()))
            }
            (main, subject, edge) => {
                TripletShape::Loose(main.iter().chain(subject.iter()).collect(), edge.as_ref())
            }
        }
    }

    fn items(&self) -> Vec<Validatable<'_>> {
        match self {
            TripletShape::Complete(triplet) => vec![Validatable::from(*triplet)],
            TripletShape::Attached(duplet) => vec![Validatable::from(duplet)],
            TripletShape::Loose(nodes, edge) => nodes
                .iter()
                .map(|node| Validatable::from(*node))
                .chain(edge.map(Validatable::from))
                .collect(),
        }
    }
}
