//! CLI command implementations.

use crate::config::{resolve_inputs, Config, Inputs};
use anyhow::{bail, Context, Result};
use canvas_core::records::parse_records;
use canvas_core::{Graph, GraphStats, TracingLogger};
use canvas_graph::{
    build_graph, edges_to_csv, nodes_to_csv, validate_graph, violations_graph, Datasets,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const GRAPH_FILE: &str = "graph.json";
pub const NODES_FILE: &str = "nodes.csv";
pub const EDGES_FILE: &str = "relationships.csv";

/// Initialize Canvas in a directory.
pub fn init(path: &Path) -> Result<()> {
    if Config::path(path).exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    Config::default().save(path)?;

    println!("{} Initialized Canvas in {}", "✓".green(), path.display());
    println!(
        "  List your dataset exports in {} and run {}",
        Config::path(path).display().to_string().cyan(),
        "canvas build".cyan()
    );
    Ok(())
}

/// Reads and concatenates the rows of every file of one dataset.
fn read_dataset<T: DeserializeOwned>(
    dataset: &'static str,
    files: &[PathBuf],
) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    for file in files {
        let json = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {} dataset {}", dataset, file.display()))?;
        let parsed: Vec<T> =
            parse_records(dataset, &json).with_context(|| format!("In {}", file.display()))?;
        tracing::debug!("Read {} {} rows from {}", parsed.len(), dataset, file.display());
        rows.extend(parsed);
    }
    Ok(rows)
}

fn read_optional_dataset<T: DeserializeOwned>(
    dataset: &'static str,
    files: &[PathBuf],
) -> Result<Option<Vec<T>>> {
    if files.is_empty() {
        return Ok(None);
    }
    read_dataset(dataset, files).map(Some)
}

/// Loads every dataset named by the inputs.
pub fn load_datasets(inputs: &Inputs) -> Result<Datasets> {
    if inputs.structure.is_empty() {
        bail!(
            "No application group dataset given (use --grouping or \"structure\" in the config)"
        );
    }
    if inputs.dependencies.is_empty() {
        bail!(
            "No consumer/producer dataset given (use --dependencies or \"dependencies\" in the config)"
        );
    }

    Ok(Datasets {
        structure: read_dataset("application group", &inputs.structure)?,
        dependencies: read_dataset("consumer/producer", &inputs.dependencies)?,
        integration: read_optional_dataset("integration", &inputs.integration)?,
        details: read_optional_dataset("module details", &inputs.details)?,
    })
}

/// Builds and validates the graph for a project.
fn assemble(project: &Path, flags: Inputs) -> Result<(Graph, Datasets)> {
    let inputs = resolve_inputs(project, flags)?;
    let datasets = load_datasets(&inputs)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Assembling graph...");

    let graph = build_graph(&datasets, &inputs.options, &TracingLogger);
    spinner.finish_and_clear();
    let graph = graph?;

    validate_graph(&graph, datasets.has_details()).context("Graph validation failed")?;
    Ok((graph, datasets))
}

/// Writes `graph.json`, `nodes.csv` and `relationships.csv` to `output`.
///
/// The architecture violation rules are appended to the CSV files only.
pub fn write_graph(graph: &Graph, output: &Path) -> Result<()> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let json_path = output.join(GRAPH_FILE);
    fs::write(&json_path, serde_json::to_string_pretty(graph)?)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    let violations = violations_graph();
    let nodes = [graph.nodes(), violations.nodes()].concat();
    let edges = [graph.edges(), violations.edges()].concat();

    let nodes_path = output.join(NODES_FILE);
    fs::write(&nodes_path, nodes_to_csv(&nodes, true)?)
        .with_context(|| format!("Failed to write {}", nodes_path.display()))?;
    let edges_path = output.join(EDGES_FILE);
    fs::write(&edges_path, edges_to_csv(&edges, true)?)
        .with_context(|| format!("Failed to write {}", edges_path.display()))?;

    Ok(())
}

/// Build the landscape graph and write it to disk.
pub fn build(project: &Path, flags: Inputs, output: &Path) -> Result<()> {
    println!("{}", "Building landscape graph...".cyan());
    let (graph, _) = assemble(project, flags)?;
    let stats = graph.stats();

    println!(
        "{} Built graph with {} nodes and {} edges",
        "✓".green(),
        stats.node_count.to_string().cyan(),
        stats.edge_count.to_string().cyan()
    );

    write_graph(&graph, output)?;
    println!(
        "{} Wrote {}, {} and {} to {}",
        "✓".green(),
        GRAPH_FILE,
        NODES_FILE,
        EDGES_FILE,
        output.display()
    );
    Ok(())
}

/// Build the graph and check it without writing anything.
pub fn validate(project: &Path, flags: Inputs) -> Result<()> {
    let (graph, datasets) = assemble(project, flags)?;
    println!(
        "{} Graph is valid ({} nodes, {} edges{})",
        "✓".green(),
        graph.nodes().len(),
        graph.edges().len(),
        if datasets.has_details() { ", details propagated" } else { "" }
    );
    Ok(())
}

/// Show node and edge counts.
pub fn stats(project: &Path, flags: Inputs, json: bool) -> Result<()> {
    let (graph, _) = assemble(project, flags)?;
    let stats = graph.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &GraphStats) {
    println!("{}", "Canvas Graph".cyan().bold());
    println!();
    println!("  Nodes:        {}", stats.node_count.to_string().green());
    println!("    Domains:      {}", stats.domains);
    println!("    Applications: {}", stats.applications);
    println!("    Layers:       {}", stats.layers);
    println!("    Sublayers:    {}", stats.sublayers);
    println!("    Modules:      {}", stats.modules);
    println!("  Edges:        {}", stats.edge_count.to_string().green());
    println!("    Contains:     {}", stats.contains_edges);
    println!("    Calls:        {}", stats.calls_edges);
}
