//! Canvas CLI - Command-line interface for Canvas
//!
//! Builds the landscape graph of an OutSystems factory from its dataset
//! exports and writes it as JSON and Neo4j import CSV.

use canvas_graph::BuildOptions;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "canvas")]
#[command(author = "Canvas Contributors")]
#[command(version)]
#[command(about = "Landscape graphs for OutSystems factories", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Dataset files and build switches. Combined with `.canvas/config.json`.
#[derive(Args)]
struct DatasetArgs {
    /// Project directory holding .canvas/config.json
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Application group (domain) dataset; repeatable
    #[arg(short = 'g', long = "grouping")]
    structure: Vec<PathBuf>,

    /// Consumer/producer dependency dataset; repeatable
    #[arg(short, long)]
    dependencies: Vec<PathBuf>,

    /// Integration and service API usage dataset; repeatable
    #[arg(short, long)]
    integration: Vec<PathBuf>,

    /// Module details dataset; repeatable
    #[arg(short = 'm', long)]
    details: Vec<PathBuf>,

    /// Include "layer" nodes between applications and sublayers
    #[arg(short, long)]
    layer: bool,

    /// Replace all names with placeholders
    #[arg(short, long)]
    anonymize: bool,

    /// Only keep these domains and what they depend on; repeatable
    #[arg(long = "domain")]
    domains: Vec<String>,
}

impl DatasetArgs {
    fn split(self) -> (PathBuf, config::Inputs) {
        let inputs = config::Inputs {
            structure: self.structure,
            dependencies: self.dependencies,
            integration: self.integration,
            details: self.details,
            options: BuildOptions {
                include_layer_tier: self.layer,
                anonymize: self.anonymize,
                domain_filter: self.domains,
            },
        };
        (self.project, inputs)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Canvas in the current directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Build the landscape graph and write it to disk
    Build {
        #[command(flatten)]
        datasets: DatasetArgs,

        /// Directory for graph.json, nodes.csv and relationships.csv
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Build the landscape graph and check it
    Validate {
        #[command(flatten)]
        datasets: DatasetArgs,
    },

    /// Show node and edge counts
    Stats {
        #[command(flatten)]
        datasets: DatasetArgs,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Build { datasets, output } => {
            let (project, inputs) = datasets.split();
            commands::build(&project, inputs, &output)
        }
        Commands::Validate { datasets } => {
            let (project, inputs) = datasets.split();
            commands::validate(&project, inputs)
        }
        Commands::Stats { datasets, json } => {
            let (project, inputs) = datasets.split();
            commands::stats(&project, inputs, json)
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
