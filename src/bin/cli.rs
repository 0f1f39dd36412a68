// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solidgraph CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solidgraph::cli::{RenderSummary, Reporter};
use solidgraph::geometry::analyze;
use solidgraph::{io, Kernel, ReferencePolicy, RenderConfig, StlEncoding};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "solidgraph")]
#[command(about = "Solidgraph - procedural CSG modeling graph evaluator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./solidgraph.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output (repeat for trace logging)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an XML description to STL
    Render {
        /// Input description file
        input: PathBuf,

        /// Output STL file
        #[arg(short, long)]
        output: PathBuf,

        /// Node to render instead of the description's output
        #[arg(short, long)]
        node: Option<String>,

        /// STL encoding (binary, ascii)
        #[arg(short, long)]
        encoding: Option<StlEncoding>,

        /// Reference policy (strict, deferred)
        #[arg(long)]
        policy: Option<ReferencePolicy>,
    },

    /// Evaluate a description and print mesh statistics
    Inspect {
        /// Input description file
        input: PathBuf,

        /// Node to inspect instead of the description's output
        #[arg(short, long)]
        node: Option<String>,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,

        /// Reference policy (strict, deferred)
        #[arg(long)]
        policy: Option<ReferencePolicy>,
    },

    /// Parse a description and output its declarations as JSON
    Parse {
        /// Input description file
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render {
            input,
            output,
            node,
            encoding,
            policy,
        } => {
            let mut config = RenderConfig::load_from(cli.config.as_deref())?;
            if let Some(encoding) = encoding {
                config.stl_encoding = encoding;
            }
            if let Some(policy) = policy {
                config.reference_policy = policy;
            }
            render_command(&input, &output, node.as_deref(), &config)
        }
        Commands::Inspect {
            input,
            node,
            json,
            policy,
        } => {
            let mut config = RenderConfig::load_from(cli.config.as_deref())?;
            if let Some(policy) = policy {
                config.reference_policy = policy;
            }
            inspect_command(&input, node.as_deref(), json, &config)
        }
        Commands::Parse { input, output } => parse_command(&input, output.as_deref()),
        Commands::Version => {
            println!("solidgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_kernel(input: &Path, config: &RenderConfig) -> Result<Kernel> {
    let description = io::import_description(input)?;
    log::info!(
        "{}: {} declarations, {} references",
        input.display(),
        description.declarations.len(),
        config.reference_policy
    );
    Kernel::from_description(&description, config)
        .with_context(|| format!("Failed to build graph from {}", input.display()))
}

/// Name of the node a command acts on
fn target_node(kernel: &Kernel, node: Option<&str>) -> Result<String> {
    match node.or_else(|| kernel.graph().output_name()) {
        Some(name) => Ok(name.to_string()),
        None => anyhow::bail!("description declares no nodes"),
    }
}

fn render_command(input: &Path, output: &Path, node: Option<&str>, config: &RenderConfig) -> Result<()> {
    let mut kernel = load_kernel(input, config)?;
    let target = target_node(&kernel, node)?;

    let start = Instant::now();
    let mesh = kernel
        .render_node(&target)
        .with_context(|| format!("Failed to evaluate '{}'", target))?;
    let render_time = start.elapsed();

    if mesh.is_empty() {
        Reporter::report_warning(&format!("'{}' evaluated to an empty mesh", target));
    }

    let export_start = Instant::now();
    io::export_stl(&mesh, output, config.stl_encoding)?;
    let export_time = export_start.elapsed();

    Reporter::report_render(&RenderSummary {
        input: &input.display().to_string(),
        output: &output.display().to_string(),
        node: &target,
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        computed_nodes: kernel.computed_count(),
        render_time,
        export_time,
    });

    Ok(())
}

fn inspect_command(input: &Path, node: Option<&str>, json: bool, config: &RenderConfig) -> Result<()> {
    let mut kernel = load_kernel(input, config)?;
    let target = target_node(&kernel, node)?;
    let mesh = kernel
        .render_node(&target)
        .with_context(|| format!("Failed to evaluate '{}'", target))?;

    let stats = analyze(&mesh);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        stats.print(&target);
    }
    Ok(())
}

fn parse_command(input: &Path, output: Option<&Path>) -> Result<()> {
    let description = io::import_description(input)?;
    let json = serde_json::to_string_pretty(&description)?;

    // Output to file or stdout
    if let Some(output_path) = output {
        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Reporter::success(&format!("Declarations written to {}", output_path.display()));
    } else {
        println!("{}", json);
    }

    Ok(())
}
