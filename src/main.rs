//! tsograph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "tsograph")]
#[command(about = "Enrich building-services component graphs with a system hierarchy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify systems, detect interfaces and optionally reduce the graph
    Enrich {
        /// Graph files (node/link JSON); several files are merged
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Additional flow edges to merge before enrichment
        #[arg(long)]
        add_edges: Option<PathBuf>,

        /// Use this system hierarchy instead of the naming conventions
        #[arg(long)]
        hierarchy: Option<PathBuf>,

        /// Drop weakly connected regions with at most R components
        #[arg(short = 'r', long = "prune")]
        prune: Option<usize>,

        /// Also write a topologically reduced copy of the graph
        #[arg(long)]
        reduce: bool,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (defaults to ENRICHED_<first input> next to it)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print statistics about a graph
    Info {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("tsograph={}", log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("tsograph v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Enrich {
            inputs,
            add_edges,
            hierarchy,
            prune,
            reduce,
            config,
            output,
        } => commands::enrich(commands::EnrichArgs {
            inputs,
            add_edges,
            hierarchy,
            prune,
            reduce,
            config,
            output,
        }),
        Commands::Info { inputs, json } => commands::info(&inputs, json),
    }
}
