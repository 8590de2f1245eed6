//! CLI command implementations

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tsograph_core::{ComponentGraph, GraphDocument, GraphInfo};
use tsograph_hierarchy::{EnrichConfig, SuppliedHierarchy};

pub struct EnrichArgs {
    pub inputs: Vec<PathBuf>,
    pub add_edges: Option<PathBuf>,
    pub hierarchy: Option<PathBuf>,
    pub prune: Option<usize>,
    pub reduce: bool,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub fn enrich(args: EnrichArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => EnrichConfig::load(path)?,
        None => EnrichConfig::default(),
    };
    if let Some(threshold) = args.prune {
        config.prune_threshold = threshold;
    }
    if args.reduce {
        config.reduce = true;
    }
    let rules = config.naming_rules()?;

    let graph = load_graph(&args.inputs)?;
    let extra_flows = match &args.add_edges {
        Some(path) => read_json::<GraphDocument>(path)?.links,
        None => Vec::new(),
    };
    let supplied = args
        .hierarchy
        .as_deref()
        .map(read_json::<SuppliedHierarchy>)
        .transpose()?;

    let result = tsograph_hierarchy::enrich(graph, &extra_flows, supplied.as_ref(), &rules, &config)?;

    let output = match args.output {
        Some(path) => path,
        None => default_output(&args.inputs[0]),
    };
    let json = serde_json::to_string_pretty(&result.document())?;
    std::fs::write(&output, json).with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Enriched graph written to {}", output.display());

    Ok(())
}

pub fn info(inputs: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let graph = load_graph(inputs)?;
    let info = GraphInfo::collect(&graph);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", info);
    }
    Ok(())
}

/// Read and merge graph files into one graph.
fn load_graph(inputs: &[PathBuf]) -> anyhow::Result<ComponentGraph> {
    let mut document = GraphDocument::default();
    for path in inputs {
        let part: GraphDocument = read_json(path)?;
        tracing::info!(
            "Loaded {} components and {} flows from {}",
            part.nodes.len(),
            part.links.len(),
            path.display()
        );
        document.merge(part);
    }
    ComponentGraph::from_document(document).context("Invalid component graph")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// `ENRICHED_<name>` next to the first input.
fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph.json".to_string());
    input.with_file_name(format!("ENRICHED_{}", name))
}
