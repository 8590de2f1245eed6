//! End-to-end enrichment: edge merging, pruning, hierarchy, interfaces and reduction

use crate::config::EnrichConfig;
use crate::error::EnrichError;
use crate::functional::classify_regions;
use crate::interfaces::detect_interfaces;
use crate::rules::NamingRules;
use crate::supplied::{apply_supplied, SuppliedHierarchy};
use crate::technical::subdivide_functional;
use serde::{Deserialize, Serialize};
use tsograph_core::{
    Component, ComponentGraph, FlowLink, GraphDocument, GraphInfo, Hierarchy, Membership,
    MembershipIndex, ReductionReport,
};

/// Result of [`enrich`].
#[derive(Debug, Clone)]
pub struct Enrichment {
    /// The graph after edge merging and pruning.
    pub graph: ComponentGraph,
    /// Statistics taken before pruning.
    pub info: GraphInfo,
    pub hierarchy: Hierarchy,
    pub membership: MembershipIndex,
    /// Reduced copy of `graph`, when reduction was requested.
    pub reduced: Option<ComponentGraph>,
    pub report: Option<ReductionReport>,
    pub pruned: usize,
    pub skipped_flows: usize,
}

/// A component together with the systems it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedComponent {
    #[serde(flatten)]
    pub component: Component,
    pub systems: Membership,
}

/// Serializable form of an [`Enrichment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDocument {
    pub nodes: Vec<EnrichedComponent>,
    pub links: Vec<FlowLink>,
    pub hierarchy: Hierarchy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced: Option<GraphDocument>,
}

impl Enrichment {
    pub fn document(&self) -> EnrichedDocument {
        let nodes = self
            .graph
            .components()
            .map(|component| EnrichedComponent {
                component: component.clone(),
                systems: self.membership.get(&component.id).cloned().unwrap_or_default(),
            })
            .collect();
        EnrichedDocument {
            nodes,
            links: self.graph.links(),
            hierarchy: self.hierarchy.clone(),
            reduced: self.reduced.as_ref().map(ComponentGraph::to_document),
        }
    }
}

/// Add `flows` whose endpoints both exist; returns how many were skipped.
pub fn merge_flows(graph: &mut ComponentGraph, flows: &[FlowLink]) -> usize {
    let mut skipped = 0;
    for link in flows {
        if let Err(e) = graph.add_flow_with(&link.source, &link.target, link.aggregated_nodes.clone()) {
            tracing::warn!("Skipping additional flow: {}", e);
            skipped += 1;
        }
    }
    skipped
}

/// Remove every weakly connected region with at most `threshold` components.
pub fn prune_small_regions(graph: &mut ComponentGraph, threshold: usize) -> usize {
    if threshold == 0 {
        return 0;
    }
    let mut removed = 0;
    for region in graph.weakly_connected_regions() {
        if region.len() > threshold {
            continue;
        }
        for id in &region {
            if graph.remove_component(id).is_some() {
                removed += 1;
            }
        }
    }
    tracing::debug!("Pruned {} components in regions of size <= {}", removed, threshold);
    removed
}

/// Classify, subdivide and detect interfaces using naming conventions only.
pub fn build_hierarchy(graph: &ComponentGraph, rules: &NamingRules) -> (Hierarchy, MembershipIndex) {
    let mut hierarchy = Hierarchy::new();
    let mut membership = MembershipIndex::new();
    classify_regions(graph, rules, &mut hierarchy, &mut membership);
    subdivide_functional(graph, rules, &mut hierarchy, &mut membership);
    complete_membership(graph, &mut membership);
    detect_interfaces(graph, &mut hierarchy, &membership);
    (hierarchy, membership)
}

/// Give every component of `graph` an entry, empty when it belongs to no system.
pub fn complete_membership(graph: &ComponentGraph, membership: &mut MembershipIndex) {
    for component in graph.components() {
        membership.ensure(&component.id);
    }
}

/// Run the whole enrichment on `graph`.
pub fn enrich(
    mut graph: ComponentGraph,
    extra_flows: &[FlowLink],
    supplied: Option<&SuppliedHierarchy>,
    rules: &NamingRules,
    config: &EnrichConfig,
) -> Result<Enrichment, EnrichError> {
    let skipped_flows = merge_flows(&mut graph, extra_flows);
    if !extra_flows.is_empty() {
        tracing::info!(
            "Merged {} additional flows ({} skipped)",
            extra_flows.len() - skipped_flows,
            skipped_flows
        );
    }

    let info = GraphInfo::collect(&graph);
    tracing::info!(
        "Graph has {} components, {} flows in {} regions",
        info.component_count,
        info.flow_count,
        info.regions.len()
    );

    let pruned = prune_small_regions(&mut graph, config.prune_threshold);
    if pruned > 0 {
        tracing::info!("Pruned {} components", pruned);
    }

    let (hierarchy, membership) = match supplied {
        Some(supplied) => {
            tracing::info!("Importing supplied hierarchy");
            let mut hierarchy = Hierarchy::new();
            let mut membership = MembershipIndex::new();
            apply_supplied(&graph, supplied, &mut hierarchy, &mut membership)?;
            complete_membership(&graph, &mut membership);
            detect_interfaces(&graph, &mut hierarchy, &membership);
            (hierarchy, membership)
        }
        None => build_hierarchy(&graph, rules),
    };
    tracing::info!(
        "Hierarchy: {} integrated, {} functional, {} technical systems, {} interfaces",
        hierarchy.integrated.len(),
        hierarchy.functional.len(),
        hierarchy.technical.len(),
        hierarchy.interfaces.len()
    );

    let (reduced, report) = if config.reduce {
        let mut reduced = graph.clone();
        let report = config.reducer().reduce(&mut reduced);
        tracing::info!(
            "Reduced graph to {} components in {} passes",
            reduced.node_count(),
            report.passes
        );
        (Some(reduced), Some(report))
    } else {
        (None, None)
    };

    Ok(Enrichment {
        graph,
        info,
        hierarchy,
        membership,
        reduced,
        report,
        pruned,
        skipped_flows,
    })
}
