//! Topology reduction: collapse pass-through pipe and duct components into direct flows

use crate::graph::ComponentGraph;
use crate::model::ComponentId;
use std::collections::{BTreeSet, HashSet};

/// Element classes that may be folded into a flow edge by default.
pub const DEFAULT_AGGREGATABLE_CLASSES: [&str; 4] = [
    "IfcPipeSegment",
    "IfcDuctSegment",
    "IfcPipeFitting",
    "IfcDuctFitting",
];

/// Outcome of a reduction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReductionReport {
    /// Number of passes, including the final pass that changed nothing.
    pub passes: usize,
    /// Components removed from the graph.
    pub removed: usize,
}

/// Collapses chains and junctions of aggregatable components.
#[derive(Debug, Clone)]
pub struct TopologyReducer {
    aggregatable: HashSet<String>,
}

impl Default for TopologyReducer {
    fn default() -> Self {
        Self::new(DEFAULT_AGGREGATABLE_CLASSES)
    }
}

impl TopologyReducer {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TopologyReducer {
            aggregatable: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_aggregatable(&self, class: &str) -> bool {
        self.aggregatable.contains(class)
    }

    /// Run passes until the component count stops changing.
    pub fn reduce(&self, graph: &mut ComponentGraph) -> ReductionReport {
        let initial = graph.node_count();
        let mut report = ReductionReport::default();

        loop {
            let before = graph.node_count();
            self.reduce_pass(graph);
            report.passes += 1;
            let after = graph.node_count();
            tracing::debug!("Reduction pass {}: {} -> {} components", report.passes, before, after);
            if after == before {
                break;
            }
        }

        report.removed = initial - graph.node_count();
        report
    }

    /// One pass over a snapshot of the component list taken at pass start.
    pub fn reduce_pass(&self, graph: &mut ComponentGraph) {
        for id in graph.component_ids() {
            let Some(component) = graph.component(&id) else {
                continue;
            };
            let aggregatable = self.is_aggregatable(&component.class);

            let pred = graph.predecessors(&id);
            let succ = graph.successors(&id);
            let mut neighbours = pred.clone();
            for s in &succ {
                if !neighbours.contains(s) {
                    neighbours.push(s.clone());
                }
            }

            if !aggregatable {
                if neighbours.is_empty() {
                    graph.remove_component(&id);
                }
                continue;
            }

            // A self-loop makes the component its own neighbour
            let looped = graph.has_flow(&id, &id);
            let degree = neighbours.len() + usize::from(looped);

            match degree {
                // Dangling segment or dead-end stub
                0 | 1 => {
                    graph.remove_component(&id);
                }
                _ if looped => {}
                2 if pred.len() == 1 && succ.len() == 1 => {
                    let mut provenance = BTreeSet::new();
                    collect_provenance(graph, &pred[0], &id, &mut provenance);
                    collect_provenance(graph, &id, &succ[0], &mut provenance);
                    splice(graph, &id, &pred[0], &succ[0], provenance);
                }
                2 => {
                    let (first, second) = (&neighbours[0], &neighbours[1]);
                    let mut provenance = BTreeSet::new();
                    collect_provenance(graph, &id, first, &mut provenance);
                    collect_provenance(graph, first, &id, &mut provenance);
                    collect_provenance(graph, &id, second, &mut provenance);
                    collect_provenance(graph, second, &id, &mut provenance);
                    splice(graph, &id, first, second, provenance);
                }
                // Branching and self-looped nodes stay
                _ => {}
            }
        }
    }
}

fn collect_provenance(
    graph: &ComponentGraph,
    source: &ComponentId,
    target: &ComponentId,
    into: &mut BTreeSet<ComponentId>,
) {
    if let Some(edge) = graph.flow(source, target) {
        into.extend(edge.aggregated_nodes.iter().cloned());
    }
}

fn splice(
    graph: &mut ComponentGraph,
    removed: &ComponentId,
    source: &ComponentId,
    target: &ComponentId,
    mut provenance: BTreeSet<ComponentId>,
) {
    provenance.insert(removed.clone());
    graph.remove_component(removed);
    if let Err(e) = graph.add_flow_with(source, target, provenance) {
        // Both endpoints were read from the live graph just above
        tracing::error!("Lost spliced flow around {}: {}", removed, e);
    }
}

/// Reduce `graph` in place with the default aggregatable classes.
pub fn reduce_topology(graph: &mut ComponentGraph) -> ReductionReport {
    TopologyReducer::default().reduce(graph)
}
