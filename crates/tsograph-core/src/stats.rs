//! Summary statistics of a component graph
//!
//! Counts components per element class and type, lists the declared systems
//! with their sizes and direct neighbours, and describes each weakly
//! connected region. Used to log what a graph contains before enrichment.

use crate::graph::ComponentGraph;
use crate::model::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Components of one element class, broken down by sub-type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
}

/// A declared system name as seen across the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredSystemInfo {
    pub components: Vec<ComponentId>,
    /// Other declared systems reached by a single flow edge.
    pub connected: BTreeSet<String>,
}

/// One weakly connected region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub components: Vec<ComponentId>,
    pub declared_systems: BTreeSet<String>,
    /// Number of members without a declared system.
    pub undeclared: usize,
}

/// Everything the inspector reports about a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInfo {
    pub component_count: usize,
    pub flow_count: usize,
    pub classes: BTreeMap<String, ClassCount>,
    pub declared_systems: BTreeMap<String, DeclaredSystemInfo>,
    pub undeclared_components: usize,
    pub regions: Vec<RegionInfo>,
}

impl GraphInfo {
    pub fn collect(graph: &ComponentGraph) -> Self {
        let mut info = GraphInfo {
            component_count: graph.node_count(),
            flow_count: graph.edge_count(),
            ..Default::default()
        };

        for component in graph.components() {
            let class = info.classes.entry(component.class.clone()).or_default();
            class.total += 1;
            *class.by_type.entry(component.kind.clone().unwrap_or_default()).or_insert(0) += 1;

            match component.declared_name() {
                Some(name) => info
                    .declared_systems
                    .entry(name.to_string())
                    .or_default()
                    .components
                    .push(component.id.clone()),
                None => info.undeclared_components += 1,
            }
        }

        for (source, target, _) in graph.flows() {
            let source_name = graph.component(source).and_then(|c| c.declared_name());
            let target_name = graph.component(target).and_then(|c| c.declared_name());
            if let (Some(a), Some(b)) = (source_name, target_name) {
                if a == b {
                    continue;
                }
                if let Some(entry) = info.declared_systems.get_mut(a) {
                    entry.connected.insert(b.to_string());
                }
                if let Some(entry) = info.declared_systems.get_mut(b) {
                    entry.connected.insert(a.to_string());
                }
            }
        }

        for region in graph.weakly_connected_regions() {
            let mut declared_systems = BTreeSet::new();
            let mut undeclared = 0;
            for id in &region {
                match graph.component(id).and_then(|c| c.declared_name()) {
                    Some(name) => {
                        declared_systems.insert(name.to_string());
                    }
                    None => undeclared += 1,
                }
            }
            info.regions.push(RegionInfo {
                components: region,
                declared_systems,
                undeclared,
            });
        }

        info
    }
}

impl fmt::Display for GraphInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} components, {} flows, {} regions",
            self.component_count,
            self.flow_count,
            self.regions.len()
        )?;
        for (class, count) in &self.classes {
            writeln!(f, "  {:<24} {}", class, count.total)?;
        }
        for (name, system) in &self.declared_systems {
            write!(f, "  [{}] {} components", name, system.components.len())?;
            if !system.connected.is_empty() {
                let connected: Vec<&str> = system.connected.iter().map(String::as_str).collect();
                write!(f, " -> {}", connected.join(", "))?;
            }
            writeln!(f)?;
        }
        if self.undeclared_components > 0 {
            writeln!(f, "  {} components without a declared system", self.undeclared_components)?;
        }
        Ok(())
    }
}
