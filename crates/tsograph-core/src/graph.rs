//! Component graph wrapper using petgraph::StableDiGraph keyed by ComponentId

use crate::error::{GraphError, GraphResult};
use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// The component graph: directed flow edges between building components.
///
/// Node indices stay valid across removals, so the reducer can delete
/// components while other handles remain usable. There is at most one edge
/// per ordered component pair.
#[derive(Clone, Default)]
pub struct ComponentGraph {
    inner: StableDiGraph<Component, FlowEdge>,
    index: HashMap<ComponentId, NodeIndex>,
}

impl std::fmt::Debug for ComponentGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl ComponentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from node and link lists. Fails on duplicate ids or dangling links.
    pub fn from_parts(
        components: impl IntoIterator<Item = Component>,
        links: impl IntoIterator<Item = FlowLink>,
    ) -> GraphResult<Self> {
        let mut graph = ComponentGraph::new();
        for component in components {
            graph.add_component(component)?;
        }
        for link in links {
            graph.add_flow_with(&link.source, &link.target, link.aggregated_nodes)?;
        }
        Ok(graph)
    }

    pub fn from_document(document: GraphDocument) -> GraphResult<Self> {
        Self::from_parts(document.nodes, document.links)
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.components().cloned().collect(),
            links: self.links(),
        }
    }

    /// Add a component. Ids must be unique.
    pub fn add_component(&mut self, component: Component) -> GraphResult<()> {
        if self.index.contains_key(&component.id) {
            return Err(GraphError::DuplicateComponent(component.id));
        }
        let id = component.id.clone();
        let idx = self.inner.add_node(component);
        self.index.insert(id, idx);
        Ok(())
    }

    /// Add a flow edge without provenance. Adding an existing edge is a no-op.
    pub fn add_flow(&mut self, source: &ComponentId, target: &ComponentId) -> GraphResult<()> {
        self.add_flow_with(source, target, BTreeSet::new())
    }

    /// Add a flow edge carrying `aggregated` provenance.
    ///
    /// When the edge already exists the provenance is merged into it.
    pub fn add_flow_with(
        &mut self,
        source: &ComponentId,
        target: &ComponentId,
        aggregated: BTreeSet<ComponentId>,
    ) -> GraphResult<()> {
        let from = self.node_index(source, source, target)?;
        let to = self.node_index(target, source, target)?;
        match self.inner.find_edge(from, to) {
            Some(edge) => {
                if let Some(weight) = self.inner.edge_weight_mut(edge) {
                    weight.aggregated_nodes.extend(aggregated);
                }
            }
            None => {
                self.inner.add_edge(
                    from,
                    to,
                    FlowEdge {
                        aggregated_nodes: aggregated,
                    },
                );
            }
        }
        Ok(())
    }

    fn node_index(
        &self,
        id: &ComponentId,
        source: &ComponentId,
        target: &ComponentId,
    ) -> GraphResult<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownEndpoint {
                upstream: source.clone(),
                downstream: target.clone(),
                missing: id.clone(),
            })
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.index.contains_key(id)
    }

    /// Get a component by ID.
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.index
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    /// Total number of components.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of flow edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Snapshot of all component ids in insertion order.
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.components().map(|c| c.id.clone()).collect()
    }

    /// Iterate over all flow edges as (source, target, edge).
    pub fn flows(&self) -> impl Iterator<Item = (&ComponentId, &ComponentId, &FlowEdge)> {
        self.inner.edge_indices().filter_map(move |edge| {
            let (source, target) = self.inner.edge_endpoints(edge)?;
            Some((&self.inner[source].id, &self.inner[target].id, &self.inner[edge]))
        })
    }

    /// Flow edges as owned node/link records.
    pub fn links(&self) -> Vec<FlowLink> {
        self.flows()
            .map(|(source, target, edge)| FlowLink {
                source: source.clone(),
                target: target.clone(),
                aggregated_nodes: edge.aggregated_nodes.clone(),
            })
            .collect()
    }

    /// The edge from `source` to `target`, if present.
    pub fn flow(&self, source: &ComponentId, target: &ComponentId) -> Option<&FlowEdge> {
        let from = *self.index.get(source)?;
        let to = *self.index.get(target)?;
        self.inner
            .find_edge(from, to)
            .and_then(|edge| self.inner.edge_weight(edge))
    }

    pub fn has_flow(&self, source: &ComponentId, target: &ComponentId) -> bool {
        self.flow(source, target).is_some()
    }

    /// Direct upstream neighbours of a component, without duplicates or the component itself.
    pub fn predecessors(&self, id: &ComponentId) -> Vec<ComponentId> {
        self.neighbours(id, Direction::Incoming)
    }

    /// Direct downstream neighbours of a component, without duplicates or the component itself.
    pub fn successors(&self, id: &ComponentId) -> Vec<ComponentId> {
        self.neighbours(id, Direction::Outgoing)
    }

    fn neighbours(&self, id: &ComponentId, direction: Direction) -> Vec<ComponentId> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut result: Vec<NodeIndex> = self
            .inner
            .neighbors_directed(idx, direction)
            .filter(|&n| n != idx && seen.insert(n))
            .collect();
        // petgraph yields the most recently added edge first
        result.sort_unstable();
        result
            .into_iter()
            .map(|n| self.inner[n].id.clone())
            .collect()
    }

    /// Remove a component and every edge touching it.
    pub fn remove_component(&mut self, id: &ComponentId) -> Option<Component> {
        let idx = self.index.remove(id)?;
        self.inner.remove_node(idx)
    }

    /// Weakly connected regions (flow direction ignored), largest first.
    ///
    /// Ties keep the order in which the regions' first members were added.
    pub fn weakly_connected_regions(&self) -> Vec<Vec<ComponentId>> {
        self.regions_where(|_| true)
    }

    /// Weakly connected regions of the subgraph induced by `members`.
    pub fn regions_within(&self, members: &BTreeSet<ComponentId>) -> Vec<Vec<ComponentId>> {
        self.regions_where(|c| members.contains(&c.id))
    }

    fn regions_where(&self, keep: impl Fn(&Component) -> bool) -> Vec<Vec<ComponentId>> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut regions = Vec::new();

        for start in self.inner.node_indices() {
            if visited.contains(&start) || !keep(&self.inner[start]) {
                continue;
            }

            let mut stack = vec![start];
            let mut region = Vec::new();
            visited.insert(start);

            while let Some(node) = stack.pop() {
                region.push(node);
                for neighbour in self.inner.neighbors_undirected(node) {
                    if !visited.contains(&neighbour) && keep(&self.inner[neighbour]) {
                        visited.insert(neighbour);
                        stack.push(neighbour);
                    }
                }
            }

            region.sort_unstable();
            regions.push(
                region
                    .into_iter()
                    .map(|n| self.inner[n].id.clone())
                    .collect::<Vec<_>>(),
            );
        }

        // Stable sort keeps discovery order among equal sizes
        regions.sort_by(|a, b| b.len().cmp(&a.len()));
        regions
    }

    /// Declared system name → components carrying it. Components without a name are skipped.
    pub fn components_by_declared_name(&self) -> BTreeMap<String, Vec<ComponentId>> {
        let mut by_name: BTreeMap<String, Vec<ComponentId>> = BTreeMap::new();
        for component in self.components() {
            if let Some(name) = component.declared_name() {
                by_name
                    .entry(name.to_string())
                    .or_default()
                    .push(component.id.clone());
            }
        }
        by_name
    }
}
