//! Test utilities for building small component graphs

use crate::graph::ComponentGraph;
use crate::model::Component;

/// A non-aggregatable component (valve) that the reducer keeps.
pub fn anchor(id: &str) -> Component {
    Component::new(id, "IfcValve")
}

/// An aggregatable pipe segment.
pub fn pipe(id: &str) -> Component {
    Component::new(id, "IfcPipeSegment")
}

/// Graph with the given components connected in order: c0 -> c1 -> ... -> cn.
pub fn chain_graph(components: &[Component]) -> ComponentGraph {
    let mut graph = ComponentGraph::new();
    for component in components {
        graph.add_component(component.clone()).unwrap();
    }
    for pair in components.windows(2) {
        graph.add_flow(&pair[0].id, &pair[1].id).unwrap();
    }
    graph
}
