//! tsograph core: component graph model, system hierarchy types and topology reduction

pub mod aggregation;
pub mod error;
pub mod graph;
pub mod model;
pub mod stats;


#[cfg(test)]
pub mod test_utils;

pub use aggregation::{reduce_topology, ReductionReport, TopologyReducer, DEFAULT_AGGREGATABLE_CLASSES};
pub use error::{GraphError, GraphResult};
pub use graph::ComponentGraph;
pub use model::{
    AttributeBag, Component, ComponentId, DeclaredSystem, FlowEdge, FlowLink, GraphDocument, Hierarchy,
    InterfaceRecord, Membership, MembershipIndex, SystemId, SystemNode, SystemRank, SystemTable,
};
pub use stats::GraphInfo;
