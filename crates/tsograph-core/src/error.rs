//! Graph construction errors

use crate::model::ComponentId;
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Structural violations in the component graph handed to this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Component {0} was added twice")]
    DuplicateComponent(ComponentId),

    #[error("Flow {upstream} -> {downstream} references unknown component {missing}")]
    UnknownEndpoint {
        upstream: ComponentId,
        downstream: ComponentId,
        missing: ComponentId,
    },
}
