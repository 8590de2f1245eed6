use std::path::PathBuf;
use thiserror::Error;
use tsograph_core::{GraphError, SystemId, SystemRank};

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Invalid pattern {pattern:?} for {label}: {source}")]
    InvalidPattern {
        label: String,
        pattern: String,
        source: regex::Error,
    },

    #[error("Unknown functional system label: {0}")]
    UnknownFunctionalLabel(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("{rank} system {parent} lists child {child} which is not a {expected} system")]
    DanglingChild {
        rank: SystemRank,
        parent: SystemId,
        child: SystemId,
        expected: SystemRank,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
