//! System hierarchy enrichment: naming rules, functional and technical systems, interfaces

pub mod config;
pub mod error;
pub mod functional;
pub mod interfaces;
pub mod pipeline;
pub mod rules;
pub mod supplied;
pub mod technical;


pub use config::EnrichConfig;
pub use error::{ConfigError, EnrichError, HierarchyError, RuleError};
pub use functional::classify_regions;
pub use interfaces::detect_interfaces;
pub use pipeline::{
    build_hierarchy, enrich, merge_flows, prune_small_regions, EnrichedComponent,
    EnrichedDocument, Enrichment,
};
pub use rules::{FunctionalKind, NamingRules, RuleTables};
pub use supplied::{apply_supplied, SuppliedHierarchy, SuppliedSystem};
pub use technical::subdivide_functional;
