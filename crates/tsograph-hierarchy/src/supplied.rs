//! Externally supplied system hierarchy
//!
//! Instead of classifying by naming conventions, a user can hand in the
//! systems directly. Each system names the declared systems it subsumes and
//! may add or delete single components on top of them. Field names of the
//! older German-keyed export (`IS`/`FS`/`TS`, `IFC-Systems`, `Add`/`Delete`)
//! are accepted as aliases.

use crate::error::HierarchyError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tsograph_core::{
    ComponentGraph, ComponentId, Hierarchy, MembershipIndex, SystemId, SystemNode, SystemRank,
};

/// Manual corrections to the component list derived from declared names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEdits {
    #[serde(default, alias = "Add")]
    pub add: Vec<ComponentId>,
    #[serde(default, alias = "Delete")]
    pub delete: Vec<ComponentId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppliedSystem {
    #[serde(default, alias = "Classification")]
    pub classification: Option<String>,
    #[serde(default, alias = "IFC-Systems")]
    pub declared_systems: Vec<String>,
    #[serde(default, alias = "Components")]
    pub components: ComponentEdits,
    #[serde(default, alias = "FS", alias = "TS")]
    pub children: Vec<SystemId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppliedHierarchy {
    #[serde(default, alias = "IS")]
    pub integrated: BTreeMap<SystemId, SuppliedSystem>,
    #[serde(default, alias = "FS")]
    pub functional: BTreeMap<SystemId, SuppliedSystem>,
    #[serde(default, alias = "TS")]
    pub technical: BTreeMap<SystemId, SuppliedSystem>,
}

impl SuppliedHierarchy {
    pub fn rank(&self, rank: SystemRank) -> &BTreeMap<SystemId, SuppliedSystem> {
        match rank {
            SystemRank::Integrated => &self.integrated,
            SystemRank::Functional => &self.functional,
            SystemRank::Technical => &self.technical,
        }
    }

    /// Check that every child refers to a system of the next rank.
    pub fn validate(&self) -> Result<(), HierarchyError> {
        for rank in SystemRank::ALL {
            let expected = rank.child_rank();
            let targets = self.rank(expected);
            for (parent, system) in self.rank(rank) {
                if let Some(child) = system.children.iter().find(|c| !targets.contains_key(*c)) {
                    return Err(HierarchyError::DanglingChild {
                        rank,
                        parent: *parent,
                        child: *child,
                        expected,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Member components of one supplied system.
fn resolve_components(
    graph: &ComponentGraph,
    by_name: &BTreeMap<String, Vec<ComponentId>>,
    id: &SystemId,
    system: &SuppliedSystem,
) -> BTreeSet<ComponentId> {
    let mut components: BTreeSet<ComponentId> = system
        .declared_systems
        .iter()
        .filter_map(|name| by_name.get(name.as_str()))
        .flatten()
        .cloned()
        .collect();

    for added in &system.components.add {
        if graph.contains(added) {
            components.insert(added.clone());
        } else {
            tracing::warn!("System {} adds unknown component {}, ignored", id, added);
        }
    }
    for deleted in &system.components.delete {
        if !components.remove(deleted) && !graph.contains(deleted) {
            tracing::warn!("System {} deletes unknown component {}, ignored", id, deleted);
        }
    }
    components
}

/// Build the hierarchy from `supplied` and record memberships for `graph`.
pub fn apply_supplied(
    graph: &ComponentGraph,
    supplied: &SuppliedHierarchy,
    hierarchy: &mut Hierarchy,
    membership: &mut MembershipIndex,
) -> Result<(), HierarchyError> {
    supplied.validate()?;
    let by_name = graph.components_by_declared_name();

    for rank in SystemRank::ALL {
        for (id, system) in supplied.rank(rank) {
            let mut node = SystemNode::with_id(*id, rank, system.classification.clone());
            node.components = resolve_components(graph, &by_name, id, system);
            node.declared_systems = system.declared_systems.iter().cloned().collect();
            node.children = system.children.clone();
            for component in &node.components {
                membership.assign(component, rank, *id);
            }
            hierarchy.rank_mut(rank).insert(node);
        }
        tracing::debug!("Imported {} {} systems", supplied.rank(rank).len(), rank);
    }
    Ok(())
}
