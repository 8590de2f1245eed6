//! Functional system classification of weakly connected regions

use crate::rules::{FunctionalKind, NamingRules};
use std::collections::{BTreeMap, BTreeSet};
use tsograph_core::{ComponentGraph, ComponentId, Hierarchy, MembershipIndex, SystemId, SystemNode, SystemRank};

/// What one functional kind collected inside a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatch {
    pub kind: FunctionalKind,
    pub components: BTreeSet<ComponentId>,
    /// Declared names that matched.
    pub declared: BTreeSet<String>,
}

/// Match the declared names of one region against the functional tables.
///
/// Results follow table order. Components are drawn from `by_name` but
/// restricted to `region`; a component already claimed by an earlier kind is
/// not handed to a later one.
pub fn match_region(
    rules: &NamingRules,
    region: &BTreeSet<ComponentId>,
    names: &BTreeSet<&str>,
    by_name: &BTreeMap<String, Vec<ComponentId>>,
) -> Vec<LabelMatch> {
    let mut matches = Vec::new();
    let mut claimed: BTreeSet<ComponentId> = BTreeSet::new();

    for rule in rules.functional().iter().filter(|r| r.has_patterns()) {
        let mut found: Option<LabelMatch> = None;
        for &name in names {
            if !rule.matches(name) {
                continue;
            }
            let entry = found.get_or_insert_with(|| LabelMatch {
                kind: rule.kind(),
                components: BTreeSet::new(),
                declared: BTreeSet::new(),
            });
            entry.declared.insert(name.to_string());
            let carriers = by_name.get(name).map(Vec::as_slice).unwrap_or_default();
            entry.components.extend(
                carriers
                    .iter()
                    .filter(|id| region.contains(*id) && !claimed.contains(*id))
                    .cloned(),
            );
        }
        if let Some(found) = found {
            claimed.extend(found.components.iter().cloned());
            matches.push(found);
        }
    }

    matches
}

fn insert_functional(
    hierarchy: &mut Hierarchy,
    membership: &mut MembershipIndex,
    found: LabelMatch,
) -> SystemId {
    let mut system = SystemNode::new(SystemRank::Functional, Some(found.kind.label().to_string()));
    for id in &found.components {
        membership.assign(id, SystemRank::Functional, system.id);
    }
    system.components = found.components;
    system.declared_systems = found.declared;
    hierarchy.functional.insert(system)
}

/// Create functional (and, where needed, integrated) systems for every region of `graph`.
pub fn classify_regions(
    graph: &ComponentGraph,
    rules: &NamingRules,
    hierarchy: &mut Hierarchy,
    membership: &mut MembershipIndex,
) {
    let by_name = graph.components_by_declared_name();

    for region in graph.weakly_connected_regions() {
        let names: BTreeSet<&str> = region
            .iter()
            .filter_map(|id| graph.component(id))
            .filter_map(|c| c.declared_name())
            .collect();
        let members: BTreeSet<ComponentId> = region.into_iter().collect();
        let mut matches = match_region(rules, &members, &names, &by_name);

        match matches.len() {
            0 => {
                tracing::debug!(
                    "No functional system for region of {} components ({} declared names)",
                    members.len(),
                    names.len()
                );
            }
            1 => {
                if let Some(found) = matches.pop() {
                    tracing::debug!(
                        "Region of {} components classified as {} from {} declared names",
                        members.len(),
                        found.kind,
                        found.declared.len()
                    );
                    insert_functional(hierarchy, membership, found);
                }
            }
            _ => {
                let mut integrated = SystemNode::new(SystemRank::Integrated, None);
                for found in &matches {
                    integrated.declared_systems.extend(found.declared.iter().cloned());
                }
                for id in &members {
                    membership.assign(id, SystemRank::Integrated, integrated.id);
                }
                tracing::debug!(
                    "Region of {} components spans {} functional systems",
                    members.len(),
                    matches.len()
                );
                for found in matches {
                    let child = insert_functional(hierarchy, membership, found);
                    integrated.children.push(child);
                }
                integrated.components = members;
                hierarchy.integrated.insert(integrated);
            }
        }
    }
}
