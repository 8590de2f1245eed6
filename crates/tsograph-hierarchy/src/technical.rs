//! Technical system subdivision of functional systems

use crate::rules::{FunctionalRule, NamingRules, TechnicalRule};
use std::collections::BTreeSet;
use tsograph_core::{ComponentGraph, ComponentId, Hierarchy, MembershipIndex, SystemNode, SystemRank};

/// Group declared names by the first technical rule matching each of them.
///
/// Groups follow the rule table order; names nothing matches are dropped.
pub fn group_names<'r>(
    rule: &'r FunctionalRule,
    names: &BTreeSet<String>,
) -> Vec<(&'r TechnicalRule, Vec<String>)> {
    let mut slots: Vec<Vec<String>> = vec![Vec::new(); rule.technical().len()];
    for name in names {
        if let Some(idx) = rule.technical_match(name) {
            slots[idx].push(name.clone());
        }
    }
    rule.technical()
        .iter()
        .zip(slots)
        .filter(|(_, names)| !names.is_empty())
        .collect()
}

/// Split every functional system into technical systems.
pub fn subdivide_functional(
    graph: &ComponentGraph,
    rules: &NamingRules,
    hierarchy: &mut Hierarchy,
    membership: &mut MembershipIndex,
) {
    let by_name = graph.components_by_declared_name();

    for fs_id in hierarchy.functional.ids() {
        let Some(parent) = hierarchy.functional.get(&fs_id) else {
            continue;
        };
        let Some(rule) = parent
            .classification
            .as_deref()
            .and_then(|label| rules.rule_for_label(label))
        else {
            continue;
        };

        let mut created = Vec::new();
        for (technical, names) in group_names(rule, &parent.declared_systems) {
            let components: BTreeSet<ComponentId> = names
                .iter()
                .filter_map(|name| by_name.get(name.as_str()))
                .flatten()
                .filter(|id| parent.components.contains(*id))
                .cloned()
                .collect();
            if components.is_empty() {
                tracing::debug!(
                    "{} of {} has no components of its own",
                    technical.label(),
                    fs_id
                );
                continue;
            }
            created.extend(split_label(graph, technical, names, components));
        }

        for system in created {
            for id in &system.components {
                membership.assign(id, SystemRank::Technical, system.id);
            }
            let child = hierarchy.technical.insert(system);
            if let Some(parent) = hierarchy.functional.get_mut(&fs_id) {
                parent.children.push(child);
            }
        }
    }
}

fn technical_system(
    technical: &TechnicalRule,
    components: BTreeSet<ComponentId>,
    declared: BTreeSet<String>,
) -> SystemNode {
    let mut system = SystemNode::new(
        SystemRank::Technical,
        Some(technical.classification().to_string()),
    );
    system.components = components;
    system.declared_systems = declared;
    system
}

/// One technical system per label, or one per disconnected part when several names share it.
fn split_label(
    graph: &ComponentGraph,
    technical: &TechnicalRule,
    names: Vec<String>,
    components: BTreeSet<ComponentId>,
) -> Vec<SystemNode> {
    if names.len() == 1 {
        return vec![technical_system(technical, components, names.into_iter().collect())];
    }

    let regions = graph.regions_within(&components);
    if regions.len() <= 1 {
        return vec![technical_system(technical, components, names.into_iter().collect())];
    }

    tracing::debug!(
        "{} split into {} disconnected parts",
        technical.label(),
        regions.len()
    );
    regions
        .into_iter()
        .map(|region| {
            let declared: BTreeSet<String> = region
                .iter()
                .filter_map(|id| graph.component(id))
                .filter_map(|c| c.declared_name())
                .map(str::to_string)
                .collect();
            technical_system(technical, region.into_iter().collect(), declared)
        })
        .collect()
}
