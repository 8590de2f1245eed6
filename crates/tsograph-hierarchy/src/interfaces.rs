//! Interface detection between systems of the same rank

use std::collections::HashSet;
use tsograph_core::{ComponentGraph, ComponentId, Hierarchy, InterfaceRecord, MembershipIndex, SystemId, SystemRank};

type InterfaceKey = (SystemId, SystemId, ComponentId, ComponentId);

/// Key that is identical for a record and its mirror image.
fn unordered_key(a: SystemId, b: SystemId, u: &ComponentId, v: &ComponentId) -> InterfaceKey {
    let (s1, s2) = if a <= b { (a, b) } else { (b, a) };
    let (c1, c2) = if u <= v { (u, v) } else { (v, u) };
    (s1, s2, c1.clone(), c2.clone())
}

/// Find interfaces at every rank and store them on `hierarchy`.
///
/// Existing interface sets and records are replaced.
pub fn detect_interfaces(graph: &ComponentGraph, hierarchy: &mut Hierarchy, membership: &MembershipIndex) {
    hierarchy.interfaces.clear();
    for rank in SystemRank::ALL {
        let records = detect_at_rank(graph, hierarchy, membership, rank);
        tracing::debug!("{} interfaces between {} systems", records.len(), rank);
        hierarchy.interfaces.extend(records);
    }
}

fn detect_at_rank(
    graph: &ComponentGraph,
    hierarchy: &mut Hierarchy,
    membership: &MembershipIndex,
    rank: SystemRank,
) -> Vec<InterfaceRecord> {
    let table = hierarchy.rank_mut(rank);
    for system in table.iter_mut() {
        system.interfaces.clear();
    }
    if table.len() <= 1 {
        return Vec::new();
    }

    let mut seen: HashSet<InterfaceKey> = HashSet::new();
    let mut records = Vec::new();
    let mut pairs: Vec<(SystemId, SystemId)> = Vec::new();

    for (u, v, _) in graph.flows() {
        let owners_u = membership.systems_at(u, rank);
        let owners_v = membership.systems_at(v, rank);
        if owners_u == owners_v {
            continue;
        }
        for &a in &owners_u {
            for &b in owners_v.iter().filter(|&&b| b != a) {
                pairs.push((a, b));
                if seen.insert(unordered_key(a, b, u, v)) {
                    records.push(InterfaceRecord {
                        rank,
                        source_system: a,
                        target_system: b,
                        source_component: u.clone(),
                        target_component: v.clone(),
                    });
                }
            }
        }
    }

    for (a, b) in pairs {
        if let Some(system) = table.get_mut(&a) {
            system.interfaces.insert(b);
        }
        if let Some(system) = table.get_mut(&b) {
            system.interfaces.insert(a);
        }
    }

    records
}
