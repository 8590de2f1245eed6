//! Core data structures for the component graph and the system hierarchy

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a building component (the GUID of the source element).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        ComponentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        ComponentId(id.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        ComponentId(id)
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Open key/value container for upstream attributes this core does not interpret.
pub type AttributeBag = BTreeMap<String, serde_json::Value>;

/// System declared on a component by the source model, e.g. `["VL_Heizung", "HEATING"]`.
///
/// Serialized as a two-element array; any other arity is rejected on load. Either
/// element may be null, unnamed source systems arrive as `[null, "NOTDEFINED"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(Option<String>, Option<String>)", into = "(Option<String>, Option<String>)")]
pub struct DeclaredSystem {
    pub name: Option<String>,
    pub kind: Option<String>,
}

impl DeclaredSystem {
    pub fn new(name: impl Into<String>, kind: Option<&str>) -> Self {
        DeclaredSystem {
            name: Some(name.into()),
            kind: kind.map(str::to_string),
        }
    }
}

impl From<(Option<String>, Option<String>)> for DeclaredSystem {
    fn from((name, kind): (Option<String>, Option<String>)) -> Self {
        DeclaredSystem { name, kind }
    }
}

impl From<DeclaredSystem> for (Option<String>, Option<String>) {
    fn from(system: DeclaredSystem) -> Self {
        (system.name, system.kind)
    }
}

/// A single physical element of a building system (pipe, duct, fitting, terminal, ...).
///
/// Every attribute must be present in the input but may be null. A node missing
/// one of them is rejected on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    /// Element class, e.g. `IfcPipeFitting`.
    pub class: String,
    /// Sub-type label within the class.
    #[serde(rename = "type", deserialize_with = "Option::deserialize")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub name: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub description: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub system: Option<DeclaredSystem>,
    /// Carried through untouched; upstream writes numbers, strings or nulls.
    #[serde(deserialize_with = "Option::deserialize")]
    pub position: Option<serde_json::Value>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub rds: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub additional_data: Option<AttributeBag>,
}

impl Component {
    /// Minimal component with only id and class set.
    pub fn new(id: impl Into<ComponentId>, class: impl Into<String>) -> Self {
        Component {
            id: id.into(),
            class: class.into(),
            kind: None,
            name: None,
            description: None,
            system: None,
            position: None,
            rds: None,
            additional_data: None,
        }
    }

    pub fn with_system(mut self, name: impl Into<String>, kind: Option<&str>) -> Self {
        self.system = Some(DeclaredSystem::new(name, kind));
        self
    }

    /// Declared system name, if the component carries a non-empty one.
    pub fn declared_name(&self) -> Option<&str> {
        self.system
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// A directed flow connection from an upstream to a downstream component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Components this edge stands in for after topology reduction.
    #[serde(default)]
    pub aggregated_nodes: BTreeSet<ComponentId>,
}

/// Edge as it appears in node/link lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: ComponentId,
    pub target: ComponentId,
    #[serde(default)]
    pub aggregated_nodes: BTreeSet<ComponentId>,
}

impl FlowLink {
    pub fn new(source: impl Into<ComponentId>, target: impl Into<ComponentId>) -> Self {
        FlowLink {
            source: source.into(),
            target: target.into(),
            aggregated_nodes: BTreeSet::new(),
        }
    }
}

/// Node and link lists as exchanged in graph files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Component>,
    #[serde(default)]
    pub links: Vec<FlowLink>,
}

impl GraphDocument {
    /// Append another document. A node whose id is already present replaces the earlier one in place.
    pub fn merge(&mut self, other: GraphDocument) {
        let mut positions: HashMap<ComponentId, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id.clone(), pos))
            .collect();
        for node in other.nodes {
            match positions.get(&node.id) {
                Some(&pos) => self.nodes[pos] = node,
                None => {
                    positions.insert(node.id.clone(), self.nodes.len());
                    self.nodes.push(node);
                }
            }
        }
        self.links.extend(other.links);
    }
}

/// Unique identifier of a computed or supplied system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(pub Uuid);

impl SystemId {
    pub fn new() -> Self {
        SystemId(Uuid::new_v4())
    }
}

impl Default for SystemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Level of a system in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemRank {
    /// Umbrella over several functional systems sharing one connected region.
    Integrated,
    /// System classified by engineering purpose (heating, ventilation, ...).
    Functional,
    /// Subdivision of a functional system by role (supply, return, ...).
    Technical,
}

impl SystemRank {
    pub const ALL: [SystemRank; 3] = [
        SystemRank::Integrated,
        SystemRank::Functional,
        SystemRank::Technical,
    ];

    /// Rank of the systems listed in `children`. Technical systems nest into themselves.
    pub fn child_rank(self) -> SystemRank {
        match self {
            SystemRank::Integrated => SystemRank::Functional,
            SystemRank::Functional | SystemRank::Technical => SystemRank::Technical,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            SystemRank::Integrated => "IS",
            SystemRank::Functional => "FS",
            SystemRank::Technical => "TS",
        }
    }
}

impl fmt::Display for SystemRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// An entry of the system hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemNode {
    pub id: SystemId,
    pub rank: SystemRank,
    pub classification: Option<String>,
    /// Member components, inclusive of every descendant's members.
    pub components: BTreeSet<ComponentId>,
    /// Declared system names of the source model this system subsumes.
    pub declared_systems: BTreeSet<String>,
    pub children: Vec<SystemId>,
    /// Systems of the same rank reached by at least one crossing edge.
    pub interfaces: BTreeSet<SystemId>,
}

impl SystemNode {
    pub fn new(rank: SystemRank, classification: Option<String>) -> Self {
        Self::with_id(SystemId::new(), rank, classification)
    }

    pub fn with_id(id: SystemId, rank: SystemRank, classification: Option<String>) -> Self {
        SystemNode {
            id,
            rank,
            classification,
            components: BTreeSet::new(),
            declared_systems: BTreeSet::new(),
            children: Vec::new(),
            interfaces: BTreeSet::new(),
        }
    }
}

/// All systems of one rank, kept in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SystemNode>", into = "Vec<SystemNode>")]
pub struct SystemTable {
    systems: Vec<SystemNode>,
    index: HashMap<SystemId, usize>,
}

impl SystemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a system and return its id. A system with the same id is replaced.
    pub fn insert(&mut self, system: SystemNode) -> SystemId {
        let id = system.id;
        match self.index.get(&id) {
            Some(&pos) => self.systems[pos] = system,
            None => {
                self.index.insert(id, self.systems.len());
                self.systems.push(system);
            }
        }
        id
    }

    pub fn get(&self, id: &SystemId) -> Option<&SystemNode> {
        self.index.get(id).map(|&pos| &self.systems[pos])
    }

    pub fn get_mut(&mut self, id: &SystemId) -> Option<&mut SystemNode> {
        self.index.get(id).map(|&pos| &mut self.systems[pos])
    }

    pub fn contains(&self, id: &SystemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemNode> {
        self.systems.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SystemNode> {
        self.systems.iter_mut()
    }

    pub fn ids(&self) -> Vec<SystemId> {
        self.systems.iter().map(|s| s.id).collect()
    }
}

impl From<Vec<SystemNode>> for SystemTable {
    fn from(systems: Vec<SystemNode>) -> Self {
        let mut table = SystemTable::new();
        for system in systems {
            table.insert(system);
        }
        table
    }
}

impl From<SystemTable> for Vec<SystemNode> {
    fn from(table: SystemTable) -> Self {
        table.systems
    }
}

/// A flow edge crossing the boundary between two systems of the same rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub rank: SystemRank,
    pub source_system: SystemId,
    pub target_system: SystemId,
    pub source_component: ComponentId,
    pub target_component: ComponentId,
}

/// The three-level system hierarchy plus the detected interfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub integrated: SystemTable,
    pub functional: SystemTable,
    pub technical: SystemTable,
    pub interfaces: Vec<InterfaceRecord>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank(&self, rank: SystemRank) -> &SystemTable {
        match rank {
            SystemRank::Integrated => &self.integrated,
            SystemRank::Functional => &self.functional,
            SystemRank::Technical => &self.technical,
        }
    }

    pub fn rank_mut(&mut self, rank: SystemRank) -> &mut SystemTable {
        match rank {
            SystemRank::Integrated => &mut self.integrated,
            SystemRank::Functional => &mut self.functional,
            SystemRank::Technical => &mut self.technical,
        }
    }

    /// Look a system up at any rank.
    pub fn system(&self, id: &SystemId) -> Option<&SystemNode> {
        SystemRank::ALL
            .iter()
            .find_map(|&rank| self.rank(rank).get(id))
    }

    pub fn system_count(&self) -> usize {
        self.integrated.len() + self.functional.len() + self.technical.len()
    }
}

/// Systems a single component belongs to, per rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub integrated: BTreeSet<SystemId>,
    pub functional: BTreeSet<SystemId>,
    pub technical: BTreeSet<SystemId>,
}

impl Membership {
    pub fn rank(&self, rank: SystemRank) -> &BTreeSet<SystemId> {
        match rank {
            SystemRank::Integrated => &self.integrated,
            SystemRank::Functional => &self.functional,
            SystemRank::Technical => &self.technical,
        }
    }

    pub fn rank_mut(&mut self, rank: SystemRank) -> &mut BTreeSet<SystemId> {
        match rank {
            SystemRank::Integrated => &mut self.integrated,
            SystemRank::Functional => &mut self.functional,
            SystemRank::Technical => &mut self.technical,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.integrated.is_empty() && self.functional.is_empty() && self.technical.is_empty()
    }
}

/// Component id → system memberships. Stored apart from the systems to avoid back-references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipIndex(BTreeMap<ComponentId, Membership>);

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `component` belongs to `system` at `rank`.
    pub fn assign(&mut self, component: &ComponentId, rank: SystemRank, system: SystemId) {
        self.0
            .entry(component.clone())
            .or_default()
            .rank_mut(rank)
            .insert(system);
    }

    /// Make sure `component` has an entry, empty if it belongs to no system.
    pub fn ensure(&mut self, component: &ComponentId) {
        self.0.entry(component.clone()).or_default();
    }

    pub fn get(&self, component: &ComponentId) -> Option<&Membership> {
        self.0.get(component)
    }

    /// Systems of `component` at `rank`; empty when the component is unknown.
    pub fn systems_at(&self, component: &ComponentId, rank: SystemRank) -> BTreeSet<SystemId> {
        self.0
            .get(component)
            .map(|m| m.rank(rank).clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &Membership)> {
        self.0.iter()
    }
}
