//! Network assembly.
//!
//! Turns candidate reactions and metabolites into node and link records.
//! Every reaction gets a record node plus two position nodes, `R_source`
//! and `R_target`. Metabolites connect to positions, never to the record
//! node, so reaction records never touch each other directly.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::candidacy::{
    collect_redundant_replicates, determine_priority, relevant_participants, Candidacy,
};
use crate::model::{
    candidate_metabolite_id, Entity, Metabolite, Reaction, Role, SimplificationMethod,
};
use crate::participants::unique;

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Record,
    Position,
}

/// Which end of a reaction a position node anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    fn suffix(self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

/// A network node. Fields beyond the three structural ones, including any a
/// layout engine attaches (`x`, `y`, `fx`, `fy`), live in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub identifier: String,
    pub entity: Entity,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Node {
    pub fn simplification(&self) -> bool {
        self.attributes
            .get("simplification")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Reaction this node belongs to. Record nodes resolve to themselves,
    /// position nodes to the reaction they anchor.
    pub fn reaction(&self) -> Option<&str> {
        match (self.entity, self.kind) {
            (Entity::Metabolite, _) => None,
            (Entity::Reaction, NodeType::Record) => Some(&self.identifier),
            (Entity::Reaction, NodeType::Position) => {
                self.attributes.get("reaction").and_then(Value::as_str)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub identifier: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub simplification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversibility: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Link {
    fn new(source: &str, target: &str, simplification: bool) -> Self {
        Self {
            identifier: link_identifier(source, target),
            source: source.to_string(),
            target: target.to_string(),
            simplification,
            reversibility: None,
            role: None,
            attributes: Map::new(),
        }
    }
}

/// Nodes and links ready for layout or traversal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Network {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Network {
    pub fn node(&self, identifier: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.identifier == identifier)
    }

    pub fn node_identifiers(&self) -> BTreeSet<String> {
        self.nodes.iter().map(|n| n.identifier.clone()).collect()
    }
}

/// Assembler output, grouped by element kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkElements {
    pub reaction_nodes: Vec<Node>,
    pub reaction_position_nodes: Vec<Node>,
    pub reaction_links: Vec<Link>,
    pub metabolite_nodes: Vec<Node>,
    pub metabolite_links: Vec<Link>,
}

impl From<NetworkElements> for Network {
    fn from(elements: NetworkElements) -> Self {
        let mut nodes = elements.metabolite_nodes;
        nodes.extend(elements.reaction_nodes);
        nodes.extend(elements.reaction_position_nodes);
        let mut links = elements.metabolite_links;
        links.extend(elements.reaction_links);
        Network { nodes, links }
    }
}

/// `source_-_target`
pub fn link_identifier(source: &str, target: &str) -> String {
    format!("{}_-_{}", source, target)
}

/// `reaction_source` or `reaction_target`
pub fn position_identifier(reaction: &str, side: Side) -> String {
    format!("{}_{}", reaction, side.suffix())
}

/// Everything network assembly reads.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    pub compartmentalization: bool,
    pub strategy: SimplificationMethod,
    /// Filtered reactions, including suppressed replicates.
    pub reactions: &'a BTreeMap<String, Reaction>,
    pub metabolites: &'a BTreeMap<String, Metabolite>,
    pub candidacy: &'a Candidacy,
}

/// Serialized fields of a record, minus its identifier.
fn attributes_of<T: Serialize>(value: &T) -> Map<String, Value> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut map)) => {
            map.remove("identifier");
            map
        }
        _ => Map::new(),
    }
}

/// Merge a reaction with its redundant replicates.
///
/// The four list attributes are unions over every member; everything else
/// comes from the priority member.
pub fn consensus_reaction(
    reaction: &Reaction,
    reactions: &BTreeMap<String, Reaction>,
    compartmentalization: bool,
) -> Reaction {
    let redundants = collect_redundant_replicates(reaction, reactions, compartmentalization);
    if redundants.is_empty() {
        return reaction.clone();
    }
    let priority = reactions
        .get(determine_priority(&reaction.identifier, &redundants))
        .unwrap_or(reaction);

    let mut members: Vec<&Reaction> = std::iter::once(reaction)
        .chain(redundants.iter().filter_map(|id| reactions.get(id)))
        .collect();
    members.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    let union = |field: fn(&Reaction) -> &Vec<String>| {
        unique(members.iter().flat_map(|m| field(m).iter().cloned()))
    };
    let mut consensus = priority.clone();
    consensus.compartments = union(|r| &r.compartments);
    consensus.genes = union(|r| &r.genes);
    consensus.metabolites = union(|r| &r.metabolites);
    consensus.processes = union(|r| &r.processes);
    consensus
}

struct Accumulator {
    elements: NetworkElements,
    reactions: BTreeSet<String>,
    metabolites: BTreeSet<String>,
    links: BTreeSet<String>,
}

impl Accumulator {
    fn push_link(&mut self, link: Link, metabolite: bool) {
        if !self.links.insert(link.identifier.clone()) {
            return;
        }
        if metabolite {
            self.elements.metabolite_links.push(link);
        } else {
            self.elements.reaction_links.push(link);
        }
    }
}

/// Build nodes and links for every candidate reaction.
pub fn assemble_network(input: &AssemblyInput<'_>) -> NetworkElements {
    let mut accumulator = Accumulator {
        elements: NetworkElements::default(),
        reactions: BTreeSet::new(),
        metabolites: BTreeSet::new(),
        links: BTreeSet::new(),
    };

    for identifier in input.candidacy.reactions.keys() {
        let Some(reaction) = input.reactions.get(identifier) else {
            debug_assert!(
                false,
                "candidate reaction {} missing from filtered reactions",
                identifier
            );
            warn!(reaction = %identifier, "candidate reaction missing from filtered reactions");
            continue;
        };
        if !accumulator.reactions.insert(identifier.clone()) {
            continue;
        }
        let consensus = consensus_reaction(reaction, input.reactions, input.compartmentalization);
        include_reaction(&mut accumulator, input, identifier, &consensus);
    }

    let elements = accumulator.elements;
    debug!(
        reactions = elements.reaction_nodes.len(),
        metabolites = elements.metabolite_nodes.len(),
        links = elements.reaction_links.len() + elements.metabolite_links.len(),
        strategy = ?input.strategy,
        "assembled network"
    );
    elements
}

fn include_reaction(
    accumulator: &mut Accumulator,
    input: &AssemblyInput<'_>,
    identifier: &str,
    consensus: &Reaction,
) {
    let compartmentalization = input.compartmentalization;
    let candidacy = input.candidacy;
    let source = position_identifier(identifier, Side::Source);
    let target = position_identifier(identifier, Side::Target);
    let participants = relevant_participants(consensus);

    let simplification = participants.iter().any(|p| {
        let id = candidate_metabolite_id(&p.metabolite, &p.compartment, compartmentalization);
        candidacy
            .metabolites
            .get(&id)
            .is_some_and(|m| m.simplification)
    });

    let mut attributes = attributes_of(consensus);
    attributes.insert("reversibility".into(), Value::Bool(consensus.reversibility));
    attributes.insert("simplification".into(), Value::Bool(simplification));
    attributes.insert(
        "positions".into(),
        Value::Array(vec![Value::String(source.clone()), Value::String(target.clone())]),
    );
    if let Some(designation) = candidacy.reactions_simplifications.get(identifier) {
        attributes.insert("designation".into(), Value::Object(attributes_of(designation)));
    }
    accumulator.elements.reaction_nodes.push(Node {
        identifier: identifier.to_string(),
        entity: Entity::Reaction,
        kind: NodeType::Record,
        attributes,
    });

    for (position, side) in [(&source, Side::Source), (&target, Side::Target)] {
        let mut attributes = Map::new();
        attributes.insert("reaction".into(), Value::String(identifier.to_string()));
        attributes.insert("side".into(), Value::String(side.suffix().to_string()));
        accumulator.elements.reaction_position_nodes.push(Node {
            identifier: position.clone(),
            entity: Entity::Reaction,
            kind: NodeType::Position,
            attributes,
        });
    }

    let mut forward = Link::new(&source, &target, simplification);
    forward.reversibility = Some(consensus.reversibility);
    accumulator.push_link(forward, false);
    if consensus.reversibility {
        let mut reverse = Link::new(&target, &source, simplification);
        reverse.reversibility = Some(true);
        accumulator.push_link(reverse, false);
    }

    for metabolite in &consensus.metabolites {
        for participant in participants.iter().filter(|p| p.metabolite == *metabolite) {
            let candidate_id = candidate_metabolite_id(
                &participant.metabolite,
                &participant.compartment,
                compartmentalization,
            );
            let Some(candidate) = candidacy.metabolites.get(&candidate_id) else {
                continue;
            };
            if candidate.simplification && input.strategy == SimplificationMethod::Omission {
                continue;
            }
            let node_id = if candidate.simplification {
                format!("{}_{}", candidate_id, identifier)
            } else {
                candidate_id.clone()
            };

            if accumulator.metabolites.insert(node_id.clone()) {
                let mut attributes = input
                    .metabolites
                    .get(&candidate.metabolite)
                    .map(attributes_of)
                    .unwrap_or_default();
                attributes.insert("name".into(), Value::String(candidate.name.clone()));
                attributes.insert("metabolite".into(), Value::String(candidate.metabolite.clone()));
                attributes.insert(
                    "compartment".into(),
                    candidate.compartment.clone().map_or(Value::Null, Value::String),
                );
                attributes.insert("simplification".into(), Value::Bool(candidate.simplification));
                if node_id != candidate_id {
                    attributes.insert("candidate".into(), Value::String(candidate_id.clone()));
                }
                accumulator.elements.metabolite_nodes.push(Node {
                    identifier: node_id.clone(),
                    entity: Entity::Metabolite,
                    kind: NodeType::Record,
                    attributes,
                });
            }

            let mut link = match participant.role {
                Role::Reactant => Link::new(&node_id, &source, candidate.simplification),
                Role::Product => Link::new(&target, &node_id, candidate.simplification),
            };
            link.role = Some(participant.role);
            accumulator.push_link(link, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidacy::{resolve_candidacy, CandidacyInput};
    use crate::enhancement::enhance_reactions;
    use crate::model::{Participant, Simplification, Simplifications};

    fn reaction(id: &str, participants: &[(&str, &str, Role)], reversibility: bool) -> Reaction {
        Reaction {
            identifier: id.to_string(),
            participants: participants
                .iter()
                .map(|(m, c, r)| Participant::new(m, c, *r))
                .collect(),
            reversibility,
            ..Default::default()
        }
    }

    struct Fixture {
        reactions: BTreeMap<String, Reaction>,
        metabolites: BTreeMap<String, Metabolite>,
    }

    impl Fixture {
        fn new(raw: Vec<Reaction>) -> Self {
            let raw: BTreeMap<String, Reaction> =
                raw.into_iter().map(|r| (r.identifier.clone(), r)).collect();
            let reactions = enhance_reactions(&raw);
            let metabolites = reactions
                .values()
                .flat_map(|r| r.participants.iter())
                .map(|p| {
                    let mut metabolite = Metabolite {
                        identifier: p.metabolite.clone(),
                        name: p.metabolite.clone(),
                        formula: "C6H12O6".into(),
                        ..Default::default()
                    };
                    metabolite.attributes.insert("x".into(), Value::from(12));
                    (p.metabolite.clone(), metabolite)
                })
                .collect();
            Fixture { reactions, metabolites }
        }

        fn assemble(
            &self,
            compartmentalization: bool,
            strategy: SimplificationMethod,
            metabolites_simplifications: &Simplifications,
        ) -> NetworkElements {
            let candidacy = resolve_candidacy(&CandidacyInput {
                compartmentalization,
                reactions: &self.reactions,
                metabolites: &self.metabolites,
                reactions_simplifications: &Simplifications::new(),
                metabolites_simplifications,
            });
            assemble_network(&AssemblyInput {
                compartmentalization,
                strategy,
                reactions: &self.reactions,
                metabolites: &self.metabolites,
                candidacy: &candidacy,
            })
        }
    }

    fn r1() -> Fixture {
        Fixture::new(vec![reaction(
            "R1",
            &[("A", "c1", Role::Reactant), ("B", "c2", Role::Product)],
            true,
        )])
    }

    fn ids<T>(items: &[T], id: fn(&T) -> &str) -> BTreeSet<String> {
        items.iter().map(|item| id(item).to_string()).collect()
    }

    fn node_ids(nodes: &[Node]) -> BTreeSet<String> {
        ids(nodes, |n| n.identifier.as_str())
    }

    fn link_ids(links: &[Link]) -> BTreeSet<String> {
        ids(links, |l| l.identifier.as_str())
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_compartmentalized_reversible_reaction() {
        let elements = r1().assemble(true, SimplificationMethod::Omission, &Simplifications::new());
        assert_eq!(node_ids(&elements.metabolite_nodes), set(&["A_c1", "B_c2"]));
        assert_eq!(node_ids(&elements.reaction_nodes), set(&["R1"]));
        assert_eq!(
            node_ids(&elements.reaction_position_nodes),
            set(&["R1_source", "R1_target"])
        );
        assert_eq!(
            link_ids(&elements.metabolite_links),
            set(&["A_c1_-_R1_source", "R1_target_-_B_c2"])
        );
        assert_eq!(
            link_ids(&elements.reaction_links),
            set(&["R1_source_-_R1_target", "R1_target_-_R1_source"])
        );
    }

    #[test]
    fn test_uncompartmentalized_ids_collapse() {
        let elements =
            r1().assemble(false, SimplificationMethod::Omission, &Simplifications::new());
        assert_eq!(node_ids(&elements.metabolite_nodes), set(&["A", "B"]));
        assert_eq!(link_ids(&elements.metabolite_links), set(&["A_-_R1_source", "R1_target_-_B"]));
        assert_eq!(elements.reaction_links.len(), 2);
        let a = &elements.metabolite_nodes[0];
        assert_eq!(a.attributes["compartment"], Value::Null);
    }

    #[test]
    fn test_omitted_product_absent() {
        let mut simplifications = Simplifications::new();
        simplifications.insert(
            "B_c2".to_string(),
            Simplification::explicit("B_c2", SimplificationMethod::Omission),
        );
        let elements = r1().assemble(true, SimplificationMethod::Omission, &simplifications);
        assert!(!node_ids(&elements.metabolite_nodes).contains("B_c2"));
        assert!(!link_ids(&elements.metabolite_links).contains("R1_target_-_B_c2"));
        assert!(elements.reaction_nodes[0].simplification());
    }

    #[test]
    fn test_replicated_metabolite_per_reaction() {
        let fixture = Fixture::new(vec![
            reaction(
                "R1",
                &[
                    ("atp", "c", Role::Reactant),
                    ("A", "c", Role::Reactant),
                    ("B", "c", Role::Product),
                ],
                false,
            ),
            reaction(
                "R2",
                &[
                    ("atp", "c", Role::Reactant),
                    ("B", "c", Role::Reactant),
                    ("C", "c", Role::Product),
                ],
                false,
            ),
        ]);
        let mut simplifications = Simplifications::new();
        simplifications.insert(
            "atp".to_string(),
            Simplification::explicit("atp", SimplificationMethod::Replication),
        );
        let elements = fixture.assemble(false, SimplificationMethod::Replication, &simplifications);
        let metabolites = node_ids(&elements.metabolite_nodes);
        assert!(metabolites.contains("atp_R1"));
        assert!(metabolites.contains("atp_R2"));
        assert!(!metabolites.contains("atp"));
        assert!(link_ids(&elements.metabolite_links).contains("atp_R1_-_R1_source"));

        let omitted = fixture.assemble(false, SimplificationMethod::Omission, &simplifications);
        assert!(!node_ids(&omitted.metabolite_nodes).iter().any(|id| id.starts_with("atp")));
    }

    #[test]
    fn test_link_endpoints_exist() {
        let fixture = Fixture::new(vec![
            reaction(
                "HEX",
                &[
                    ("glc", "c", Role::Reactant),
                    ("atp", "c", Role::Reactant),
                    ("g6p", "c", Role::Product),
                    ("adp", "c", Role::Product),
                ],
                false,
            ),
            reaction("PGI", &[("g6p", "c", Role::Reactant), ("f6p", "c", Role::Product)], true),
            reaction("GLCt", &[("glc", "e", Role::Reactant), ("glc", "c", Role::Product)], true),
        ]);
        for compartmentalization in [false, true] {
            let network: Network = fixture
                .assemble(
                    compartmentalization,
                    SimplificationMethod::Omission,
                    &Simplifications::new(),
                )
                .into();
            let nodes = network.node_identifiers();
            for link in &network.links {
                assert!(nodes.contains(&link.source), "{}", link.identifier);
                assert!(nodes.contains(&link.target), "{}", link.identifier);
            }
        }
    }

    #[test]
    fn test_metabolite_attributes_copied() {
        let elements = r1().assemble(true, SimplificationMethod::Omission, &Simplifications::new());
        let a = elements
            .metabolite_nodes
            .iter()
            .find(|n| n.identifier == "A_c1")
            .unwrap();
        assert_eq!(a.attributes["formula"], Value::from("C6H12O6"));
        assert_eq!(a.attributes["x"], Value::from(12));
        assert_eq!(a.attributes["compartment"], Value::from("c1"));
        assert_eq!(a.attributes["metabolite"], Value::from("A"));
    }

    #[test]
    fn test_position_nodes_resolve_reaction() {
        let elements = r1().assemble(true, SimplificationMethod::Omission, &Simplifications::new());
        for node in &elements.reaction_position_nodes {
            assert_eq!(node.kind, NodeType::Position);
            assert_eq!(node.reaction(), Some("R1"));
        }
        let record = &elements.reaction_nodes[0];
        assert_eq!(record.reaction(), Some("R1"));
        assert_eq!(
            record.attributes["positions"],
            serde_json::json!(["R1_source", "R1_target"])
        );
    }

    #[test]
    fn test_consensus_unions_lists() {
        let mut first =
            reaction("PGI_c", &[("g6p", "c", Role::Reactant), ("f6p", "c", Role::Product)], false);
        first.genes = vec!["pgi1".into()];
        first.name = "isomerase".into();
        let mut second =
            reaction("PGI_m", &[("g6p", "m", Role::Reactant), ("f6p", "m", Role::Product)], true);
        second.genes = vec!["pgi2".into()];
        let fixture = Fixture::new(vec![second, first]);

        let consensus = consensus_reaction(&fixture.reactions["PGI_m"], &fixture.reactions, false);
        assert_eq!(consensus.identifier, "PGI_c");
        assert_eq!(consensus.name, "isomerase");
        assert!(!consensus.reversibility);
        assert_eq!(consensus.genes, vec!["pgi1".to_string(), "pgi2".to_string()]);
        assert_eq!(consensus.compartments, vec!["c".to_string(), "m".to_string()]);

        let alone = consensus_reaction(&fixture.reactions["PGI_m"], &fixture.reactions, true);
        assert_eq!(alone.identifier, "PGI_m");
        assert_eq!(alone.genes, vec!["pgi2".to_string()]);
    }

    #[test]
    fn test_assembly_order_independent() {
        let forward = Fixture::new(vec![
            reaction("R1", &[("a", "c", Role::Reactant), ("b", "c", Role::Product)], false),
            reaction("R2", &[("b", "c", Role::Reactant), ("c", "c", Role::Product)], true),
        ]);
        let backward = Fixture::new(vec![
            reaction("R2", &[("b", "c", Role::Reactant), ("c", "c", Role::Product)], true),
            reaction("R1", &[("a", "c", Role::Reactant), ("b", "c", Role::Product)], false),
        ]);
        let none = Simplifications::new();
        assert_eq!(
            forward.assemble(true, SimplificationMethod::Omission, &none),
            backward.assemble(true, SimplificationMethod::Omission, &none)
        );
    }

    #[test]
    fn test_node_roundtrip_keeps_layout_fields() {
        let json = r#"{"identifier":"A","entity":"metabolite","type":"record","x":1.5,"fx":null}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind, NodeType::Record);
        assert_eq!(node.attributes["x"], Value::from(1.5));
        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["fx"], Value::Null);
        assert_eq!(back["type"], Value::from("record"));
    }
}
