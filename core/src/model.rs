use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a metabolite within a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reactant,
    Product,
}

/// Kind of entity a candidate, designation or node refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Metabolite,
    Reaction,
}

/// One (metabolite, compartment, role) combination within a reaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub metabolite: String,
    pub compartment: String,
    pub role: Role,
}

impl Participant {
    pub fn new(metabolite: &str, compartment: &str, role: Role) -> Self {
        Self {
            metabolite: metabolite.to_string(),
            compartment: compartment.to_string(),
            role,
        }
    }
}

/// A metabolite that a reaction moves between compartments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    pub metabolite: String,
    pub compartments: Vec<String>,
}

/// Filtered view of a reaction.
///
/// `metabolites` and `compartments` hold only the values that pass the
/// current filters and are always subsets of what `participants` reference.
/// Attributes the engine does not interpret land in `attributes` and are
/// carried through to network records untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reaction {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub metabolites: Vec<String>,
    #[serde(default)]
    pub compartments: Vec<String>,
    #[serde(default)]
    pub processes: Vec<String>,
    #[serde(default)]
    pub genes: Vec<String>,
    #[serde(default)]
    pub reversibility: bool,
    #[serde(default)]
    pub conversion: bool,
    #[serde(default)]
    pub dispersal: bool,
    #[serde(default)]
    pub transport: bool,
    #[serde(default)]
    pub transports: Vec<Transport>,
    #[serde(default)]
    pub replication: bool,
    #[serde(default)]
    pub replicates: Vec<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Filtered view of a metabolite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metabolite {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub charge: Option<i64>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Named model category: compartments, processes and genes share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Category {
    pub identifier: String,
    #[serde(default)]
    pub name: String,
}

/// A complete metabolic model as it arrives from extraction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub compartments: BTreeMap<String, Category>,
    #[serde(default)]
    pub processes: BTreeMap<String, Category>,
    #[serde(default)]
    pub genes: BTreeMap<String, Category>,
    #[serde(default)]
    pub metabolites: BTreeMap<String, Metabolite>,
    #[serde(default)]
    pub reactions: BTreeMap<String, Reaction>,
}

/// How a simplified entity is represented in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimplificationMethod {
    Omission,
    Replication,
}

/// Simplification designation for one candidate entity.
///
/// `dependency: false` marks an explicit user choice; `dependency: true`
/// marks a designation implied by the entity's neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simplification {
    pub identifier: String,
    pub method: SimplificationMethod,
    pub dependency: bool,
}

impl Simplification {
    pub fn explicit(identifier: &str, method: SimplificationMethod) -> Self {
        Self {
            identifier: identifier.to_string(),
            method,
            dependency: false,
        }
    }

    pub fn implicit(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            method: SimplificationMethod::Omission,
            dependency: true,
        }
    }
}

/// Designations keyed by candidate entity identifier.
pub type Simplifications = BTreeMap<String, Simplification>;

/// Candidate identifier of a metabolite: the metabolite alone when
/// compartmentalization is off, else `metabolite_compartment`.
pub fn candidate_metabolite_id(
    metabolite: &str,
    compartment: &str,
    compartmentalization: bool,
) -> String {
    if compartmentalization {
        format!("{}_{}", metabolite, compartment)
    } else {
        metabolite.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_id_compartmentalized() {
        assert_eq!(candidate_metabolite_id("pyr", "m", true), "pyr_m");
        assert_eq!(candidate_metabolite_id("pyr", "m", false), "pyr");
    }

    #[test]
    fn test_candidate_id_toggle_stable() {
        let on = candidate_metabolite_id("glc", "c", true);
        let off = candidate_metabolite_id("glc", "c", false);
        assert_ne!(on, off);
        assert_eq!(candidate_metabolite_id("glc", "c", true), on);
    }

    #[test]
    fn test_reaction_deserialize_defaults_and_extra_fields() {
        let json = r#"{
            "identifier": "HEX1",
            "participants": [
                {"metabolite": "glc", "compartment": "c", "role": "reactant"},
                {"metabolite": "g6p", "compartment": "c", "role": "product"}
            ],
            "ec": "2.7.1.1"
        }"#;
        let reaction: Reaction = serde_json::from_str(json).unwrap();
        assert_eq!(reaction.participants.len(), 2);
        assert_eq!(reaction.participants[1].role, Role::Product);
        assert!(!reaction.reversibility);
        assert!(reaction.replicates.is_empty());
        assert_eq!(reaction.attributes.get("ec").and_then(Value::as_str), Some("2.7.1.1"));
    }

    #[test]
    fn test_simplification_constructors() {
        let explicit = Simplification::explicit("atp_c", SimplificationMethod::Replication);
        assert!(!explicit.dependency);
        let implicit = Simplification::implicit("atp_c");
        assert!(implicit.dependency);
        assert_eq!(implicit.method, SimplificationMethod::Omission);
    }
}
