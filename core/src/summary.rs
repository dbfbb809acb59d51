//! Attribute index and per-value counts for filter menus.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{Entity, Metabolite, Reaction};
use crate::participants::unique;

/// One entity's attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRow {
    pub identifier: String,
    pub entity: Entity,
    pub attributes: BTreeMap<String, Vec<String>>,
}

/// How many entities of each kind carry one attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSummary {
    pub value: String,
    pub metabolites: usize,
    pub reactions: usize,
}

/// Attribute index: reactions carry their processes and compartments,
/// metabolites carry those of every reaction they take part in.
pub fn index_attributes(
    reactions: &BTreeMap<String, Reaction>,
    metabolites: &BTreeMap<String, Metabolite>,
) -> Vec<AttributeRow> {
    let mut inherited: BTreeMap<&str, (Vec<String>, Vec<String>)> = BTreeMap::new();
    let mut rows = Vec::with_capacity(reactions.len() + metabolites.len());

    for reaction in reactions.values() {
        let mut attributes = BTreeMap::new();
        attributes.insert("processes".to_string(), reaction.processes.clone());
        attributes.insert("compartments".to_string(), reaction.compartments.clone());
        rows.push(AttributeRow {
            identifier: reaction.identifier.clone(),
            entity: Entity::Reaction,
            attributes,
        });

        for participant in &reaction.participants {
            let entry = inherited.entry(participant.metabolite.as_str()).or_default();
            entry.0.extend(reaction.processes.iter().cloned());
            entry.1.push(participant.compartment.clone());
        }
    }

    for metabolite in metabolites.values() {
        let (processes, compartments) = inherited
            .remove(metabolite.identifier.as_str())
            .unwrap_or_default();
        let mut attributes = BTreeMap::new();
        attributes.insert("processes".to_string(), unique(processes));
        attributes.insert("compartments".to_string(), unique(compartments));
        rows.push(AttributeRow {
            identifier: metabolite.identifier.clone(),
            entity: Entity::Metabolite,
            attributes,
        });
    }

    rows
}

/// Count, per attribute and value, the metabolites and reactions carrying it.
///
/// A row listing a value twice counts once. Values come out sorted.
pub fn summarize(rows: &[AttributeRow]) -> BTreeMap<String, Vec<ValueSummary>> {
    let mut counts: BTreeMap<&str, BTreeMap<&str, (usize, usize)>> = BTreeMap::new();
    for row in rows {
        for (attribute, values) in &row.attributes {
            let per_value = counts.entry(attribute.as_str()).or_default();
            let distinct: BTreeSet<&str> = values.iter().map(String::as_str).collect();
            for value in distinct {
                let entry = per_value.entry(value).or_default();
                match row.entity {
                    Entity::Metabolite => entry.0 += 1,
                    Entity::Reaction => entry.1 += 1,
                }
            }
        }
    }

    counts
        .into_iter()
        .map(|(attribute, values)| {
            let summaries = values
                .into_iter()
                .map(|(value, (metabolites, reactions))| ValueSummary {
                    value: value.to_string(),
                    metabolites,
                    reactions,
                })
                .collect();
            (attribute.to_string(), summaries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Participant, Role};

    fn row(id: &str, entity: Entity, attribute: &str, values: &[&str]) -> AttributeRow {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            attribute.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        AttributeRow {
            identifier: id.to_string(),
            entity,
            attributes,
        }
    }

    #[test]
    fn test_summarize_counts_by_entity() {
        let rows = vec![
            row("HEX", Entity::Reaction, "processes", &["glycolysis"]),
            row("PGI", Entity::Reaction, "processes", &["glycolysis", "glycolysis"]),
            row("glc", Entity::Metabolite, "processes", &["glycolysis", "transport"]),
        ];
        let summary = summarize(&rows);
        let processes = &summary["processes"];
        assert_eq!(
            processes,
            &vec![
                ValueSummary { value: "glycolysis".into(), metabolites: 1, reactions: 2 },
                ValueSummary { value: "transport".into(), metabolites: 1, reactions: 0 },
            ]
        );
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }

    #[test]
    fn test_index_attributes_inherits_reaction_values() {
        let hex = Reaction {
            identifier: "HEX".into(),
            participants: vec![
                Participant::new("glc", "c", Role::Reactant),
                Participant::new("g6p", "c", Role::Product),
            ],
            compartments: vec!["c".into()],
            processes: vec!["glycolysis".into()],
            ..Default::default()
        };
        let reactions: BTreeMap<String, Reaction> =
            [("HEX".to_string(), hex)].into_iter().collect();
        let metabolites: BTreeMap<String, Metabolite> = ["glc", "g6p", "orphan"]
            .into_iter()
            .map(|id| {
                let metabolite = Metabolite {
                    identifier: id.to_string(),
                    ..Default::default()
                };
                (id.to_string(), metabolite)
            })
            .collect();

        let rows = index_attributes(&reactions, &metabolites);
        assert_eq!(rows.len(), 4);
        let glc = rows.iter().find(|r| r.identifier == "glc").unwrap();
        assert_eq!(glc.attributes["processes"], vec!["glycolysis".to_string()]);
        assert_eq!(glc.attributes["compartments"], vec!["c".to_string()]);
        let orphan = rows.iter().find(|r| r.identifier == "orphan").unwrap();
        assert!(orphan.attributes["processes"].is_empty());

        let summary = summarize(&rows);
        let compartments = &summary["compartments"];
        assert_eq!(compartments[0].metabolites, 2);
        assert_eq!(compartments[0].reactions, 1);
    }
}
