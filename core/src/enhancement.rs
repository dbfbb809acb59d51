//! Derivation of reaction behavior from participants.
//!
//! Models fresh from extraction only list participants. This module fills
//! in the derived fields the candidacy resolver depends on: `conversion`,
//! `dispersal`, `transport`/`transports`, transport processes, and the
//! `replication`/`replicates` grouping of structurally identical reactions.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{Reaction, Role, Transport};
use crate::participants::{
    collect_compartments, collect_metabolites, filter_participants, mutually_inclusive, unique,
    Criteria,
};

/// Run every derivation in dependency order.
pub fn enhance_reactions(reactions: &BTreeMap<String, Reaction>) -> BTreeMap<String, Reaction> {
    let reactions = include_participant_values(reactions);
    let reactions = include_reactions_behaviors(&reactions);
    let reactions = include_reactions_transport_processes(&reactions);
    let reactions = include_reactions_replications(&reactions);
    debug!(
        reactions = reactions.len(),
        replicated = reactions.values().filter(|r| r.replication).count(),
        transports = reactions.values().filter(|r| r.transport).count(),
        "enhanced reactions"
    );
    reactions
}

/// Default `metabolites`/`compartments` to the values participants reference.
fn include_participant_values(
    reactions: &BTreeMap<String, Reaction>,
) -> BTreeMap<String, Reaction> {
    reactions
        .iter()
        .map(|(id, reaction)| {
            let mut novel = reaction.clone();
            if novel.metabolites.is_empty() {
                novel.metabolites = collect_metabolites(&reaction.participants);
            }
            if novel.compartments.is_empty() {
                novel.compartments = collect_compartments(&reaction.participants);
            }
            (id.clone(), novel)
        })
        .collect()
}

/// Derive conversion, dispersal and transports for every reaction.
pub fn include_reactions_behaviors(
    reactions: &BTreeMap<String, Reaction>,
) -> BTreeMap<String, Reaction> {
    reactions
        .iter()
        .map(|(id, reaction)| {
            let mut novel = reaction.clone();
            novel.conversion = determine_reaction_conversion(reaction);
            novel.dispersal = determine_reaction_dispersal(reaction);
            novel.transports = collect_reaction_transports(reaction);
            novel.transport = !novel.transports.is_empty();
            (id.clone(), novel)
        })
        .collect()
}

fn role_values(reaction: &Reaction, role: Role) -> Vec<String> {
    collect_metabolites(filter_participants(
        &reaction.participants,
        &Criteria::default().roles(&[role]),
    ))
}

/// A reaction converts when its reactant and product metabolites differ.
pub fn determine_reaction_conversion(reaction: &Reaction) -> bool {
    let reactants = role_values(reaction, Role::Reactant);
    let products = role_values(reaction, Role::Product);
    !mutually_inclusive(&reactants, &products)
}

/// A reaction disperses when its participants span multiple compartments.
pub fn determine_reaction_dispersal(reaction: &Reaction) -> bool {
    collect_compartments(&reaction.participants).len() > 1
}

/// Metabolites that appear as both reactant and product in different
/// compartment sets, with the union of those compartments.
pub fn collect_reaction_transports(reaction: &Reaction) -> Vec<Transport> {
    let reactants = role_values(reaction, Role::Reactant);
    let products = role_values(reaction, Role::Product);
    let mut transports = Vec::new();
    for metabolite in products.iter().filter(|m| reactants.contains(*m)) {
        let only = std::slice::from_ref(metabolite);
        let reactant_compartments = collect_compartments(filter_participants(
            &reaction.participants,
            &Criteria::default().metabolites(only).roles(&[Role::Reactant]),
        ));
        let product_compartments = collect_compartments(filter_participants(
            &reaction.participants,
            &Criteria::default().metabolites(only).roles(&[Role::Product]),
        ));
        if !mutually_inclusive(&reactant_compartments, &product_compartments) {
            let compartments = unique(
                reactant_compartments
                    .into_iter()
                    .chain(product_compartments),
            );
            transports.push(Transport {
                metabolite: metabolite.clone(),
                compartments,
            });
        }
    }
    transports
}

/// process → metabolite → compartments in which the metabolite participates
type ProcessCompartments = BTreeMap<String, BTreeMap<String, Vec<String>>>;

fn collect_processes_metabolites_compartments(
    reactions: &BTreeMap<String, Reaction>,
) -> ProcessCompartments {
    let mut collection: ProcessCompartments = BTreeMap::new();
    for reaction in reactions.values() {
        for process in &reaction.processes {
            let entry = collection.entry(process.clone()).or_default();
            for participant in &reaction.participants {
                let compartments = entry.entry(participant.metabolite.clone()).or_default();
                if !compartments.contains(&participant.compartment) {
                    compartments.push(participant.compartment.clone());
                }
            }
        }
    }
    collection
}

/// Keep only metabolites that a process spans across several compartments.
fn filter_processes_transports(dispersal: ProcessCompartments) -> ProcessCompartments {
    dispersal
        .into_iter()
        .map(|(process, metabolites)| {
            let transports = metabolites
                .into_iter()
                .filter(|(_, compartments)| compartments.len() > 1)
                .collect();
            (process, transports)
        })
        .collect()
}

/// Add to each transport reaction the processes it connects by transport.
pub fn include_reactions_transport_processes(
    reactions: &BTreeMap<String, Reaction>,
) -> BTreeMap<String, Reaction> {
    let processes =
        filter_processes_transports(collect_processes_metabolites_compartments(reactions));
    reactions
        .iter()
        .map(|(id, reaction)| {
            let mut novel = reaction.clone();
            let transport_processes = collect_reaction_transport_processes(reaction, &processes);
            novel.processes = unique(reaction.processes.iter().cloned().chain(transport_processes));
            (id.clone(), novel)
        })
        .collect()
}

fn collect_reaction_transport_processes(
    reaction: &Reaction,
    processes: &ProcessCompartments,
) -> Vec<String> {
    let mut result = Vec::new();
    for (process, metabolites) in processes {
        for transport in &reaction.transports {
            let Some(process_compartments) = metabolites.get(&transport.metabolite) else {
                continue;
            };
            let shared = transport
                .compartments
                .iter()
                .filter(|c| process_compartments.contains(*c))
                .count();
            if shared > 1 {
                result.push(process.clone());
            }
        }
    }
    result
}

/// Group reactions with identical reactant and product metabolite sets.
///
/// Every member of a group lists the whole group, itself included.
pub fn include_reactions_replications(
    reactions: &BTreeMap<String, Reaction>,
) -> BTreeMap<String, Reaction> {
    struct Group {
        reactants: Vec<String>,
        products: Vec<String>,
        reactions: Vec<String>,
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut membership: BTreeMap<&str, usize> = BTreeMap::new();
    for reaction in reactions.values() {
        let reactants = role_values(reaction, Role::Reactant);
        let products = role_values(reaction, Role::Product);
        let index = groups.iter().position(|g| {
            mutually_inclusive(&reactants, &g.reactants)
                && mutually_inclusive(&products, &g.products)
        });
        let index = match index {
            Some(index) => index,
            None => {
                groups.push(Group {
                    reactants,
                    products,
                    reactions: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[index].reactions.push(reaction.identifier.clone());
        membership.insert(reaction.identifier.as_str(), index);
    }

    reactions
        .iter()
        .map(|(id, reaction)| {
            let mut novel = reaction.clone();
            novel.replicates = membership
                .get(reaction.identifier.as_str())
                .map(|&index| groups[index].reactions.clone())
                .unwrap_or_default();
            novel.replication = novel.replicates.len() > 1;
            (id.clone(), novel)
        })
        .collect()
}
