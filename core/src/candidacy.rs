//! Candidacy resolution.
//!
//! Decides which reactions and metabolites are eligible for the network
//! under the current filters and compartmentalization, collapses redundant
//! replicate reactions onto a single priority representative, and derives
//! implicit ("dependency") simplification designations from the explicit
//! ones.
//!
//! Every function here is pure: inputs are borrowed, results are fresh
//! values. Candidate maps are `BTreeMap`s so resolution is deterministic
//! regardless of the order reactions were supplied in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{
    candidate_metabolite_id, Entity, Metabolite, Participant, Reaction, Role, Simplification,
    SimplificationMethod, Simplifications, Transport,
};
use crate::participants::{filter_participants, has_role, unique, Criteria};

/// Everything candidacy resolution reads.
#[derive(Debug, Clone, Copy)]
pub struct CandidacyInput<'a> {
    pub compartmentalization: bool,
    /// Reactions that pass the current filters.
    pub reactions: &'a BTreeMap<String, Reaction>,
    /// Metabolites that pass the current filters.
    pub metabolites: &'a BTreeMap<String, Metabolite>,
    pub reactions_simplifications: &'a Simplifications,
    pub metabolites_simplifications: &'a Simplifications,
}

/// A reaction eligible for representation in the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReaction {
    pub identifier: String,
    pub name: String,
    pub conversion: bool,
    pub transport: bool,
    pub transports: Vec<Transport>,
    /// Participants that pass the reaction's own filters.
    pub participants: Vec<Participant>,
    /// Candidate identifiers of the metabolites the reaction involves.
    pub metabolites: Vec<String>,
    /// Redundant replicates this reaction represents.
    pub replicates: Vec<String>,
    pub simplification: bool,
}

/// A metabolite, or a metabolite within one compartment, eligible for the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMetabolite {
    pub identifier: String,
    pub metabolite: String,
    /// `None` when compartmentalization is off.
    pub compartment: Option<String>,
    pub name: String,
    /// Candidate reactions in which the metabolite participates.
    pub reactions: Vec<String>,
    pub simplification: bool,
}

/// Result of candidacy resolution: candidates plus complete (explicit and
/// implicit) simplification designations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Candidacy {
    pub compartmentalization: bool,
    pub reactions: BTreeMap<String, CandidateReaction>,
    pub metabolites: BTreeMap<String, CandidateMetabolite>,
    pub reactions_simplifications: Simplifications,
    pub metabolites_simplifications: Simplifications,
}

/// The parts of a reaction the relevance test reads.
#[derive(Debug, Clone, Copy)]
pub struct Behavior<'a> {
    pub conversion: bool,
    pub transport: bool,
    pub transports: &'a [Transport],
}

impl<'a> From<&'a Reaction> for Behavior<'a> {
    fn from(reaction: &'a Reaction) -> Self {
        Self {
            conversion: reaction.conversion,
            transport: reaction.transport,
            transports: &reaction.transports,
        }
    }
}

impl<'a> From<&'a CandidateReaction> for Behavior<'a> {
    fn from(reaction: &'a CandidateReaction) -> Self {
        Self {
            conversion: reaction.conversion,
            transport: reaction.transport,
            transports: &reaction.transports,
        }
    }
}

/// Participants whose metabolite and compartment both pass the reaction's filters.
pub fn relevant_participants(reaction: &Reaction) -> Vec<&Participant> {
    filter_participants(
        &reaction.participants,
        &Criteria::default()
            .metabolites(&reaction.metabolites)
            .compartments(&reaction.compartments),
    )
}

/// Whether a reaction still has a meaningful role among the given participants.
///
/// Conversions need a reactant and a product. Pure transports count only
/// under compartmentalization, and only while some transported metabolite
/// still appears as reactant and product in different compartments.
pub fn determine_reaction_relevance(
    behavior: Behavior<'_>,
    participants: &[&Participant],
    compartmentalization: bool,
) -> bool {
    let conversion = behavior.conversion
        && has_role(participants.iter().copied(), Role::Reactant)
        && has_role(participants.iter().copied(), Role::Product);
    let transport = compartmentalization
        && behavior.transport
        && !behavior.conversion
        && determine_transport_relevance(behavior.transports, participants);
    conversion || transport
}

fn determine_transport_relevance(transports: &[Transport], participants: &[&Participant]) -> bool {
    transports.iter().any(|transport| {
        let compartments = |role: Role| -> Vec<&str> {
            participants
                .iter()
                .filter(|p| p.metabolite == transport.metabolite && p.role == role)
                .map(|p| p.compartment.as_str())
                .collect()
        };
        let reactants = compartments(Role::Reactant);
        let products = compartments(Role::Product);
        reactants
            .iter()
            .any(|reactant| products.iter().any(|product| product != reactant))
    })
}

/// Whether two reactions' relevant participants match one to one on
/// metabolite and role, and on compartment under compartmentalization.
///
/// Containment is checked in both directions, so the relation is symmetric.
pub fn determine_reactions_redundancy(
    first: &[&Participant],
    second: &[&Participant],
    compartmentalization: bool,
) -> bool {
    let matches = |a: &Participant, b: &Participant| {
        a.metabolite == b.metabolite
            && a.role == b.role
            && (!compartmentalization || a.compartment == b.compartment)
    };
    first.iter().all(|a| second.iter().any(|b| matches(a, b)))
        && second.iter().all(|b| first.iter().any(|a| matches(a, b)))
}

/// Identifiers of the relevant replicates that are redundant with `reaction`.
pub fn collect_redundant_replicates(
    reaction: &Reaction,
    reactions: &BTreeMap<String, Reaction>,
    compartmentalization: bool,
) -> Vec<String> {
    if !reaction.replication {
        return Vec::new();
    }
    let participants = relevant_participants(reaction);
    reaction
        .replicates
        .iter()
        .filter(|id| **id != reaction.identifier)
        .filter_map(|id| reactions.get(id))
        .filter(|replicate| {
            let others = relevant_participants(replicate);
            determine_reaction_relevance(Behavior::from(*replicate), &others, compartmentalization)
                && determine_reactions_redundancy(&participants, &others, compartmentalization)
        })
        .map(|replicate| replicate.identifier.clone())
        .collect()
}

/// The lexicographically first identifier among a reaction and its redundant replicates.
pub fn determine_priority<'a>(identifier: &'a str, redundants: &'a [String]) -> &'a str {
    redundants
        .iter()
        .map(String::as_str)
        .fold(identifier, |best, id| if id < best { id } else { best })
}

/// Relevant, priority, novel reactions.
pub fn collect_candidate_reactions(
    input: &CandidacyInput<'_>,
) -> BTreeMap<String, CandidateReaction> {
    let compartmentalization = input.compartmentalization;
    let mut candidates: BTreeMap<String, CandidateReaction> = BTreeMap::new();
    for reaction in input.reactions.values() {
        let participants = relevant_participants(reaction);
        if !determine_reaction_relevance(
            Behavior::from(reaction),
            &participants,
            compartmentalization,
        ) {
            continue;
        }
        let redundants =
            collect_redundant_replicates(reaction, input.reactions, compartmentalization);
        if determine_priority(&reaction.identifier, &redundants) != reaction.identifier {
            continue;
        }
        if candidates.contains_key(&reaction.identifier) {
            continue;
        }
        let metabolites = unique(participants.iter().map(|p| {
            candidate_metabolite_id(&p.metabolite, &p.compartment, compartmentalization)
        }));
        candidates.insert(
            reaction.identifier.clone(),
            CandidateReaction {
                identifier: reaction.identifier.clone(),
                name: reaction.name.clone(),
                conversion: reaction.conversion,
                transport: reaction.transport,
                transports: reaction.transports.clone(),
                participants: participants.into_iter().cloned().collect(),
                metabolites,
                replicates: redundants,
                simplification: false,
            },
        );
    }
    candidates
}

/// Metabolites referenced by candidate reactions, with their reaction memberships.
pub fn collect_candidate_metabolites(
    reactions: &BTreeMap<String, CandidateReaction>,
    metabolites: &BTreeMap<String, Metabolite>,
    compartmentalization: bool,
) -> BTreeMap<String, CandidateMetabolite> {
    let mut candidates: BTreeMap<String, CandidateMetabolite> = BTreeMap::new();
    for reaction in reactions.values() {
        for participant in &reaction.participants {
            let identifier = candidate_metabolite_id(
                &participant.metabolite,
                &participant.compartment,
                compartmentalization,
            );
            let candidate = candidates.entry(identifier.clone()).or_insert_with(|| {
                let name = metabolites
                    .get(&participant.metabolite)
                    .map(|m| m.name.clone())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| participant.metabolite.clone());
                CandidateMetabolite {
                    identifier,
                    metabolite: participant.metabolite.clone(),
                    compartment: compartmentalization.then(|| participant.compartment.clone()),
                    name,
                    reactions: Vec::new(),
                    simplification: false,
                }
            });
            if !candidate.reactions.contains(&reaction.identifier) {
                candidate.reactions.push(reaction.identifier.clone());
            }
        }
    }
    candidates
}

/// One pass of implicit simplification over the candidates.
///
/// A reaction without a designation becomes implicitly omitted when the
/// participants left after removing designated metabolites fail the
/// relevance test. A metabolite without a designation becomes implicitly
/// omitted when every one of its reactions carries a designation, counting
/// the reactions designated earlier in this pass. Existing entries are
/// never touched, and the pass is not iterated.
pub fn determine_implicit_simplifications(
    compartmentalization: bool,
    reactions: &BTreeMap<String, CandidateReaction>,
    metabolites: &BTreeMap<String, CandidateMetabolite>,
    reactions_simplifications: &Simplifications,
    metabolites_simplifications: &Simplifications,
) -> (Simplifications, Simplifications) {
    let mut reactions_total = reactions_simplifications.clone();
    for reaction in reactions.values() {
        if reactions_simplifications.contains_key(&reaction.identifier) {
            continue;
        }
        let remaining: Vec<&Participant> = reaction
            .participants
            .iter()
            .filter(|p| {
                let identifier =
                    candidate_metabolite_id(&p.metabolite, &p.compartment, compartmentalization);
                !metabolites_simplifications.contains_key(&identifier)
            })
            .collect();
        if !determine_reaction_relevance(
            Behavior::from(reaction),
            &remaining,
            compartmentalization,
        ) {
            reactions_total.insert(
                reaction.identifier.clone(),
                Simplification::implicit(&reaction.identifier),
            );
        }
    }

    let mut metabolites_total = metabolites_simplifications.clone();
    for metabolite in metabolites.values() {
        if metabolites_simplifications.contains_key(&metabolite.identifier) {
            continue;
        }
        if metabolite.reactions.iter().all(|r| reactions_total.contains_key(r)) {
            metabolites_total.insert(
                metabolite.identifier.clone(),
                Simplification::implicit(&metabolite.identifier),
            );
        }
    }

    (reactions_total, metabolites_total)
}

/// Keep designations that name current candidates.
fn retain_candidates<V>(
    simplifications: &Simplifications,
    candidates: &BTreeMap<String, V>,
    entity: Entity,
) -> Simplifications {
    simplifications
        .iter()
        .filter(|(id, _)| {
            let candidate = candidates.contains_key(*id);
            if !candidate {
                debug!(?entity, identifier = %id, "designation names no candidate, ignoring");
            }
            candidate
        })
        .map(|(id, s)| (id.clone(), s.clone()))
        .collect()
}

/// Drop implicit designations, keeping explicit user choices.
pub fn explicit_only(simplifications: &Simplifications) -> Simplifications {
    simplifications
        .iter()
        .filter(|(_, s)| !s.dependency)
        .map(|(id, s)| (id.clone(), s.clone()))
        .collect()
}

/// Toggle an explicit designation.
///
/// The same method toggles the designation off, a different method
/// replaces it, and an absent designation is added.
pub fn toggle_simplification(
    simplifications: &Simplifications,
    identifier: &str,
    method: SimplificationMethod,
) -> Simplifications {
    let mut novel = simplifications.clone();
    match simplifications.get(identifier) {
        Some(existing) if !existing.dependency && existing.method == method => {
            novel.remove(identifier);
        }
        _ => {
            novel.insert(identifier.to_string(), Simplification::explicit(identifier, method));
        }
    }
    novel
}

/// Resolve candidates and complete simplification designations.
pub fn resolve_candidacy(input: &CandidacyInput<'_>) -> Candidacy {
    let reactions = collect_candidate_reactions(input);
    let metabolites =
        collect_candidate_metabolites(&reactions, input.metabolites, input.compartmentalization);
    let reactions_simplifications =
        retain_candidates(input.reactions_simplifications, &reactions, Entity::Reaction);
    let metabolites_simplifications =
        retain_candidates(input.metabolites_simplifications, &metabolites, Entity::Metabolite);

    let candidacy = Candidacy {
        compartmentalization: input.compartmentalization,
        reactions,
        metabolites,
        reactions_simplifications: Simplifications::new(),
        metabolites_simplifications: Simplifications::new(),
    }
    .with_simplifications(&reactions_simplifications, &metabolites_simplifications);

    debug!(
        reactions = candidacy.reactions.len(),
        metabolites = candidacy.metabolites.len(),
        reactions_simplified = candidacy.reactions_simplifications.len(),
        metabolites_simplified = candidacy.metabolites_simplifications.len(),
        "resolved candidacy"
    );
    candidacy
}

impl Candidacy {
    /// Run implicit propagation from the given designations and flag candidates.
    fn with_simplifications(
        mut self,
        reactions_simplifications: &Simplifications,
        metabolites_simplifications: &Simplifications,
    ) -> Self {
        let (reactions_total, metabolites_total) = determine_implicit_simplifications(
            self.compartmentalization,
            &self.reactions,
            &self.metabolites,
            reactions_simplifications,
            metabolites_simplifications,
        );
        for reaction in self.reactions.values_mut() {
            reaction.simplification = reactions_total.contains_key(&reaction.identifier);
        }
        for metabolite in self.metabolites.values_mut() {
            metabolite.simplification = metabolites_total.contains_key(&metabolite.identifier);
        }
        self.reactions_simplifications = reactions_total;
        self.metabolites_simplifications = metabolites_total;
        self
    }

    /// Whether `identifier` names a candidate of the given kind.
    pub fn contains(&self, entity: Entity, identifier: &str) -> bool {
        match entity {
            Entity::Reaction => self.reactions.contains_key(identifier),
            Entity::Metabolite => self.metabolites.contains_key(identifier),
        }
    }

    /// Designations of one kind of entity, explicit and implicit.
    pub fn simplifications(&self, entity: Entity) -> &Simplifications {
        match entity {
            Entity::Reaction => &self.reactions_simplifications,
            Entity::Metabolite => &self.metabolites_simplifications,
        }
    }

    /// Toggle one explicit designation, strip every implicit designation and
    /// recompute them from the explicit ones that remain.
    pub fn change_simplification(
        &self,
        identifier: &str,
        method: SimplificationMethod,
        entity: Entity,
    ) -> Candidacy {
        if !self.contains(entity, identifier) {
            warn!(?entity, identifier, "cannot designate a non-candidate entity");
            return self.clone();
        }
        let mut reactions_simplifications = explicit_only(&self.reactions_simplifications);
        let mut metabolites_simplifications = explicit_only(&self.metabolites_simplifications);
        match entity {
            Entity::Reaction => {
                reactions_simplifications =
                    toggle_simplification(&reactions_simplifications, identifier, method);
            }
            Entity::Metabolite => {
                metabolites_simplifications =
                    toggle_simplification(&metabolites_simplifications, identifier, method);
            }
        }
        self.clone()
            .with_simplifications(&reactions_simplifications, &metabolites_simplifications)
    }
}
