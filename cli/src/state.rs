//! Explorer state and its reducer.
//!
//! State changes only through [`reduce`]. Anything that alters filters,
//! compartmentalization, strategy or designations rebuilds candidacy,
//! network and graph from scratch. The subnetwork survives by identifier
//! continuity.

use std::collections::BTreeSet;
use std::time::Instant;

use metanet_core::{
    assemble_network, continue_subnetwork, combine_nodes_links_subnetwork, explicit_only,
    resolve_candidacy, AssemblyInput, Candidacy, CandidacyInput, Combination, Entity, Graph,
    Model, Network, Node, Simplification, SimplificationMethod, Simplifications,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::error::{ExplorerError, Result};
use crate::load::{filter_model, prepare_model, FilteredModel};
use crate::traverse::{collect_traversal_nodes, TraversalRequest};

/// User-chosen designations. The only simplification state that persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitSimplifications {
    #[serde(default)]
    pub reactions: Simplifications,
    #[serde(default)]
    pub metabolites: Simplifications,
}

impl ExplicitSimplifications {
    pub fn get(&self, entity: Entity) -> &Simplifications {
        match entity {
            Entity::Reaction => &self.reactions,
            Entity::Metabolite => &self.metabolites,
        }
    }
}

pub struct ExplorerState {
    pub settings: Settings,
    /// Model as loaded, with derived behaviors.
    pub model: Model,
    pub filtered: FilteredModel,
    pub simplifications: ExplicitSimplifications,
    pub candidacy: Candidacy,
    pub network: Network,
    pub graph: Graph,
    pub subnetwork: Network,
    /// Nodes reached by the most recent traversal.
    pub reached: BTreeSet<String>,
    /// Recompute counter. Bumped by every rebuild.
    pub generation: u64,
    pub recompute_time_ms: f64,
}

/// Everything a user can do to the explorer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetCompartmentalization(bool),
    SetStrategy(SimplificationMethod),
    SetFilters {
        compartments: String,
        processes: String,
    },
    /// Toggle one explicit designation.
    ChangeSimplification {
        identifier: String,
        method: SimplificationMethod,
        entity: Entity,
    },
    ClearSimplifications,
    Traverse(TraversalRequest, Combination),
    ClearSubnetwork,
}

impl ExplorerState {
    /// Build a state for a freshly loaded model.
    pub fn new(model: Model, settings: Settings) -> Self {
        Self::restore(model, settings, ExplicitSimplifications::default(), Network::default(), 0)
    }

    /// Build a state from persisted pieces, recomputing everything derived.
    pub fn restore(
        model: Model,
        settings: Settings,
        simplifications: ExplicitSimplifications,
        subnetwork: Network,
        generation: u64,
    ) -> Self {
        let model = prepare_model(model, settings.derive_behaviors);
        let state = Self {
            settings,
            model,
            filtered: FilteredModel::default(),
            simplifications,
            candidacy: Candidacy::default(),
            network: Network::default(),
            graph: Graph::new(),
            subnetwork,
            reached: BTreeSet::new(),
            generation,
            recompute_time_ms: 0.0,
        };
        state.recompute()
    }

    /// Explicit designation currently held for an entity, if any.
    pub fn designation(&self, entity: Entity, identifier: &str) -> Option<&Simplification> {
        self.simplifications.get(entity).get(identifier)
    }

    /// Reactions touched by the most recent traversal, whether it reached
    /// their record node or only a position node.
    pub fn reached_reactions(&self) -> BTreeSet<String> {
        self.reached
            .iter()
            .filter_map(|id| self.network.node(id).and_then(Node::reaction))
            .map(str::to_string)
            .collect()
    }

    /// Filter, resolve candidacy, assemble, index, and carry the subnetwork over.
    fn recompute(mut self) -> Self {
        let start = Instant::now();
        let filters = &self.settings.filters;
        let filtered = filter_model(
            &self.model,
            &filters.compartment_filter(),
            &filters.process_filter(),
        );
        let candidacy = resolve_candidacy(&CandidacyInput {
            compartmentalization: self.settings.compartmentalization,
            reactions: &filtered.reactions,
            metabolites: &filtered.metabolites,
            reactions_simplifications: &self.simplifications.reactions,
            metabolites_simplifications: &self.simplifications.metabolites,
        });
        let network: Network = assemble_network(&AssemblyInput {
            compartmentalization: self.settings.compartmentalization,
            strategy: self.settings.simplification,
            reactions: &filtered.reactions,
            metabolites: &filtered.metabolites,
            candidacy: &candidacy,
        })
        .into();

        self.graph = Graph::from_network(&network);
        self.subnetwork = continue_subnetwork(&self.subnetwork, &network);
        self.filtered = filtered;
        self.candidacy = candidacy;
        self.network = network;
        self.reached.clear();
        self.generation += 1;
        self.recompute_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            generation = self.generation,
            candidates = self.candidacy.reactions.len() + self.candidacy.metabolites.len(),
            nodes = self.network.nodes.len(),
            links = self.network.links.len(),
            subnetwork = self.subnetwork.nodes.len(),
            recompute_time_ms = self.recompute_time_ms,
            "recomputed network"
        );
        self
    }
}

/// Apply one action.
pub fn reduce(mut state: ExplorerState, action: Action) -> Result<ExplorerState> {
    match action {
        Action::SetCompartmentalization(compartmentalization) => {
            info!(compartmentalization, "set compartmentalization");
            state.settings.compartmentalization = compartmentalization;
            Ok(state.recompute())
        }
        Action::SetStrategy(strategy) => {
            info!(?strategy, "set simplification strategy");
            state.settings.simplification = strategy;
            Ok(state.recompute())
        }
        Action::SetFilters {
            compartments,
            processes,
        } => {
            info!(%compartments, %processes, "set filters");
            state.settings.filters.compartments = compartments;
            state.settings.filters.processes = processes;
            Ok(state.recompute())
        }
        Action::ChangeSimplification {
            identifier,
            method,
            entity,
        } => {
            if !state.candidacy.contains(entity, &identifier) {
                return Err(ExplorerError::UnknownCandidate { entity, identifier });
            }
            info!(?entity, %identifier, ?method, "change simplification");
            let changed = state.candidacy.change_simplification(&identifier, method, entity);
            // Designations for entities that are not candidates right now stay put
            let keep = |held: &Simplifications, candidates: &Simplifications, entity: Entity| {
                let mut kept: Simplifications = held
                    .iter()
                    .filter(|(id, _)| !state.candidacy.contains(entity, id))
                    .map(|(id, s)| (id.clone(), s.clone()))
                    .collect();
                kept.extend(explicit_only(candidates));
                kept
            };
            let simplifications = ExplicitSimplifications {
                reactions: keep(
                    &state.simplifications.reactions,
                    &changed.reactions_simplifications,
                    Entity::Reaction,
                ),
                metabolites: keep(
                    &state.simplifications.metabolites,
                    &changed.metabolites_simplifications,
                    Entity::Metabolite,
                ),
            };
            state.simplifications = simplifications;
            Ok(state.recompute())
        }
        Action::ClearSimplifications => {
            info!("clear simplifications");
            state.simplifications = ExplicitSimplifications::default();
            Ok(state.recompute())
        }
        Action::Traverse(request, combination) => {
            state.settings.validate()?;
            let nodes = collect_traversal_nodes(&state.graph, &request, &state.settings.traversal)?;
            state.subnetwork = combine_nodes_links_subnetwork(
                &nodes,
                combination,
                &state.subnetwork,
                &state.network,
            );
            info!(
                ?combination,
                reached = nodes.len(),
                subnetwork = state.subnetwork.nodes.len(),
                "edited subnetwork"
            );
            state.reached = nodes;
            Ok(state)
        }
        Action::ClearSubnetwork => {
            info!("clear subnetwork");
            state.subnetwork = Network::default();
            state.reached.clear();
            Ok(state)
        }
    }
}
