use metanet_core::SimplificationMethod;
use serde::Serialize;

use crate::state::ExplorerState;

/// Snapshot of the explorer for the `status` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub generation: u64,
    pub compartmentalization: bool,
    pub strategy: SimplificationMethod,
    pub compartments: String,
    pub processes: String,
    pub reactions: usize,
    pub metabolites: usize,
    pub candidate_reactions: usize,
    pub candidate_metabolites: usize,
    pub simplified_reactions: usize,
    pub simplified_metabolites: usize,
    pub explicit_designations: usize,
    /// Network nodes touched by a designation, replicates included.
    pub simplified_nodes: usize,
    pub node_count: usize,
    pub link_count: usize,
    pub memory_bytes: usize,
    pub subnetwork_nodes: usize,
    pub subnetwork_links: usize,
    pub recompute_time_ms: f64,
}

pub fn status(state: &ExplorerState) -> Status {
    let candidacy = &state.candidacy;
    Status {
        generation: state.generation,
        compartmentalization: state.settings.compartmentalization,
        strategy: state.settings.simplification,
        compartments: state.settings.filters.compartments.clone(),
        processes: state.settings.filters.processes.clone(),
        reactions: state.filtered.reactions.len(),
        metabolites: state.filtered.metabolites.len(),
        candidate_reactions: candidacy.reactions.len(),
        candidate_metabolites: candidacy.metabolites.len(),
        simplified_reactions: candidacy.reactions_simplifications.len(),
        simplified_metabolites: candidacy.metabolites_simplifications.len(),
        explicit_designations: state.simplifications.reactions.len()
            + state.simplifications.metabolites.len(),
        simplified_nodes: state.network.nodes.iter().filter(|n| n.simplification()).count(),
        node_count: state.graph.node_count(),
        link_count: state.graph.link_count(),
        memory_bytes: state.graph.memory_usage(),
        subnetwork_nodes: state.subnetwork.nodes.len(),
        subnetwork_links: state.subnetwork.links.len(),
        recompute_time_ms: state.recompute_time_ms,
    }
}
