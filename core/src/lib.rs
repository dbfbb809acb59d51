//! metanet-core: metabolic network exploration engine.
//!
//! A pure Rust library that resolves which reactions and metabolites of a
//! filtered model are candidates for display, assembles them into a
//! node-link network, and answers traversal queries (neighbors, proximity,
//! shortest and k-shortest paths, multi-target connections) used to grow
//! and shrink a working subnetwork.
//! No I/O: the `metanet-cli` crate loads models and keeps state.

mod candidacy;
mod enhancement;
mod graph;
mod model;
mod network;
mod participants;
mod subnetwork;
mod summary;
mod traversal;

pub use candidacy::{
    collect_candidate_metabolites, collect_candidate_reactions, collect_redundant_replicates,
    determine_implicit_simplifications, determine_priority, determine_reaction_relevance,
    determine_reactions_redundancy, explicit_only, relevant_participants, resolve_candidacy,
    toggle_simplification, Behavior, Candidacy, CandidacyInput, CandidateMetabolite,
    CandidateReaction,
};
pub use enhancement::{
    collect_reaction_transports, determine_reaction_conversion, determine_reaction_dispersal,
    enhance_reactions, include_reactions_behaviors, include_reactions_replications,
    include_reactions_transport_processes,
};
pub use graph::{Direction, Edge, Graph, LinkIndex, NodeIndex};
pub use model::{
    candidate_metabolite_id, Category, Entity, Metabolite, Model, Participant, Reaction, Role,
    Simplification, SimplificationMethod, Simplifications, Transport,
};
pub use network::{
    assemble_network, consensus_reaction, link_identifier, position_identifier, AssemblyInput,
    Link, Network, NetworkElements, Node, NodeType, Side,
};
pub use participants::{
    collect_compartments, collect_metabolites, filter_participants, has_role, mutually_inclusive,
    unique, Criteria,
};
pub use subnetwork::{combine_nodes_links_subnetwork, continue_subnetwork, Combination};
pub use summary::{index_attributes, summarize, AttributeRow, ValueSummary};
pub use traversal::{
    collect_bidirectional_shortest_simple_paths, collect_connection_network,
    collect_neighbors, collect_nodes_traverse_breadth, collect_shortest_path_bidirectional_breadth,
    collect_shortest_simple_paths, NeighborResult, Omission,
};
