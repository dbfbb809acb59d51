//! Combination of traversal results into the working subnetwork.
//!
//! The subnetwork is a copy of part of the network. Records the subnetwork
//! already holds keep their copy, so layout fields survive edits; new
//! records are fresh copies of the network's.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::network::{Link, Network, Node};

/// How a traversal result changes the subnetwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combination {
    #[default]
    Union,
    Difference,
}

/// Union or subtract `candidates` and rebuild the subnetwork.
///
/// Links are every network link with both endpoints selected. Output follows
/// network order; identifiers the network no longer has are dropped.
pub fn combine_nodes_links_subnetwork(
    candidates: &BTreeSet<String>,
    combination: Combination,
    subnetwork: &Network,
    network: &Network,
) -> Network {
    let network_ids: HashSet<&str> = network.nodes.iter().map(|n| n.identifier.as_str()).collect();
    for missing in candidates.iter().filter(|id| !network_ids.contains(id.as_str())) {
        debug_assert!(
            combination == Combination::Difference,
            "candidate {} missing from network",
            missing
        );
        warn!(node = %missing, "candidate missing from network, ignoring");
    }

    let current: HashSet<&str> = subnetwork.nodes.iter().map(|n| n.identifier.as_str()).collect();
    let selected: HashSet<&str> = match combination {
        Combination::Union => current
            .iter()
            .copied()
            .chain(candidates.iter().map(String::as_str))
            .collect(),
        Combination::Difference => current
            .iter()
            .copied()
            .filter(|id| !candidates.contains(*id))
            .collect(),
    };

    let previous_nodes: HashMap<&str, &Node> = subnetwork
        .nodes
        .iter()
        .map(|n| (n.identifier.as_str(), n))
        .collect();
    let previous_links: HashMap<&str, &Link> = subnetwork
        .links
        .iter()
        .map(|l| (l.identifier.as_str(), l))
        .collect();

    let nodes: Vec<Node> = network
        .nodes
        .iter()
        .filter(|n| selected.contains(n.identifier.as_str()))
        .map(|n| (*previous_nodes.get(n.identifier.as_str()).unwrap_or(&n)).clone())
        .collect();
    let links: Vec<Link> = network
        .links
        .iter()
        .filter(|l| selected.contains(l.source.as_str()) && selected.contains(l.target.as_str()))
        .map(|l| (*previous_links.get(l.identifier.as_str()).unwrap_or(&l)).clone())
        .collect();

    debug!(
        ?combination,
        candidates = candidates.len(),
        nodes = nodes.len(),
        links = links.len(),
        "combined subnetwork"
    );
    Network { nodes, links }
}

/// Carry a subnetwork across a network recompute by identifier continuity.
pub fn continue_subnetwork(subnetwork: &Network, network: &Network) -> Network {
    combine_nodes_links_subnetwork(&BTreeSet::new(), Combination::Union, subnetwork, network)
}
