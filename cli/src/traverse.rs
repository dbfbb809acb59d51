//! Traversal requests against the current network.

use std::collections::BTreeSet;

use metanet_core::{
    collect_bidirectional_shortest_simple_paths, collect_connection_network, collect_neighbors,
    collect_nodes_traverse_breadth, collect_shortest_path_bidirectional_breadth, Direction, Graph,
    NodeIndex, Omission,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{TraversalLimits, PATHS_BOUNDS};
use crate::error::{ExplorerError, Result};
use crate::util::check_range;

/// A traversal whose visited nodes feed a subnetwork edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TraversalRequest {
    /// The focus and its immediate neighbors.
    Neighbors { focus: String, direction: Direction },
    /// Everything within `depth` hops of any focus node.
    Proximity {
        focus: Vec<String>,
        direction: Direction,
        depth: u32,
    },
    /// Nodes on the shortest path, or on up to `count` shortest paths.
    Path {
        source: String,
        target: String,
        direction: Direction,
        count: u32,
    },
    /// Nodes on the shortest paths between every pair of targets.
    Connection {
        targets: Vec<String>,
        direction: Direction,
        count: u32,
    },
}

/// Resolve a node identifier against the graph.
pub fn resolve_node(graph: &Graph, identifier: &str) -> Result<NodeIndex> {
    graph
        .resolve(identifier)
        .ok_or_else(|| ExplorerError::NodeNotFound(identifier.to_string()))
}

fn resolve_nodes(graph: &Graph, identifiers: &[String]) -> Result<Vec<NodeIndex>> {
    identifiers.iter().map(|id| resolve_node(graph, id)).collect()
}

fn check_count(count: u32, limits: &TraversalLimits) -> Result<usize> {
    let maximum = limits.max_paths.min(PATHS_BOUNDS.1);
    Ok(check_range("count", i64::from(count), (PATHS_BOUNDS.0, maximum))? as usize)
}

/// Run a request and return the identifiers of every node it reached.
pub fn collect_traversal_nodes(
    graph: &Graph,
    request: &TraversalRequest,
    limits: &TraversalLimits,
) -> Result<BTreeSet<String>> {
    let nodes: Vec<NodeIndex> = match request {
        TraversalRequest::Neighbors { focus, direction } => {
            let focus = resolve_node(graph, focus)?;
            let mut nodes = collect_neighbors(graph, focus, *direction, &Omission::default());
            nodes.push(focus);
            nodes
        }
        TraversalRequest::Proximity {
            focus,
            direction,
            depth,
        } => {
            let depth = check_range("depth", i64::from(*depth), (0, limits.max_depth))?;
            let focus = resolve_nodes(graph, focus)?;
            collect_nodes_traverse_breadth(graph, &focus, *direction, depth)
                .into_iter()
                .map(|n| n.node)
                .collect()
        }
        TraversalRequest::Path {
            source,
            target,
            direction,
            count,
        } => {
            let count = check_count(*count, limits)?;
            let source = resolve_node(graph, source)?;
            let target = resolve_node(graph, target)?;
            if count == 1 {
                collect_shortest_path_bidirectional_breadth(
                    graph,
                    source,
                    target,
                    *direction,
                    &Omission::default(),
                )
            } else {
                collect_bidirectional_shortest_simple_paths(
                    graph,
                    source,
                    target,
                    *direction,
                    count,
                )
                    .into_iter()
                    .flatten()
                    .collect()
            }
        }
        TraversalRequest::Connection {
            targets,
            direction,
            count,
        } => {
            let count = check_count(*count, limits)?;
            let targets = resolve_nodes(graph, targets)?;
            collect_connection_network(graph, &targets, *direction, count)
                .into_iter()
                .collect()
        }
    };

    let names: BTreeSet<String> = nodes.into_iter().map(|n| graph.name(n).to_string()).collect();
    debug!(?request, nodes = names.len(), "traversal collected nodes");
    Ok(names)
}
