use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::network::Network;

/// Dense node index, assigned in load order.
pub type NodeIndex = u32;

/// Dense link index, assigned in load order.
pub type LinkIndex = u32;

/// Which links a traversal follows from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow links from their source to their target.
    Successors,
    /// Follow links from their target back to their source.
    Predecessors,
    /// Follow links either way.
    #[default]
    Neighbors,
}

impl Direction {
    /// The direction a search from the far end has to walk.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Successors => Direction::Predecessors,
            Direction::Predecessors => Direction::Successors,
            Direction::Neighbors => Direction::Neighbors,
        }
    }
}

/// An adjacency entry: the node at the other end and the link that gets there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: NodeIndex,
    pub link: LinkIndex,
}

/// In-memory graph: adjacency lists + interned node and link identifiers.
///
/// Edges are stored bidirectionally: `outgoing[a]` contains links leaving a,
/// `incoming[b]` contains links entering b with `target` set to the far end.
/// Both are populated on load. The graph is a read-only index over a
/// network; it never owns node or link records.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    outgoing: Vec<Vec<Edge>>,
    incoming: Vec<Vec<Edge>>,
    nodes: Vec<String>,
    node_index: HashMap<String, NodeIndex>,
    links: Vec<String>,
    link_index: HashMap<String, LinkIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize, link_count: usize) -> Self {
        Self {
            outgoing: Vec::with_capacity(node_count),
            incoming: Vec::with_capacity(node_count),
            nodes: Vec::with_capacity(node_count),
            node_index: HashMap::with_capacity(node_count),
            links: Vec::with_capacity(link_count),
            link_index: HashMap::with_capacity(link_count),
        }
    }

    /// Index an assembled network.
    ///
    /// A link naming an unknown node is a data error: it trips a debug
    /// assertion and is skipped in release builds.
    pub fn from_network(network: &Network) -> Self {
        let mut graph = Self::with_capacity(network.nodes.len(), network.links.len());
        for node in &network.nodes {
            graph.intern_node(&node.identifier);
        }
        for link in &network.links {
            match (graph.resolve(&link.source), graph.resolve(&link.target)) {
                (Some(source), Some(target)) => graph.add_link(&link.identifier, source, target),
                _ => {
                    debug_assert!(false, "link {} references a missing node", link.identifier);
                    warn!(link = %link.identifier, "link references a missing node, skipping");
                }
            }
        }
        graph
    }

    /// Intern a node identifier, returning its compact index.
    pub fn intern_node(&mut self, identifier: &str) -> NodeIndex {
        if let Some(&index) = self.node_index.get(identifier) {
            return index;
        }
        let index = self.nodes.len() as NodeIndex;
        self.nodes.push(identifier.to_string());
        self.node_index.insert(identifier.to_string(), index);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        index
    }

    /// Add a directed link. Also inserts into the incoming adjacency list.
    /// A link identifier already present is ignored.
    pub fn add_link(&mut self, identifier: &str, source: NodeIndex, target: NodeIndex) {
        if self.link_index.contains_key(identifier) {
            return;
        }
        let link = self.links.len() as LinkIndex;
        self.links.push(identifier.to_string());
        self.link_index.insert(identifier.to_string(), link);
        self.outgoing[source as usize].push(Edge { target, link });
        self.incoming[target as usize].push(Edge { target: source, link });
    }

    /// Bulk load from (link, source, target) identifier triples, interning
    /// endpoints as they appear.
    pub fn load_links<'a, I>(&mut self, links: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    {
        for (identifier, source, target) in links {
            let source = self.intern_node(source);
            let target = self.intern_node(target);
            self.add_link(identifier, source, target);
        }
    }

    /// Look up a node by its network identifier.
    pub fn resolve(&self, identifier: &str) -> Option<NodeIndex> {
        self.node_index.get(identifier).copied()
    }

    /// Look up a link by its network identifier.
    pub fn resolve_link(&self, identifier: &str) -> Option<LinkIndex> {
        self.link_index.get(identifier).copied()
    }

    /// Resolve a NodeIndex back to its identifier.
    pub fn name(&self, index: NodeIndex) -> &str {
        &self.nodes[index as usize]
    }

    /// Resolve a LinkIndex back to its identifier.
    pub fn link_name(&self, index: LinkIndex) -> &str {
        &self.links[index as usize]
    }

    pub fn successors(&self, index: NodeIndex) -> &[Edge] {
        self.outgoing
            .get(index as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn predecessors(&self, index: NodeIndex) -> &[Edge] {
        self.incoming
            .get(index as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Edges usable from `index` when walking in `direction`.
    pub fn edges(&self, index: NodeIndex, direction: Direction) -> impl Iterator<Item = &Edge> {
        let (use_out, use_in) = match direction {
            Direction::Successors => (true, false),
            Direction::Predecessors => (false, true),
            Direction::Neighbors => (true, true),
        };
        let out_iter = self.successors(index).iter().filter(move |_| use_out);
        let in_iter = self.predecessors(index).iter().filter(move |_| use_in);
        out_iter.chain(in_iter)
    }

    /// Links that take a walk in `direction` from `from` directly to `to`.
    pub fn links_between(
        &self,
        from: NodeIndex,
        to: NodeIndex,
        direction: Direction,
    ) -> Vec<LinkIndex> {
        self.edges(from, direction)
            .filter(|e| e.target == to)
            .map(|e| e.link)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let names: usize = self
            .nodes
            .iter()
            .chain(self.links.iter())
            .map(|s| s.capacity() + size_of::<String>())
            .sum();
        let out_edges: usize = self.outgoing.iter().map(|v| v.len() * size_of::<Edge>()).sum();
        let in_edges: usize = self.incoming.iter().map(|v| v.len() * size_of::<Edge>()).sum();
        let index_mem = (self.node_index.len() + self.link_index.len()) * 80;

        names + out_edges + in_edges + index_mem
    }
}
