//! Traversal over an assembled network.
//!
//! Everything works on [`NodeIndex`] values from a [`Graph`] and returns
//! plain index collections. Turning indices back into node records, and
//! folding them into a subnetwork, is the caller's business.
//!
//! Traversal walks positions, not reactions: a reaction's neighbors are
//! reached through its `_source`/`_target` nodes.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::graph::{Direction, Edge, Graph, LinkIndex, NodeIndex};

/// Nodes and links a search may not use.
#[derive(Debug, Clone, Default)]
pub struct Omission {
    pub nodes: HashSet<NodeIndex>,
    pub links: HashSet<LinkIndex>,
}

/// A node found during breadth traversal, at its minimum distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborResult {
    pub node: NodeIndex,
    pub distance: u32,
}

/// Edges out of `node` in `direction` that avoid the omitted nodes and links.
fn iter_neighbors<'a>(
    graph: &'a Graph,
    node: NodeIndex,
    direction: Direction,
    omission: &'a Omission,
) -> impl Iterator<Item = &'a Edge> {
    graph
        .edges(node, direction)
        .filter(move |e| !omission.links.contains(&e.link) && !omission.nodes.contains(&e.target))
}

/// Immediate neighbors of `focus`, deduplicated, never including `focus` itself.
pub fn collect_neighbors(
    graph: &Graph,
    focus: NodeIndex,
    direction: Direction,
    omission: &Omission,
) -> Vec<NodeIndex> {
    let mut seen: HashSet<NodeIndex> = HashSet::new();
    iter_neighbors(graph, focus, direction, omission)
        .map(|e| e.target)
        .filter(|&target| target != focus && seen.insert(target))
        .collect()
}

/// Multi-source BFS up to `depth` hops.
///
/// Each node is visited once, at its minimum distance. Results come in
/// visit order, focus nodes first at distance 0.
pub fn collect_nodes_traverse_breadth(
    graph: &Graph,
    focus: &[NodeIndex],
    direction: Direction,
    depth: u32,
) -> Vec<NeighborResult> {
    let mut visited: HashMap<NodeIndex, u32> = HashMap::new();
    let mut order: Vec<NeighborResult> = Vec::new();
    let mut queue: VecDeque<(NodeIndex, u32)> = VecDeque::new();
    let omission = Omission::default();

    for &node in focus {
        if (node as usize) < graph.node_count() && !visited.contains_key(&node) {
            visited.insert(node, 0);
            order.push(NeighborResult { node, distance: 0 });
            queue.push_back((node, 0));
        }
    }

    while let Some((current, distance)) = queue.pop_front() {
        if distance >= depth {
            continue;
        }
        for edge in iter_neighbors(graph, current, direction, &omission) {
            if !visited.contains_key(&edge.target) {
                visited.insert(edge.target, distance + 1);
                order.push(NeighborResult {
                    node: edge.target,
                    distance: distance + 1,
                });
                queue.push_back((edge.target, distance + 1));
            }
        }
    }

    order
}

/// node → (parent, distance from the side's root). Roots are their own parent.
type Visits = HashMap<NodeIndex, (NodeIndex, u32)>;

/// Expand one whole BFS layer of a fringe.
///
/// Returns the bridge with the shortest total path if the layer touched
/// anything the opposite side has visited.
fn expand_fringe(
    graph: &Graph,
    fringe: &mut Vec<NodeIndex>,
    visits: &mut Visits,
    opposite: &Visits,
    direction: Direction,
    omission: &Omission,
) -> Option<NodeIndex> {
    let mut next: Vec<NodeIndex> = Vec::new();
    let mut bridge: Option<(NodeIndex, u32)> = None;

    for &current in fringe.iter() {
        let distance = visits.get(&current).map_or(0, |&(_, d)| d);
        for edge in iter_neighbors(graph, current, direction, omission) {
            if visits.contains_key(&edge.target) {
                continue;
            }
            visits.insert(edge.target, (current, distance + 1));
            next.push(edge.target);
            if let Some(&(_, remaining)) = opposite.get(&edge.target) {
                let total = distance + 1 + remaining;
                if bridge.map_or(true, |(_, best)| total < best) {
                    bridge = Some((edge.target, total));
                }
            }
        }
    }

    *fringe = next;
    bridge.map(|(node, _)| node)
}

/// Walk parent pointers from `node` back to its side's root.
fn walk_parents(visits: &Visits, node: NodeIndex) -> Vec<NodeIndex> {
    let mut chain = vec![node];
    let mut current = node;
    while let Some(&(parent, _)) = visits.get(&current) {
        if parent == current {
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

/// Single shortest path by bidirectional BFS.
///
/// Grows whichever fringe is smaller, one full layer at a time, until the
/// two searches meet. The backward search from `target` walks the reverse
/// direction. Returns the node sequence from `source` to `target`, `[source]`
/// when they coincide, or an empty Vec when no path exists.
pub fn collect_shortest_path_bidirectional_breadth(
    graph: &Graph,
    source: NodeIndex,
    target: NodeIndex,
    direction: Direction,
    omission: &Omission,
) -> Vec<NodeIndex> {
    let count = graph.node_count();
    if source as usize >= count || target as usize >= count {
        return Vec::new();
    }
    if omission.nodes.contains(&source) || omission.nodes.contains(&target) {
        return Vec::new();
    }
    if source == target {
        return vec![source];
    }

    let mut forward: Visits = HashMap::from([(source, (source, 0))]);
    let mut backward: Visits = HashMap::from([(target, (target, 0))]);
    let mut forward_fringe = vec![source];
    let mut backward_fringe = vec![target];
    let reverse = direction.reverse();

    while !forward_fringe.is_empty() && !backward_fringe.is_empty() {
        let bridge = if forward_fringe.len() <= backward_fringe.len() {
            expand_fringe(graph, &mut forward_fringe, &mut forward, &backward, direction, omission)
        } else {
            expand_fringe(graph, &mut backward_fringe, &mut backward, &forward, reverse, omission)
        };
        if let Some(bridge) = bridge {
            let mut path = walk_parents(&forward, bridge);
            path.reverse();
            path.extend(walk_parents(&backward, bridge).into_iter().skip(1));
            return path;
        }
    }

    Vec::new()
}

/// Up to `count` shortest simple paths from `source` to `target` (Yen).
///
/// Paths come shortest first; among equal lengths, in discovery order.
/// For each spur node of the most recently accepted path, the spur search
/// may not reuse a link that any accepted path sharing the same root takes
/// out of the spur, nor any root node before the spur.
pub fn collect_shortest_simple_paths(
    graph: &Graph,
    source: NodeIndex,
    target: NodeIndex,
    direction: Direction,
    count: usize,
) -> Vec<Vec<NodeIndex>> {
    if count == 0 {
        return Vec::new();
    }

    let first = collect_shortest_path_bidirectional_breadth(
        graph,
        source,
        target,
        direction,
        &Omission::default(),
    );
    if first.is_empty() {
        return Vec::new();
    }

    let mut accepted: Vec<Vec<NodeIndex>> = vec![first];
    // Candidate pool: paths found but not yet accepted
    let mut candidates: Vec<Vec<NodeIndex>> = Vec::new();

    while accepted.len() < count {
        let previous = accepted[accepted.len() - 1].clone();

        // Skip the last node: no link to deviate from
        for spur_index in 0..previous.len().saturating_sub(1) {
            let spur = previous[spur_index];
            let root = &previous[..=spur_index];

            let mut omission = Omission::default();
            for path in &accepted {
                if path.len() > spur_index + 1 && path[..=spur_index] == *root {
                    omission.links.extend(graph.links_between(
                        path[spur_index],
                        path[spur_index + 1],
                        direction,
                    ));
                }
            }
            omission.nodes.extend(root[..spur_index].iter().copied());

            let spur_path = collect_shortest_path_bidirectional_breadth(
                graph,
                spur,
                target,
                direction,
                &omission,
            );
            if spur_path.is_empty() {
                continue;
            }

            let mut candidate = root[..spur_index].to_vec();
            candidate.extend(spur_path);
            if !accepted.contains(&candidate) && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }

        // First of the shortest candidates
        let Some(best) = candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, path)| path.len())
            .map(|(index, _)| index)
        else {
            break;
        };
        accepted.push(candidates.remove(best));
    }

    accepted
}

/// K shortest paths searched from both ends.
///
/// Runs Yen from `source` to `target` and again from `target` to `source`,
/// concatenates the two batches as found, sorts them by length (stable, so
/// forward paths lead among equals) and keeps the first `count`. Paths of
/// the second batch read target to source. Under undirected traversal a
/// path and its reverse both count toward `count`.
pub fn collect_bidirectional_shortest_simple_paths(
    graph: &Graph,
    source: NodeIndex,
    target: NodeIndex,
    direction: Direction,
    count: usize,
) -> Vec<Vec<NodeIndex>> {
    let mut paths = collect_shortest_simple_paths(graph, source, target, direction, count);
    paths.extend(collect_shortest_simple_paths(graph, target, source, direction, count));
    paths.sort_by_key(Vec::len);
    paths.truncate(count);
    paths
}

/// Nodes on the k shortest paths between every pair of targets.
///
/// Targets are always included, even those no path reaches.
pub fn collect_connection_network(
    graph: &Graph,
    targets: &[NodeIndex],
    direction: Direction,
    count: usize,
) -> BTreeSet<NodeIndex> {
    let mut nodes: BTreeSet<NodeIndex> = targets.iter().copied().collect();
    for (index, &first) in targets.iter().enumerate() {
        for &second in &targets[index + 1..] {
            if first == second {
                continue;
            }
            let paths =
                collect_bidirectional_shortest_simple_paths(graph, first, second, direction, count);
            for path in paths {
                nodes.extend(path);
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Directed graph from (source, target) pairs; link ids are `s_-_t`.
    fn make_graph(pairs: &[(&str, &str)]) -> Graph {
        let ids: Vec<String> = pairs.iter().map(|(s, t)| format!("{}_-_{}", s, t)).collect();
        let mut g = Graph::new();
        g.load_links(pairs.iter().zip(&ids).map(|(&(s, t), id)| (id.as_str(), s, t)));
        g
    }

    fn make_chain(n: usize) -> Graph {
        let names: Vec<String> = (0..n).map(|i| format!("n{}", i)).collect();
        let pairs: Vec<(&str, &str)> = names
            .windows(2)
            .map(|w| (w[0].as_str(), w[1].as_str()))
            .collect();
        make_graph(&pairs)
    }

    fn idx(g: &Graph, name: &str) -> NodeIndex {
        g.resolve(name).unwrap()
    }

    fn names(g: &Graph, path: &[NodeIndex]) -> Vec<String> {
        path.iter().map(|&n| g.name(n).to_string()).collect()
    }

    /// Six nodes, unique shortest a→f of three hops.
    fn make_six() -> Graph {
        make_graph(&[
            ("a", "b"),
            ("b", "c"),
            ("c", "f"),
            ("a", "d"),
            ("d", "e"),
            ("e", "c"),
            ("e", "b"),
            ("f", "a"),
        ])
    }

    // --- neighbors ---

    #[test]
    fn test_neighbors_by_direction() {
        let g = make_graph(&[("a", "b"), ("c", "a"), ("a", "d")]);
        let a = idx(&g, "a");
        let mut succ =
            names(&g, &collect_neighbors(&g, a, Direction::Successors, &Omission::default()));
        succ.sort();
        assert_eq!(succ, vec!["b", "d"]);
        let pred =
            names(&g, &collect_neighbors(&g, a, Direction::Predecessors, &Omission::default()));
        assert_eq!(pred, vec!["c"]);
        assert_eq!(collect_neighbors(&g, a, Direction::Neighbors, &Omission::default()).len(), 3);
    }

    #[test]
    fn test_neighbors_deduplicated_and_exclude_focus() {
        let g = make_graph(&[("a", "b"), ("b", "a"), ("a", "a")]);
        let a = idx(&g, "a");
        let result = collect_neighbors(&g, a, Direction::Neighbors, &Omission::default());
        assert_eq!(names(&g, &result), vec!["b"]);
    }

    #[test]
    fn test_neighbors_respect_omission() {
        let g = make_graph(&[("a", "b"), ("a", "c"), ("a", "d")]);
        let a = idx(&g, "a");
        let mut omission = Omission::default();
        omission.nodes.insert(idx(&g, "b"));
        omission.links.insert(g.resolve_link("a_-_c").unwrap());
        let result = collect_neighbors(&g, a, Direction::Successors, &omission);
        assert_eq!(names(&g, &result), vec!["d"]);
    }

    // --- breadth ---

    #[test]
    fn test_breadth_chain_depth_limited() {
        let g = make_chain(10);
        let result = collect_nodes_traverse_breadth(&g, &[0], Direction::Neighbors, 3);
        assert_eq!(result.len(), 4);
        assert_eq!(result[0], NeighborResult { node: 0, distance: 0 });
        assert!(result.iter().all(|n| n.distance <= 3));
    }

    #[test]
    fn test_breadth_depth_zero_is_focus() {
        let g = make_chain(5);
        let result = collect_nodes_traverse_breadth(&g, &[2], Direction::Neighbors, 0);
        assert_eq!(result, vec![NeighborResult { node: 2, distance: 0 }]);
    }

    #[test]
    fn test_breadth_multi_source_minimum_distance() {
        let g = make_chain(7);
        let result = collect_nodes_traverse_breadth(&g, &[0, 6], Direction::Neighbors, 10);
        assert_eq!(result.len(), 7);
        let middle = result.iter().find(|n| n.node == 3).unwrap();
        assert_eq!(middle.distance, 3);
        let near_end = result.iter().find(|n| n.node == 5).unwrap();
        assert_eq!(near_end.distance, 1);
    }

    #[test]
    fn test_breadth_directed() {
        let g = make_chain(5);
        let forward = collect_nodes_traverse_breadth(&g, &[2], Direction::Successors, 10);
        assert_eq!(forward.len(), 3);
        let backward = collect_nodes_traverse_breadth(&g, &[2], Direction::Predecessors, 10);
        assert_eq!(backward.len(), 3);
    }

    #[test]
    fn test_breadth_cycle_terminates() {
        let g = make_graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let result = collect_nodes_traverse_breadth(&g, &[0], Direction::Neighbors, 100);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_breadth_unknown_focus_ignored() {
        let g = make_chain(3);
        assert!(collect_nodes_traverse_breadth(&g, &[99], Direction::Neighbors, 3).is_empty());
    }

    // --- shortest path ---

    #[test]
    fn test_shortest_path_six_nodes() {
        let g = make_six();
        let path = collect_shortest_path_bidirectional_breadth(
            &g,
            idx(&g, "a"),
            idx(&g, "f"),
            Direction::Successors,
            &Omission::default(),
        );
        assert_eq!(names(&g, &path), vec!["a", "b", "c", "f"]);
    }

    #[test]
    fn test_shortest_path_predecessors_walks_backwards() {
        let g = make_six();
        let path = collect_shortest_path_bidirectional_breadth(
            &g,
            idx(&g, "f"),
            idx(&g, "a"),
            Direction::Predecessors,
            &Omission::default(),
        );
        assert_eq!(names(&g, &path), vec!["f", "c", "b", "a"]);
    }

    #[test]
    fn test_shortest_path_same_node() {
        let g = make_chain(3);
        let path = collect_shortest_path_bidirectional_breadth(
            &g,
            1,
            1,
            Direction::Neighbors,
            &Omission::default(),
        );
        assert_eq!(path, vec![1]);
    }

    #[test]
    fn test_shortest_path_none() {
        let g = make_graph(&[("a", "b"), ("c", "d")]);
        let path = collect_shortest_path_bidirectional_breadth(
            &g,
            idx(&g, "a"),
            idx(&g, "d"),
            Direction::Neighbors,
            &Omission::default(),
        );
        assert!(path.is_empty());
    }

    #[test]
    fn test_shortest_path_directed_unreachable() {
        let g = make_chain(4);
        let path = collect_shortest_path_bidirectional_breadth(
            &g,
            3,
            0,
            Direction::Successors,
            &Omission::default(),
        );
        assert!(path.is_empty());
    }

    #[test]
    fn test_shortest_path_long_chain() {
        let g = make_chain(50);
        let path = collect_shortest_path_bidirectional_breadth(
            &g,
            0,
            49,
            Direction::Neighbors,
            &Omission::default(),
        );
        assert_eq!(path.len(), 50);
        assert_eq!(path.first(), Some(&0));
        assert_eq!(path.last(), Some(&49));
    }

    #[test]
    fn test_shortest_path_omitted_link_detours() {
        let g = make_six();
        let mut omission = Omission::default();
        omission.links.insert(g.resolve_link("a_-_b").unwrap());
        let path = collect_shortest_path_bidirectional_breadth(
            &g,
            idx(&g, "a"),
            idx(&g, "f"),
            Direction::Successors,
            &omission,
        );
        assert_eq!(names(&g, &path), vec!["a", "d", "e", "c", "f"]);
    }

    #[test]
    fn test_shortest_path_omitted_endpoint() {
        let g = make_six();
        let mut omission = Omission::default();
        omission.nodes.insert(idx(&g, "f"));
        let path = collect_shortest_path_bidirectional_breadth(
            &g,
            idx(&g, "a"),
            idx(&g, "f"),
            Direction::Successors,
            &omission,
        );
        assert!(path.is_empty());
    }

    // --- k shortest ---

    #[test]
    fn test_k_paths_count_bound() {
        let g = make_graph(&[("s", "a"), ("a", "t"), ("s", "b"), ("b", "c"), ("c", "t")]);
        let paths =
            collect_shortest_simple_paths(&g, idx(&g, "s"), idx(&g, "t"), Direction::Successors, 3);
        assert_eq!(paths.len(), 2);
        assert_eq!(names(&g, &paths[0]), vec!["s", "a", "t"]);
        assert_eq!(names(&g, &paths[1]), vec!["s", "b", "c", "t"]);
    }

    #[test]
    fn test_k_paths_sorted_and_simple() {
        let g = make_graph(&[("s", "a"), ("s", "b"), ("a", "t"), ("b", "t"), ("a", "b")]);
        let paths =
            collect_shortest_simple_paths(&g, idx(&g, "s"), idx(&g, "t"), Direction::Successors, 5);
        let lengths: Vec<usize> = paths.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![3, 3, 4]);
        for path in &paths {
            let unique: HashSet<_> = path.iter().collect();
            assert_eq!(unique.len(), path.len());
        }
        assert!(paths.iter().any(|p| names(&g, p) == vec!["s", "a", "b", "t"]));
    }

    #[test]
    fn test_k_paths_zero_and_unreachable() {
        let g = make_chain(3);
        assert!(collect_shortest_simple_paths(&g, 0, 2, Direction::Successors, 0).is_empty());
        assert!(collect_shortest_simple_paths(&g, 2, 0, Direction::Successors, 3).is_empty());
    }

    #[test]
    fn test_k_paths_undirected_cycle() {
        let g = make_graph(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")]);
        let paths =
            collect_shortest_simple_paths(&g, idx(&g, "a"), idx(&g, "c"), Direction::Neighbors, 4);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.len() == 3));
    }

    #[test]
    fn test_bidirectional_k_paths_merge_directions() {
        // s→t one way, t→x→s the other
        let g = make_graph(&[("s", "t"), ("t", "x"), ("x", "s")]);
        let s = idx(&g, "s");
        let t = idx(&g, "t");
        let paths = collect_bidirectional_shortest_simple_paths(&g, s, t, Direction::Successors, 5);
        assert_eq!(paths.len(), 2);
        assert_eq!(names(&g, &paths[0]), vec!["s", "t"]);
        assert_eq!(names(&g, &paths[1]), vec!["t", "x", "s"]);

        let limited =
            collect_bidirectional_shortest_simple_paths(&g, s, t, Direction::Successors, 1);
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_bidirectional_k_paths_keep_reverse_batch() {
        let g = make_chain(4);
        let paths = collect_bidirectional_shortest_simple_paths(&g, 0, 3, Direction::Neighbors, 3);
        assert_eq!(paths, vec![vec![0, 1, 2, 3], vec![3, 2, 1, 0]]);
    }

    #[test]
    fn test_bidirectional_k_paths_truncate_after_concatenation() {
        // s-a-t is shorter than s-b-c-t; undirected, its reverse fills the second slot
        let g = make_graph(&[("s", "a"), ("a", "t"), ("s", "b"), ("b", "c"), ("c", "t")]);
        let s = idx(&g, "s");
        let t = idx(&g, "t");
        let paths = collect_bidirectional_shortest_simple_paths(&g, s, t, Direction::Neighbors, 2);
        let named: Vec<Vec<String>> = paths.iter().map(|p| names(&g, p)).collect();
        assert_eq!(named, vec![vec!["s", "a", "t"], vec!["t", "a", "s"]]);

        let all = collect_bidirectional_shortest_simple_paths(&g, s, t, Direction::Neighbors, 4);
        let lengths: Vec<usize> = all.iter().map(Vec::len).collect();
        assert_eq!(lengths, vec![3, 3, 4, 4]);
        assert_eq!(names(&g, &all[2]), vec!["s", "b", "c", "t"]);
        assert_eq!(names(&g, &all[3]), vec!["t", "c", "b", "s"]);
    }

    // --- connection network ---

    #[test]
    fn test_connection_network_includes_targets() {
        let g = make_graph(&[("a", "m"), ("m", "b"), ("b", "n"), ("n", "c"), ("z", "y")]);
        let targets = [idx(&g, "a"), idx(&g, "b"), idx(&g, "c"), idx(&g, "z")];
        let nodes = collect_connection_network(&g, &targets, Direction::Neighbors, 2);
        let mut got = names(&g, &nodes.into_iter().collect::<Vec<_>>());
        got.sort();
        assert_eq!(got, vec!["a", "b", "c", "m", "n", "z"]);
    }

    #[test]
    fn test_connection_network_single_target() {
        let g = make_chain(3);
        let nodes = collect_connection_network(&g, &[1], Direction::Neighbors, 3);
        assert_eq!(nodes.into_iter().collect::<Vec<_>>(), vec![1]);
    }
}
