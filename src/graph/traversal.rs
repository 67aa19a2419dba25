//! BFS ancestor/descendant traversal over the edge graph, used for partial
//! re-execution planning.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use super::{Edge, Node, filter_nodes};

fn restricted_adjacency<'a>(
    nodes: &'a [Node],
    edges: &'a [Edge],
) -> (FxHashMap<&'a str, Vec<&'a str>>, FxHashMap<&'a str, Vec<&'a str>>) {
    let filtered = filter_nodes(nodes);
    let filtered_ids: FxHashSet<&str> = filtered.iter().map(|n| n.id.as_str()).collect();

    let mut successors: FxHashMap<&str, Vec<&str>> = filtered.iter().map(|n| (n.id.as_str(), Vec::new())).collect();
    let mut predecessors: FxHashMap<&str, Vec<&str>> = filtered.iter().map(|n| (n.id.as_str(), Vec::new())).collect();
    for edge in edges {
        if filtered_ids.contains(edge.source.as_str()) && filtered_ids.contains(edge.target.as_str()) {
            successors.get_mut(edge.source.as_str()).unwrap().push(edge.target.as_str());
            predecessors.get_mut(edge.target.as_str()).unwrap().push(edge.source.as_str());
        }
    }
    (successors, predecessors)
}

fn bfs(start: &str, adjacency: &FxHashMap<&str, Vec<&str>>) -> FxHashSet<String> {
    let mut visited = FxHashSet::default();
    let mut queue = VecDeque::new();
    if let Some(neighbors) = adjacency.get(start) {
        for n in neighbors {
            if visited.insert((*n).to_string()) {
                queue.push_back(*n);
            }
        }
    }
    while let Some(current) = queue.pop_front() {
        if let Some(neighbors) = adjacency.get(current) {
            for n in neighbors {
                if visited.insert((*n).to_string()) {
                    queue.push_back(*n);
                }
            }
        }
    }
    visited
}

/// All nodes reachable forward from `start` (excluding `start` itself).
#[must_use]
pub fn descendants(start: &str, nodes: &[Node], edges: &[Edge]) -> FxHashSet<String> {
    let (successors, _) = restricted_adjacency(nodes, edges);
    bfs(start, &successors)
}

/// All nodes reachable backward from `start` (excluding `start` itself).
#[must_use]
pub fn ancestors(start: &str, nodes: &[Node], edges: &[Edge]) -> FxHashSet<String> {
    let (_, predecessors) = restricted_adjacency(nodes, edges);
    bfs(start, &predecessors)
}
