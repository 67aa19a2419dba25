//! Topological scheduling: Kahn's algorithm plus level grouping.

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::{debug, instrument};

use super::edges::classify_incoming;
use super::{Edge, ExecutionStep, Node, filter_nodes};

/// Errors raised while building an execution plan.
#[derive(Debug, Error, Diagnostic)]
pub enum SchedulerError {
    /// The graph contains at least one cycle among its non-group nodes.
    #[error("graph contains a cycle: {0} of {1} nodes could be scheduled")]
    #[diagnostic(
        code(loomgraph::scheduler::cycle),
        help("Break the cycle by removing or redirecting one of the offending edges.")
    )]
    Cycle(usize, usize),
}

/// A schedule: the flat step list (in emission order) plus the same steps
/// partitioned into dependency levels.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub steps: Vec<ExecutionStep>,
    pub levels: Vec<Vec<ExecutionStep>>,
}

/// Build the execution plan for one run: Kahn's algorithm over the filtered
/// node set, followed by level grouping.
///
/// The resulting `steps` order is the Kahn emission order (FIFO tie-break
/// within each zero-in-degree wave), which callers may rely on for
/// deterministic behavior.
#[instrument(skip(nodes, edges), fields(node_count = nodes.len(), edge_count = edges.len()), err)]
pub fn schedule(nodes: &[Node], edges: &[Edge]) -> Result<Schedule, SchedulerError> {
    let filtered = filter_nodes(nodes);
    let filtered_ids: FxHashSet<&str> = filtered.iter().map(|n| n.id.as_str()).collect();

    let restricted_edges: Vec<&Edge> = edges
        .iter()
        .filter(|e| filtered_ids.contains(e.source.as_str()) && filtered_ids.contains(e.target.as_str()))
        .collect();

    let mut in_degree: FxHashMap<&str, usize> = filtered.iter().map(|n| (n.id.as_str(), 0)).collect();
    let mut successors: FxHashMap<&str, Vec<&str>> = filtered.iter().map(|n| (n.id.as_str(), Vec::new())).collect();
    for edge in &restricted_edges {
        *in_degree.get_mut(edge.target.as_str()).expect("target in filtered set") += 1;
        successors
            .get_mut(edge.source.as_str())
            .expect("source in filtered set")
            .push(edge.target.as_str());
    }

    let mut queue: std::collections::VecDeque<&Node> = filtered
        .iter()
        .filter(|n| in_degree[n.id.as_str()] == 0)
        .copied()
        .collect();

    let mut steps = Vec::with_capacity(filtered.len());
    let mut level_of: FxHashMap<String, usize> = FxHashMap::default();

    while let Some(node) = queue.pop_front() {
        let (text_inputs, adapter_inputs) = classify_incoming(&node.id, edges);
        let level = text_inputs
            .iter()
            .chain(adapter_inputs.iter())
            .filter_map(|dep| level_of.get(*dep))
            .max()
            .map_or(0, |max| max + 1);
        level_of.insert(node.id.clone(), level);

        steps.push(ExecutionStep {
            node_id: node.id.clone(),
            node_type: node.resolved_type(),
            input_node_ids: text_inputs.into_iter().map(str::to_string).collect(),
            adapter_node_ids: adapter_inputs.into_iter().map(str::to_string).collect(),
        });

        for succ in &successors[node.id.as_str()] {
            let degree = in_degree.get_mut(succ).expect("successor in filtered set");
            *degree -= 1;
            if *degree == 0 {
                let succ_node = filtered.iter().find(|n| n.id == *succ).expect("successor node exists");
                queue.push_back(succ_node);
            }
        }
    }

    if steps.len() != filtered.len() {
        return Err(SchedulerError::Cycle(steps.len(), filtered.len()));
    }

    let max_level = level_of.values().copied().max().unwrap_or(0);
    let mut levels: Vec<Vec<ExecutionStep>> = (0..=max_level).map(|_| Vec::new()).collect();
    for step in &steps {
        let level = level_of[&step.node_id];
        levels[level].push(step.clone());
    }
    if steps.is_empty() {
        levels.clear();
    }

    debug!(steps = steps.len(), levels = levels.len(), "schedule computed");
    Ok(Schedule { steps, levels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use rustc_hash::FxHashMap as Map;

    fn node(id: &str, ty: &str) -> Node {
        Node {
            id: id.to_string(),
            node_type: Some(ty.to_string()),
            data: Map::default(),
        }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
            target_handle: None,
        }
    }

    #[test]
    fn straight_line_levels() {
        let nodes = vec![node("a", "initialPrompt"), node("b", "translator"), node("c", "textOutput")];
        let edges = vec![edge("a", "b"), edge("b", "c")];
        let plan = schedule(&nodes, &edges).unwrap();
        assert_eq!(plan.steps.iter().map(|s| s.node_id.as_str()).collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(plan.levels.len(), 3);
    }

    #[test]
    fn group_nodes_excluded() {
        let nodes = vec![node("a", "initialPrompt"), node("g", "group")];
        let edges = vec![edge("g", "a")];
        let plan = schedule(&nodes, &edges).unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].input_node_ids.len(), 0);
    }

    #[test]
    fn duplicate_ids_deduplicated_first_wins() {
        let nodes = vec![node("a", "initialPrompt"), node("a", "translator")];
        let plan = schedule(&nodes, &[]).unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].node_type, "initialPrompt");
    }

    #[test]
    fn cycle_is_rejected() {
        let nodes = vec![node("a", "initialPrompt"), node("b", "translator")];
        let edges = vec![edge("a", "b"), edge("b", "a")];
        let err = schedule(&nodes, &edges).unwrap_err();
        assert!(matches!(err, SchedulerError::Cycle(0, 2)));
    }

    #[test]
    fn fifo_tie_break_within_a_wave() {
        let nodes = vec![node("c", "textOutput"), node("a", "initialPrompt"), node("b", "initialPrompt")];
        let plan = schedule(&nodes, &[]).unwrap();
        assert_eq!(plan.steps.iter().map(|s| s.node_id.as_str()).collect::<Vec<_>>(), vec!["c", "a", "b"]);
    }

    #[test]
    fn diamond_level_grouping() {
        let nodes = vec![
            node("p", "consistentCharacter"),
            node("s", "sceneBuilder"),
            node("m", "promptEnhancer"),
            node("o", "textOutput"),
        ];
        let edges = vec![edge("p", "m"), edge("s", "m"), edge("m", "o")];
        let plan = schedule(&nodes, &edges).unwrap();
        assert_eq!(plan.levels[0].iter().map(|s| s.node_id.as_str()).collect::<Vec<_>>(), vec!["p", "s"]);
        assert_eq!(plan.levels[1][0].node_id, "m");
        assert_eq!(plan.levels[2][0].node_id, "o");
    }
}
