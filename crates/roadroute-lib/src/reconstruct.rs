//! Turn a finished search tree into an ordered path with aggregate metrics.

use crate::cost::CostModel;
use crate::error::{Error, Result};
use crate::graph::{Edge, Graph, NodeId};
use crate::path::SearchTree;

/// Ordered start-to-goal path plus totals derived from real edge metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedPath {
    pub path: Vec<NodeId>,
    /// Meters.
    pub total_distance: f64,
    /// Seconds.
    pub total_time: f64,
}

/// Walk the parent chain from `goal` back to `start` and total up the path.
///
/// Totals are recomputed from the connecting edges rather than taken from the
/// search's g-scores, so both distance and time are reported whichever
/// objective was optimised. Where parallel edges join two consecutive nodes,
/// the one cheapest under `cost_model` is used, matching the search's choice.
///
/// A chain that does not end at `start`, or a hop with no connecting edge, is
/// a broken search invariant and yields [`Error::InconsistentState`].
pub fn reconstruct_path(
    graph: &Graph,
    cost_model: &CostModel,
    tree: &SearchTree,
    start: NodeId,
    goal: NodeId,
) -> Result<ReconstructedPath> {
    let mut path = Vec::new();
    let mut current = goal;

    loop {
        path.push(current);
        // A chain longer than the number of reached nodes must contain a cycle.
        if path.len() > tree.reached() {
            return Err(inconsistent(current));
        }
        match tree.parent(current) {
            Some(Some(parent)) => current = parent,
            Some(None) => break,
            None => return Err(inconsistent(current)),
        }
    }

    if current != start {
        return Err(inconsistent(current));
    }
    path.reverse();

    let mut total_distance = 0.0;
    let mut total_time = 0.0;
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let edge = hop_edge(graph, cost_model, from, to).ok_or_else(|| inconsistent(to))?;
        total_distance += edge.distance;
        total_time += cost_model.travel_time_seconds(edge);
    }

    Ok(ReconstructedPath {
        path,
        total_distance,
        total_time,
    })
}

/// Edge the search relaxed for the hop `from -> to`: the only connecting edge,
/// or the cheapest of several parallel ones under the active objective.
fn hop_edge<'g>(
    graph: &'g Graph,
    cost_model: &CostModel,
    from: NodeId,
    to: NodeId,
) -> Option<&'g Edge> {
    if graph.edges_between(from, to).nth(1).is_none() {
        return graph.edge_between(from, to);
    }
    graph
        .edges_between(from, to)
        .min_by(|a, b| cost_model.edge_cost(a).total_cmp(&cost_model.edge_cost(b)))
}

fn inconsistent(node: NodeId) -> Error {
    debug_assert!(false, "parent chain broken at node {node}");
    Error::InconsistentState { node }
}
