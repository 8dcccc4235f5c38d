//! A* search over the road graph.
//!
//! The open set is a binary heap without decrease-key. Improving a node's
//! g-score pushes a fresh entry and leaves the old one in place; entries whose
//! recorded cost exceeds the node's current g-score are stale and must be
//! skipped when popped. Skipping them is required for correctness, not merely
//! an optimisation: a stale entry would otherwise re-expand a node with an
//! outdated cost.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::cost::CostModel;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::heuristic::Heuristic;

/// Best-known cost and predecessor of a reached node.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NodeState {
    g_score: f64,
    parent: Option<NodeId>,
}

/// Search state produced by a single planning call.
///
/// Owned by that call alone and dropped once the route is reconstructed.
#[derive(Debug, Clone, Default)]
pub struct SearchTree {
    states: HashMap<NodeId, NodeState>,
    explored: usize,
}

impl SearchTree {
    fn seed(start: NodeId) -> Self {
        let mut states = HashMap::new();
        states.insert(
            start,
            NodeState {
                g_score: 0.0,
                parent: None,
            },
        );
        Self {
            states,
            explored: 0,
        }
    }

    /// Best-known cumulative cost of `node`, if it was reached.
    pub fn g_score(&self, node: NodeId) -> Option<f64> {
        self.states.get(&node).map(|state| state.g_score)
    }

    /// Predecessor of `node`: `None` if unreached, `Some(None)` for the start.
    pub fn parent(&self, node: NodeId) -> Option<Option<NodeId>> {
        self.states.get(&node).map(|state| state.parent)
    }

    /// Number of nodes settled (popped with a current cost), goal included.
    pub fn explored(&self) -> usize {
        self.explored
    }

    /// Number of nodes ever reached.
    pub fn reached(&self) -> usize {
        self.states.len()
    }

    fn record(&mut self, node: NodeId, g_score: f64, parent: NodeId) {
        self.states.insert(
            node,
            NodeState {
                g_score,
                parent: Some(parent),
            },
        );
    }

    #[cfg(test)]
    pub(crate) fn from_parents(parents: &[(NodeId, Option<NodeId>)]) -> Self {
        let states = parents
            .iter()
            .map(|&(node, parent)| {
                (
                    node,
                    NodeState {
                        g_score: 0.0,
                        parent,
                    },
                )
            })
            .collect();
        Self {
            states,
            explored: parents.len(),
        }
    }
}

/// Run A* from `start` to `goal`.
///
/// Returns the search tree once `goal` is settled, or
/// [`Error::NoPathFound`] when the open set runs dry first.
pub fn find_route_a_star(
    graph: &Graph,
    cost_model: &CostModel,
    heuristic: Heuristic,
    start: NodeId,
    goal: NodeId,
) -> Result<SearchTree> {
    let mut tree = SearchTree::seed(start);
    let mut open = BinaryHeap::new();
    let mut pushes = 1usize;
    let mut stale = 0usize;

    open.push(AStarEntry::new(
        start,
        0.0,
        heuristic.estimate(graph, start, goal),
    ));

    while let Some(entry) = open.pop() {
        let current_score = match tree.g_score(entry.node) {
            Some(score) if entry.cost.0 > score => {
                stale += 1;
                continue;
            }
            Some(score) => score,
            None => continue,
        };

        tree.explored += 1;

        if entry.node == goal {
            debug!(
                explored = tree.explored,
                reached = tree.reached(),
                pushes,
                stale,
                cost = current_score,
                "goal settled"
            );
            return Ok(tree);
        }

        for edge in graph.neighbours(entry.node) {
            let Some(next) = edge.opposite(entry.node) else {
                continue;
            };

            let tentative_g = current_score + cost_model.edge_cost(edge);
            if tentative_g < tree.g_score(next).unwrap_or(f64::INFINITY) {
                tree.record(next, tentative_g, entry.node);
                let estimate = heuristic.estimate(graph, next, goal);
                open.push(AStarEntry::new(next, tentative_g, estimate));
                pushes += 1;
            }
        }
    }

    debug!(
        explored = tree.explored,
        reached = tree.reached(),
        pushes,
        stale,
        "open set exhausted"
    );
    Err(Error::NoPathFound { start, goal })
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: NodeId,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: NodeId, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest estimate, then the lowest id.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.cost.cmp(&self.cost))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
