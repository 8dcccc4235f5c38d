//! Lower-bound estimates of the remaining cost to the goal.
//!
//! Estimates are only admissible when every edge is at least as long as the
//! great-circle distance between its endpoints and, for the time objective,
//! no edge is faster than the assumed best speed. Neither can be checked here.

use crate::cost::{CostFunction, CostModel, MPH_TO_MPS};
use crate::graph::{Graph, NodeId};

/// Optimistic speed ceiling assumed reachable somewhere in the network.
pub const OPTIMISTIC_SPEED_MPH: f64 = 100.0;

/// Remaining-cost estimate matching the unit of the active cost model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Heuristic {
    /// Always zero; turns A* into Dijkstra.
    Zero,
    /// Straight-line distance in meters.
    Distance,
    /// Straight-line distance divided by the fastest plausible speed, in seconds.
    Time { best_speed_mps: f64 },
}

impl Heuristic {
    /// Heuristic consistent with `model`'s objective.
    pub fn for_cost_model(model: &CostModel) -> Self {
        match model.function() {
            CostFunction::Distance => Heuristic::Distance,
            CostFunction::Time => Heuristic::Time {
                best_speed_mps: assumed_best_speed_mph(model) * MPH_TO_MPS,
            },
        }
    }

    /// Estimated cost from `node` to `goal`. Missing nodes estimate to zero,
    /// which keeps the bound admissible.
    pub fn estimate(&self, graph: &Graph, node: NodeId, goal: NodeId) -> f64 {
        let straight_line = || graph.straight_line_distance(node, goal).unwrap_or(0.0);
        match *self {
            Heuristic::Zero => 0.0,
            Heuristic::Distance => straight_line(),
            Heuristic::Time { best_speed_mps } => straight_line() / best_speed_mps,
        }
    }
}

/// Fastest speed the time heuristic assumes: the larger of the default speed,
/// the fastest highway table entry, and [`OPTIMISTIC_SPEED_MPH`].
pub fn assumed_best_speed_mph(model: &CostModel) -> f64 {
    let table = model.highway_speeds().fastest().unwrap_or(0.0);
    model
        .default_speed_mph()
        .max(table)
        .max(OPTIMISTIC_SPEED_MPH)
}
