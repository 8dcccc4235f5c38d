//! Route planning entry points.
//!
//! This module provides:
//! - [`PlannerKind`] - Supported planning algorithms (A*, Dijkstra)
//! - [`RouteRequest`] - Coordinates plus cost configuration for one query
//! - [`RoutePlan`] - Planned route result
//! - [`plan_route`] - Convenience entry point selecting a planner per request
//!
//! # Strategy Pattern
//!
//! Each algorithm is a [`RoutePlanner`] implementation chosen by
//! [`select_planner`]. Planners capture their [`CostModel`] by value, so a
//! single [`Graph`] can serve any number of planners, on any number of
//! threads, without shared mutable state.
//!
//! # Example
//!
//! ```ignore
//! use roadroute_lib::{plan_route, Coordinates, CostModel, RouteRequest};
//!
//! let request = RouteRequest::a_star(
//!     Coordinates::new(0.0, 0.0),
//!     Coordinates::new(0.0, 0.02),
//!     CostModel::time(25.0),
//! );
//! let plan = plan_route(&graph, &request)?;
//! println!("{} nodes, {:.0} s", plan.path.len(), plan.total_time);
//! ```

mod planner;

pub use planner::{select_planner, AStarPlanner, DijkstraPlanner, RoutePlanner};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cost::{CostFunction, CostModel};
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::graph::{Graph, NodeId};
use crate::heuristic::Heuristic;
use crate::locator::nearest_node;
use crate::path::find_route_a_star;
use crate::reconstruct::reconstruct_path;

/// Supported planning algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PlannerKind {
    /// A* search guided by a straight-line heuristic.
    #[default]
    #[serde(rename = "astar")]
    AStar,
    /// Uniform-cost search; A* with a zero heuristic.
    #[serde(rename = "dijkstra")]
    Dijkstra,
}

impl fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            PlannerKind::AStar => "astar",
            PlannerKind::Dijkstra => "dijkstra",
        };
        f.write_str(value)
    }
}

impl FromStr for PlannerKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "astar" | "a-star" | "a_star" | "a*" => Ok(PlannerKind::AStar),
            "dijkstra" => Ok(PlannerKind::Dijkstra),
            _ => Err(Error::UnknownPlanner {
                name: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PlannerKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// High-level route planning request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub start: Coordinates,
    pub goal: Coordinates,
    pub planner: PlannerKind,
    pub cost_model: CostModel,
}

impl RouteRequest {
    /// Convenience constructor for A* queries.
    pub fn a_star(start: Coordinates, goal: Coordinates, cost_model: CostModel) -> Self {
        Self {
            start,
            goal,
            planner: PlannerKind::AStar,
            cost_model,
        }
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    /// Human-readable description of the planner configuration.
    pub planner: String,
    pub algorithm: PlannerKind,
    pub cost_function: CostFunction,
    pub start: NodeId,
    pub goal: NodeId,
    /// Node ids from start to goal, both included.
    pub path: Vec<NodeId>,
    /// Meters.
    pub total_distance: f64,
    /// Seconds.
    pub total_time: f64,
    pub nodes_explored: usize,
}

impl RoutePlan {
    /// Number of edges traversed.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Plan a route with the planner named in `request`.
pub fn plan_route(graph: &Graph, request: &RouteRequest) -> Result<RoutePlan> {
    let planner = select_planner(request.planner, request.cost_model.clone());
    planner.plan(graph, &request.start, &request.goal)
}

/// Shared driver behind every planner: snap, search, reconstruct.
fn run_search(
    graph: &Graph,
    algorithm: PlannerKind,
    planner_name: String,
    cost_model: &CostModel,
    heuristic: Heuristic,
    start_coord: &Coordinates,
    goal_coord: &Coordinates,
) -> Result<RoutePlan> {
    let start = nearest_node(graph, start_coord).ok_or(Error::NodeNotFound {
        coordinate: *start_coord,
    })?;
    let goal = nearest_node(graph, goal_coord).ok_or(Error::NodeNotFound {
        coordinate: *goal_coord,
    })?;
    debug!(start, goal, planner = %planner_name, "snapped query coordinates");

    let tree = find_route_a_star(graph, cost_model, heuristic, start, goal)?;
    let route = reconstruct_path(graph, cost_model, &tree, start, goal)?;

    Ok(RoutePlan {
        planner: planner_name,
        algorithm,
        cost_function: cost_model.function(),
        start,
        goal,
        path: route.path,
        total_distance: route.total_distance,
        total_time: route.total_time,
        nodes_explored: tree.explored(),
    })
}
