//! Route planning strategies implementing the Strategy pattern.
//!
//! This module provides the `RoutePlanner` trait and its implementations. New
//! algorithms are added as another implementation plus a [`PlannerKind`]
//! variant; callers only ever hold a `Box<dyn RoutePlanner>`.

use crate::cost::{CostFunction, CostModel};
use crate::error::Result;
use crate::geo::Coordinates;
use crate::graph::Graph;
use crate::heuristic::Heuristic;

use super::{run_search, PlannerKind, RoutePlan};

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn kind(&self) -> PlannerKind;

    /// Label describing the algorithm and its active configuration.
    fn name(&self) -> String;

    /// Cost model the planner currently optimises.
    fn cost_model(&self) -> &CostModel;

    /// Replace the objective and default speed, keeping the highway table.
    fn set_cost_function(&mut self, function: CostFunction, default_speed_mph: f64);

    /// Plan a path between two arbitrary coordinates.
    ///
    /// Both coordinates are snapped to their nearest graph node first.
    fn plan(&self, graph: &Graph, start: &Coordinates, goal: &Coordinates) -> Result<RoutePlan>;
}

/// A* planner whose heuristic follows the cost model's objective.
#[derive(Debug, Clone, Default)]
pub struct AStarPlanner {
    cost_model: CostModel,
}

impl AStarPlanner {
    pub fn new(cost_model: CostModel) -> Self {
        Self { cost_model }
    }
}

impl RoutePlanner for AStarPlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::AStar
    }

    fn name(&self) -> String {
        describe("A*", &self.cost_model)
    }

    fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    fn set_cost_function(&mut self, function: CostFunction, default_speed_mph: f64) {
        self.cost_model = rebuild(&self.cost_model, function, default_speed_mph);
    }

    fn plan(&self, graph: &Graph, start: &Coordinates, goal: &Coordinates) -> Result<RoutePlan> {
        run_search(
            graph,
            self.kind(),
            self.name(),
            &self.cost_model,
            Heuristic::for_cost_model(&self.cost_model),
            start,
            goal,
        )
    }
}

/// Uniform-cost planner: the A* engine with a zero heuristic.
///
/// Explores more nodes than [`AStarPlanner`] but stays optimal even when the
/// speed configuration would make the time heuristic inadmissible.
#[derive(Debug, Clone, Default)]
pub struct DijkstraPlanner {
    cost_model: CostModel,
}

impl DijkstraPlanner {
    pub fn new(cost_model: CostModel) -> Self {
        Self { cost_model }
    }
}

impl RoutePlanner for DijkstraPlanner {
    fn kind(&self) -> PlannerKind {
        PlannerKind::Dijkstra
    }

    fn name(&self) -> String {
        describe("Dijkstra", &self.cost_model)
    }

    fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    fn set_cost_function(&mut self, function: CostFunction, default_speed_mph: f64) {
        self.cost_model = rebuild(&self.cost_model, function, default_speed_mph);
    }

    fn plan(&self, graph: &Graph, start: &Coordinates, goal: &Coordinates) -> Result<RoutePlan> {
        run_search(
            graph,
            self.kind(),
            self.name(),
            &self.cost_model,
            Heuristic::Zero,
            start,
            goal,
        )
    }
}

/// Select the planner implementation for `kind`.
pub fn select_planner(kind: PlannerKind, cost_model: CostModel) -> Box<dyn RoutePlanner> {
    match kind {
        PlannerKind::AStar => Box::new(AStarPlanner::new(cost_model)),
        PlannerKind::Dijkstra => Box::new(DijkstraPlanner::new(cost_model)),
    }
}

fn describe(algorithm: &str, model: &CostModel) -> String {
    match model.function() {
        CostFunction::Distance => format!("{algorithm} (distance)"),
        CostFunction::Time => format!(
            "{algorithm} (time, default {} mph)",
            model.default_speed_mph()
        ),
    }
}

fn rebuild(current: &CostModel, function: CostFunction, default_speed_mph: f64) -> CostModel {
    CostModel::new(function, default_speed_mph).with_highway_speeds(current.highway_speeds().clone())
}
