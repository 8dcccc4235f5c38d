//! Road network route planning library.
//!
//! This crate builds a road graph from loaded node and edge tables, snaps
//! coordinates onto it, and plans distance- or time-optimal routes with A*.
//! Higher-level consumers (the CLI) should only depend on the items exported
//! here instead of reimplementing behavior.
//!

pub mod config;
pub mod cost;
pub mod error;
pub mod geo;
pub mod graph;
pub mod heuristic;
pub mod loader;
pub mod locator;
pub mod output;
pub mod path;
pub mod reconstruct;
pub mod routing;
pub mod traffic;

pub use config::Config;
pub use cost::{CostFunction, CostModel, HighwaySpeeds};
pub use error::{Error, Result};
pub use geo::{haversine_distance, Coordinates};
pub use graph::{Edge, Graph, Node, NodeId};
pub use heuristic::Heuristic;
pub use loader::{load_network, RoadNetwork};
pub use locator::nearest_node;
pub use output::{route_csv_file_name, write_route_csv, RouteStep, RouteSummary};
pub use path::find_route_a_star;
pub use routing::{
    plan_route, select_planner, AStarPlanner, DijkstraPlanner, PlannerKind, RoutePlan,
    RoutePlanner, RouteRequest,
};
pub use traffic::{apply_traffic, TrafficAdjustment, TrafficTable};
