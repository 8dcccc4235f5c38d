use std::fmt::Write as _;
use std::io::Write;

use serde::Serialize;

use crate::cost::CostFunction;
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::graph::{Graph, NodeId};
use crate::routing::RoutePlan;

const METERS_PER_MILE: f64 = 1609.344;

/// Node visited along a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub index: usize,
    pub id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Structured representation of a planned route that reporting consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub planner: String,
    pub cost_function: CostFunction,
    pub start: NodeId,
    pub goal: NodeId,
    pub hops: usize,
    pub total_distance_m: f64,
    pub total_distance_km: f64,
    pub total_time_s: f64,
    pub total_time_minutes: f64,
    pub nodes_explored: usize,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Convert a [`RoutePlan`] into a summary with resolved node coordinates.
    pub fn from_plan(graph: &Graph, plan: &RoutePlan) -> Result<Self> {
        if plan.path.is_empty() {
            return Err(Error::InconsistentState { node: plan.goal });
        }

        let steps = plan
            .path
            .iter()
            .enumerate()
            .map(|(index, &id)| {
                let node = graph.node(id);
                RouteStep {
                    index,
                    id,
                    latitude: node.map(|n| n.latitude),
                    longitude: node.map(|n| n.longitude),
                }
            })
            .collect();

        Ok(Self {
            planner: plan.planner.clone(),
            cost_function: plan.cost_function,
            start: plan.start,
            goal: plan.goal,
            hops: plan.hop_count(),
            total_distance_m: plan.total_distance,
            total_distance_km: plan.total_distance / 1000.0,
            total_time_s: plan.total_time,
            total_time_minutes: plan.total_time / 60.0,
            nodes_explored: plan.nodes_explored,
            steps,
        })
    }

    pub fn total_distance_miles(&self) -> f64 {
        self.total_distance_m / METERS_PER_MILE
    }

    /// Human-friendly multi-line rendering.
    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route {} -> {} ({} hops, planner: {}):",
            self.start, self.goal, self.hops, self.planner
        );
        for step in &self.steps {
            match (step.latitude, step.longitude) {
                (Some(lat), Some(lon)) => {
                    let _ = writeln!(
                        buffer,
                        "{:>4}: {} ({:.6}, {:.6})",
                        step.index, step.id, lat, lon
                    );
                }
                _ => {
                    let _ = writeln!(buffer, "{:>4}: {}", step.index, step.id);
                }
            }
        }
        let _ = writeln!(
            buffer,
            "Total distance: {:.2} km ({:.2} miles)",
            self.total_distance_km,
            self.total_distance_miles()
        );
        let _ = writeln!(buffer, "Total travel time: {:.1} minutes", self.total_time_minutes);
        buffer
    }
}

/// Write a route as CSV: metadata comment lines, then one row per node.
///
/// Nodes without known coordinates are omitted from the body.
pub fn write_route_csv<W: Write>(mut writer: W, summary: &RouteSummary) -> Result<()> {
    writeln!(writer, "# cost_function: {}", summary.cost_function)?;
    writeln!(writer, "# total_distance_km: {}", summary.total_distance_km)?;
    writeln!(writer, "# total_time_minutes: {}", summary.total_time_minutes)?;
    writeln!(writer, "# path_nodes: {}", summary.steps.len())?;

    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv_writer.write_record(["node_id", "latitude", "longitude"])?;
    for step in &summary.steps {
        if let (Some(lat), Some(lon)) = (step.latitude, step.longitude) {
            csv_writer.write_record([
                step.id.to_string(),
                format!("{lat:.6}"),
                format!("{lon:.6}"),
            ])?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// File name identifying a route by objective and query coordinates.
pub fn route_csv_file_name(
    cost_function: CostFunction,
    start: &Coordinates,
    end: &Coordinates,
) -> String {
    format!(
        "route_{}_{:.6}_{:.6}_to_{:.6}_{:.6}.csv",
        cost_function, start.latitude, start.longitude, end.latitude, end.longitude
    )
}
