//! Output formatting for route planning reports.
//!
//! Text output is written for people at a terminal; JSON output is a single
//! document per invocation so it can be piped into other tools.

use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use roadroute_lib::{route_csv_file_name, write_route_csv, Coordinates, CostFunction, RouteSummary};

use crate::terminal::ColorPalette;

const SEPARATOR_WIDTH: usize = 50;

/// Output format for the report printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// One JSON document covering every cost function.
    Json,
}

/// Size of the loaded network after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    pub nodes: usize,
    pub edges: usize,
}

/// Outcome of planning under one cost function.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    pub cost_function: CostFunction,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<PathBuf>,
}

impl RouteReport {
    pub fn success(
        cost_function: CostFunction,
        elapsed_ms: f64,
        route: RouteSummary,
        csv_path: Option<PathBuf>,
    ) -> Self {
        Self {
            cost_function,
            elapsed_ms,
            route: Some(route),
            error: None,
            csv_path,
        }
    }

    pub fn failure(cost_function: CostFunction, elapsed_ms: f64, error: impl ToString) -> Self {
        Self {
            cost_function,
            elapsed_ms,
            route: None,
            error: Some(error.to_string()),
            csv_path: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.route.is_some()
    }
}

/// Complete JSON document for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub network: NetworkStats,
    pub start: Coordinates,
    pub end: Coordinates,
    pub straight_line_distance_m: f64,
    pub routes: Vec<RouteReport>,
}

/// Network statistics and the query being answered.
pub fn render_request(
    stats: &NetworkStats,
    start: &Coordinates,
    end: &Coordinates,
    palette: &ColorPalette,
) -> String {
    let p = palette;
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "{}Loaded road network:{} {} nodes, {} edges",
        p.white_bold, p.reset, stats.nodes, stats.edges
    );
    let _ = writeln!(buffer);
    let _ = writeln!(buffer, "{}Route request:{}", p.white_bold, p.reset);
    let _ = writeln!(buffer, "Start: {start}");
    let _ = writeln!(buffer, "End  : {end}");
    let _ = writeln!(
        buffer,
        "Straight-line distance: {}{:.2} km{}",
        p.cyan,
        start.distance_to(end) / 1000.0,
        p.reset
    );
    buffer
}

/// Report for a single cost function.
pub fn render_route_report(
    report: &RouteReport,
    node_count: usize,
    palette: &ColorPalette,
) -> String {
    let p = palette;
    let rule = "=".repeat(SEPARATOR_WIDTH);
    let mut buffer = String::new();
    let _ = writeln!(buffer);
    let _ = writeln!(buffer, "{}{rule}{}", p.gray, p.reset);
    let _ = writeln!(
        buffer,
        "{}Planning with cost function: {}{}",
        p.white_bold, report.cost_function, p.reset
    );
    let _ = writeln!(buffer, "{}{rule}{}", p.gray, p.reset);

    match (&report.route, &report.error) {
        (Some(route), _) => {
            let _ = writeln!(buffer, "Planner: {}", route.planner);
            let _ = writeln!(
                buffer,
                "{}Path found in {:.2} ms{}",
                p.green, report.elapsed_ms, p.reset
            );
            let _ = writeln!(
                buffer,
                "Nodes explored: {} / {}",
                route.nodes_explored, node_count
            );
            if report.elapsed_ms > 0.0 {
                let _ = writeln!(
                    buffer,
                    "Search speed: {:.2} nodes/ms",
                    route.nodes_explored as f64 / report.elapsed_ms
                );
            }
            let _ = writeln!(buffer, "Path length: {} nodes", route.steps.len());
            buffer.push_str(&route.render_plain());
            if let Some(path) = &report.csv_path {
                let _ = writeln!(buffer, "Route saved to: {}", path.display());
            }
        }
        (None, error) => {
            let _ = writeln!(
                buffer,
                "{}No route found: {}{}",
                p.red,
                error.as_deref().unwrap_or("unknown error"),
                p.reset
            );
        }
    }
    buffer
}

/// Write `summary` as CSV into `dir`, returning the file path.
pub fn save_route_csv(
    dir: &Path,
    summary: &RouteSummary,
    start: &Coordinates,
    end: &Coordinates,
) -> Result<PathBuf> {
    let path = dir.join(route_csv_file_name(summary.cost_function, start, end));
    let file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_route_csv(BufWriter::new(file), summary)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
