use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use roadroute_cli::output::{
    render_request, render_route_report, save_route_csv, NetworkStats, OutputFormat,
    QueryReport, RouteReport,
};
use roadroute_cli::terminal::ColorPalette;
use roadroute_lib::{
    load_network, select_planner, Config, Coordinates, CostFunction, PlannerKind, RouteSummary,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plan distance- or time-optimal routes over a road network",
    allow_negative_numbers = true
)]
struct Cli {
    /// Configuration file naming the network data and planner settings.
    #[arg(long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Start latitude; defaults to the configured start.
    #[arg(long, requires = "start_lon")]
    start_lat: Option<f64>,
    /// Start longitude.
    #[arg(long, requires = "start_lat")]
    start_lon: Option<f64>,
    /// End latitude; defaults to the configured end.
    #[arg(long, requires = "end_lon")]
    end_lat: Option<f64>,
    /// End longitude.
    #[arg(long, requires = "end_lat")]
    end_lon: Option<f64>,

    /// Cost function to plan with (distance or time). Repeat to plan several;
    /// defaults to the configured list.
    #[arg(long = "cost-function")]
    cost_functions: Vec<CostFunction>,

    /// Planner algorithm (astar or dijkstra); defaults to the configured type.
    #[arg(long)]
    planner: Option<PlannerKind>,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Directory receiving one CSV file per planned route.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Disable ANSI colors in text output.
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let start = query_point(cli.start_lat, cli.start_lon, config.default_start(), "start")?;
    let end = query_point(cli.end_lat, cli.end_lon, config.default_end(), "end")?;

    let network = load_network(&config).context("failed to load road network")?;
    let stats = NetworkStats {
        nodes: network.nodes.len(),
        edges: network.edges.len(),
    };
    let graph = network.into_graph();

    if let Some(dir) = &cli.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    let palette = ColorPalette::detect(cli.no_color);
    if cli.format == OutputFormat::Text {
        print!("{}", render_request(&stats, &start, &end, &palette));
    }

    let cost_functions = if cli.cost_functions.is_empty() {
        config.cost_functions()
    } else {
        cli.cost_functions.clone()
    };
    let kind = cli.planner.unwrap_or_else(|| config.planner_kind());
    let mut planner = select_planner(kind, config.cost_model(CostFunction::Distance));

    let mut reports = Vec::with_capacity(cost_functions.len());
    for function in cost_functions {
        planner.set_cost_function(function, config.default_speed_mph());

        let started = Instant::now();
        let outcome = planner.plan(&graph, &start, &end);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let report = match outcome {
            Ok(plan) => {
                let summary = RouteSummary::from_plan(&graph, &plan)?;
                let csv_path = match &cli.output_dir {
                    Some(dir) if summary.steps.len() >= 2 => {
                        Some(save_route_csv(dir, &summary, &start, &end)?)
                    }
                    _ => None,
                };
                RouteReport::success(function, elapsed_ms, summary, csv_path)
            }
            Err(err) => {
                warn!(cost_function = %function, error = %err, "route planning failed");
                RouteReport::failure(function, elapsed_ms, &err)
            }
        };

        if cli.format == OutputFormat::Text {
            print!("{}", render_route_report(&report, stats.nodes, &palette));
        }
        reports.push(report);
    }

    let failed = reports.iter().filter(|report| !report.is_success()).count();
    let total = reports.len();

    if cli.format == OutputFormat::Json {
        let document = QueryReport {
            network: stats,
            start,
            end,
            straight_line_distance_m: start.distance_to(&end),
            routes: reports,
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    if failed > 0 {
        bail!("{failed} of {total} route(s) could not be planned");
    }
    Ok(())
}

/// Coordinates from the command line, or the configured default.
fn query_point(
    latitude: Option<f64>,
    longitude: Option<f64>,
    fallback: Option<Coordinates>,
    label: &str,
) -> Result<Coordinates> {
    let point = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude),
        (None, None) => match fallback {
            Some(point) => point,
            None => bail!("no {label} coordinates given and the configuration has no default"),
        },
        _ => bail!("both --{label}-lat and --{label}-lon are required"),
    };
    if !point.is_valid() {
        bail!("{label} coordinates {point} are out of range");
    }
    Ok(point)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
