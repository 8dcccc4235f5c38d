mod common;

use std::fs;

use roadroute_lib::{
    load_network, select_planner, Config, Coordinates, CostFunction, Error, PlannerKind,
    RouteSummary,
};
use tempfile::tempdir;

use common::{fixture_config, fixtures_dir};

#[test]
fn fixture_network_loads_with_filters() {
    let config = fixture_config();
    assert_eq!(config.planner_kind(), PlannerKind::AStar);
    assert_eq!(
        config.cost_functions(),
        vec![CostFunction::Distance, CostFunction::Time]
    );

    let network = load_network(&config).expect("fixture network loads");
    assert_eq!(network.nodes.len(), 7);
    // The footway edge is filtered out.
    assert_eq!(network.edges.len(), 6);
    assert!(network
        .edges
        .iter()
        .all(|edge| edge.highway_type.as_deref() != Some("footway")));

    let graph = network.into_graph();
    assert_eq!(graph.node_count(), 7);
    assert_eq!(graph.edge_count(), 6);
}

#[test]
fn objectives_choose_different_fixture_routes() {
    let config = fixture_config();
    let graph = load_network(&config).expect("fixture loads").into_graph();
    let start = config.default_start().expect("fixture start");
    let end = config.default_end().expect("fixture end");

    let distance = select_planner(
        config.planner_kind(),
        config.cost_model(CostFunction::Distance),
    )
    .plan(&graph, &start, &end)
    .expect("route exists");
    assert_eq!(distance.path, vec![1, 2, 3, 6]);
    assert!((distance.total_distance - 3550.0).abs() < 1e-9);

    let time = select_planner(config.planner_kind(), config.cost_model(CostFunction::Time))
        .plan(&graph, &start, &end)
        .expect("route exists");
    assert_eq!(time.path, vec![1, 4, 5, 6]);
    assert!((time.total_distance - 3700.0).abs() < 1e-9);
    assert!(time.total_time < distance.total_time);
    // 1300 m at 15 mph plus 2400 m at 45 mph.
    let expected = 1300.0 / (15.0 * 0.44704) + 2400.0 / (45.0 * 0.44704);
    assert!((time.total_time - expected).abs() < 1e-6);
}

#[test]
fn fixture_one_way_forces_a_detour() {
    let config = fixture_config();
    let graph = load_network(&config).expect("fixture loads").into_graph();
    let plan = select_planner(PlannerKind::AStar, config.cost_model(CostFunction::Distance))
        .plan(
            &graph,
            &Coordinates::new(0.010, 0.020),
            &Coordinates::new(0.0, 0.0),
        )
        .expect("route exists");

    assert_eq!(plan.path, vec![6, 5, 4, 1]);
}

#[test]
fn isolated_fixture_node_is_unreachable() {
    let config = fixture_config();
    let graph = load_network(&config).expect("fixture loads").into_graph();
    let err = select_planner(PlannerKind::AStar, config.cost_model(CostFunction::Distance))
        .plan(
            &graph,
            &Coordinates::new(0.0, 0.0),
            &Coordinates::new(0.5, 0.5),
        )
        .expect_err("node 7 has no edges");

    assert!(matches!(err, Error::NoPathFound { start: 1, goal: 7 }));
}

#[test]
fn configured_traffic_reroutes_time_queries() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.yaml");
    let fixtures = fixtures_dir();
    fs::write(
        &config_path,
        format!(
            "data:\n  nodes_file: {}\n  edges_file: {}\n\
             highway_speeds:\n  primary: 45\n  residential: 25\n  service: 15\n\
             filters:\n  exclude_highway_types: [footway]\n\
             traffic:\n  - {{ from: 4, to: 5, speed_mph: 5 }}\n  - {{ from: 40, to: 50, factor: 0.5 }}\n",
            fixtures.join("nodes.json").display(),
            fixtures.join("edges.json").display(),
        ),
    )
    .expect("write config");

    let config = Config::load(&config_path).expect("config loads");
    let network = load_network(&config).expect("network loads");
    let slowed = network
        .edges
        .iter()
        .find(|edge| edge.source == 4 && edge.target == 5)
        .expect("edge 4-5 present");
    assert_eq!(slowed.traffic_speed_mph, Some(5.0));

    let graph = network.into_graph();
    let plan = select_planner(PlannerKind::AStar, config.cost_model(CostFunction::Time))
        .plan(
            &graph,
            &Coordinates::new(0.0, 0.0),
            &Coordinates::new(0.010, 0.020),
        )
        .expect("route exists");
    assert_eq!(plan.path, vec![1, 2, 3, 6]);
}

#[test]
fn missing_data_file_is_reported() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        "data:\n  nodes_file: missing_nodes.json\n  edges_file: missing_edges.json\n",
    )
    .expect("write config");

    let config = Config::load(&config_path).expect("config parses");
    let err = load_network(&config).expect_err("nodes file missing");
    match err {
        Error::DataFileNotFound { path } => {
            assert_eq!(path, dir.path().join("missing_nodes.json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn summary_reports_fixture_coordinates() {
    let config = fixture_config();
    let graph = load_network(&config).expect("fixture loads").into_graph();
    let plan = select_planner(PlannerKind::AStar, config.cost_model(CostFunction::Distance))
        .plan(
            &graph,
            &config.default_start().expect("start"),
            &config.default_end().expect("end"),
        )
        .expect("route exists");

    let summary = RouteSummary::from_plan(&graph, &plan).expect("summary");
    assert_eq!(summary.hops, 3);
    assert_eq!(summary.steps.len(), 4);
    assert_eq!(summary.steps[3].latitude, Some(0.010));
    assert_eq!(summary.steps[3].longitude, Some(0.020));
    assert!((summary.total_distance_km - 3.55).abs() < 1e-9);
}
