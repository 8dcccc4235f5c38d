//! Randomised checks of search optimality and heuristic admissibility.
//!
//! Edge lengths are never shorter than the great-circle distance between their
//! endpoints, and explicit speeds stay below the heuristic's assumed best
//! speed, so both heuristics are admissible on these networks.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roadroute_lib::{
    select_planner, CostFunction, CostModel, Edge, Error, Graph, Heuristic, Node, NodeId,
    PlannerKind,
};

const NODES: usize = 25;
const EDGES: usize = 45;

fn random_network(seed: u64) -> (Vec<Node>, Vec<Edge>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let nodes: Vec<Node> = (0..NODES)
        .map(|i| {
            Node::new(
                100 + i as NodeId,
                rng.random_range(0.0..0.05),
                rng.random_range(0.0..0.05),
            )
        })
        .collect();

    let mut edges = Vec::with_capacity(EDGES);
    while edges.len() < EDGES {
        let a = rng.random_range(0..NODES);
        let b = rng.random_range(0..NODES);
        if a == b {
            continue;
        }
        let straight = nodes[a].coordinates().distance_to(&nodes[b].coordinates());
        let mut edge = Edge::new(
            nodes[a].id,
            nodes[b].id,
            straight * rng.random_range(1.0..1.6),
        );
        if rng.random_bool(0.4) {
            edge = edge.with_max_speed(rng.random_range(10.0..70.0));
        }
        if rng.random_bool(0.2) {
            edge = edge.one_way();
        }
        edges.push(edge);
    }
    (nodes, edges)
}

/// Exhaustive O(V^2) label-setting search over the raw edge list.
fn reference_cost(
    nodes: &[Node],
    edges: &[Edge],
    model: &CostModel,
    from: NodeId,
    to: NodeId,
) -> Option<f64> {
    let index: HashMap<NodeId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id, i))
        .collect();
    let mut best = vec![f64::INFINITY; nodes.len()];
    let mut done = vec![false; nodes.len()];
    best[index[&from]] = 0.0;

    loop {
        let current = (0..nodes.len())
            .filter(|&i| !done[i] && best[i].is_finite())
            .min_by(|&a, &b| best[a].total_cmp(&best[b]))?;
        done[current] = true;
        if nodes[current].id == to {
            return Some(best[current]);
        }
        let id = nodes[current].id;
        for edge in edges {
            let next = if edge.source == id {
                edge.target
            } else if edge.target == id && !edge.oneway {
                edge.source
            } else {
                continue;
            };
            let candidate = best[current] + model.edge_cost(edge);
            let slot = index[&next];
            if candidate < best[slot] {
                best[slot] = candidate;
            }
        }
    }
}

fn objective_cost(function: CostFunction, distance: f64, time: f64) -> f64 {
    match function {
        CostFunction::Distance => distance,
        CostFunction::Time => time,
    }
}

#[test]
fn planners_find_optimal_routes() {
    let mut queries = StdRng::seed_from_u64(7);
    for seed in 0..20 {
        let (nodes, edges) = random_network(seed);
        let graph = Graph::new(nodes.iter().copied(), edges.clone());

        for _ in 0..5 {
            let start = nodes[queries.random_range(0..NODES)];
            let goal = nodes[queries.random_range(0..NODES)];

            for function in [CostFunction::Distance, CostFunction::Time] {
                let model = CostModel::new(function, 25.0);
                let expected = reference_cost(&nodes, &edges, &model, start.id, goal.id);

                for kind in [PlannerKind::AStar, PlannerKind::Dijkstra] {
                    let result = select_planner(kind, model.clone()).plan(
                        &graph,
                        &start.coordinates(),
                        &goal.coordinates(),
                    );
                    match (expected, result) {
                        (Some(cost), Ok(plan)) => {
                            let actual =
                                objective_cost(function, plan.total_distance, plan.total_time);
                            assert!(
                                (actual - cost).abs() <= 1e-6 * cost.max(1.0),
                                "seed {seed} {kind} {function}: {actual} vs optimal {cost}"
                            );
                            assert_eq!(plan.path.first(), Some(&start.id));
                            assert_eq!(plan.path.last(), Some(&goal.id));
                            for pair in plan.path.windows(2) {
                                assert!(
                                    graph.edge_between(pair[0], pair[1]).is_some(),
                                    "seed {seed}: no traversable edge {} -> {}",
                                    pair[0],
                                    pair[1]
                                );
                            }
                        }
                        (None, Err(Error::NoPathFound { .. })) => {}
                        (expected, result) => panic!(
                            "seed {seed} {kind} {function}: expected {expected:?}, got {result:?}"
                        ),
                    }
                }
            }
        }
    }
}

#[test]
fn heuristics_never_overestimate() {
    for seed in 100..110 {
        let (nodes, edges) = random_network(seed);
        let graph = Graph::new(nodes.iter().copied(), edges.clone());
        let goal = nodes[0].id;

        for function in [CostFunction::Distance, CostFunction::Time] {
            let model = CostModel::new(function, 25.0);
            let heuristic = Heuristic::for_cost_model(&model);
            for node in &nodes {
                if let Some(cost) = reference_cost(&nodes, &edges, &model, node.id, goal) {
                    let estimate = heuristic.estimate(&graph, node.id, goal);
                    assert!(
                        estimate <= cost + 1e-9,
                        "seed {seed} {function}: h({}) = {estimate} exceeds {cost}",
                        node.id
                    );
                }
            }
        }
    }
}

#[test]
fn a_star_settles_no_more_nodes_than_dijkstra() {
    let (nodes, edges) = random_network(42);
    let graph = Graph::new(nodes.iter().copied(), edges.clone());
    let model = CostModel::distance();

    for goal in nodes.iter().skip(1) {
        let a_star = select_planner(PlannerKind::AStar, model.clone()).plan(
            &graph,
            &nodes[0].coordinates(),
            &goal.coordinates(),
        );
        let dijkstra = select_planner(PlannerKind::Dijkstra, model.clone()).plan(
            &graph,
            &nodes[0].coordinates(),
            &goal.coordinates(),
        );
        if let (Ok(a_star), Ok(dijkstra)) = (a_star, dijkstra) {
            assert!(a_star.nodes_explored <= dijkstra.nodes_explored + 1);
        }
    }
}
