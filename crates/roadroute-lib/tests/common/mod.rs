#![allow(dead_code)]

use std::path::PathBuf;

use roadroute_lib::{Config, Edge, Graph, Node};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/small_network")
}

pub fn fixture_config() -> Config {
    Config::load(&fixtures_dir().join("config.yaml")).expect("fixture config loads")
}

/// Three collinear nodes on the equator joined by 1 km two-way edges.
pub fn line_graph() -> Graph {
    Graph::new(
        [
            Node::new(1, 0.0, 0.0),
            Node::new(2, 0.0, 0.01),
            Node::new(3, 0.0, 0.02),
        ],
        vec![Edge::new(1, 2, 1000.0), Edge::new(2, 3, 1000.0)],
    )
}

/// Two components: 1-2 and 3-4.
pub fn split_graph() -> Graph {
    Graph::new(
        [
            Node::new(1, 0.0, 0.0),
            Node::new(2, 0.0, 0.01),
            Node::new(3, 1.0, 1.0),
            Node::new(4, 1.0, 1.01),
        ],
        vec![Edge::new(1, 2, 1200.0), Edge::new(3, 4, 1200.0)],
    )
}
