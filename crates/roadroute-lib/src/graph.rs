use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::geo::Coordinates;

/// Identifier of an intersection in the road network.
pub type NodeId = i64;

/// Intersection in the road network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub latitude: f64,
    pub longitude: f64,
}

impl Node {
    pub fn new(id: NodeId, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            latitude,
            longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Road segment between two intersections.
///
/// One record describes one physical segment. Unless `oneway` is set it may be
/// traversed from `target` back to `source` as well.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    /// Length in meters.
    pub distance: f64,
    /// Posted speed limit as found in the source data (unit is sniffed, see
    /// [`crate::cost::CostModel::speed_mph`]).
    pub max_speed: Option<f64>,
    pub highway_type: Option<String>,
    pub name: Option<String>,
    pub oneway: bool,
    /// Effective speed in mph after traffic modifications were applied at load
    /// time. Takes precedence over every other speed source.
    pub traffic_speed_mph: Option<f64>,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, distance: f64) -> Self {
        Self {
            source,
            target,
            distance,
            max_speed: None,
            highway_type: None,
            name: None,
            oneway: false,
            traffic_speed_mph: None,
        }
    }

    pub fn with_max_speed(mut self, speed: f64) -> Self {
        self.max_speed = Some(speed);
        self
    }

    pub fn with_highway_type(mut self, highway: impl Into<String>) -> Self {
        self.highway_type = Some(highway.into());
        self
    }

    pub fn one_way(mut self) -> Self {
        self.oneway = true;
        self
    }

    /// The node reached when traversing this edge from `from`, or `None` if the
    /// edge cannot be entered from that side.
    pub fn opposite(&self, from: NodeId) -> Option<NodeId> {
        if from == self.source {
            Some(self.target)
        } else if from == self.target && !self.oneway {
            Some(self.source)
        } else {
            None
        }
    }

    /// Whether the edge can be traversed from `from` to `to`.
    pub fn connects(&self, from: NodeId, to: NodeId) -> bool {
        (self.source == from && self.target == to)
            || (!self.oneway && self.source == to && self.target == from)
    }
}

/// Road network graph shared read-only by planning calls.
///
/// Cloning is cheap: node, edge, and adjacency storage sit behind `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Arc<HashMap<NodeId, Node>>,
    edges: Arc<Vec<Edge>>,
    adjacency: Arc<HashMap<NodeId, Vec<usize>>>,
}

impl Graph {
    /// Build a graph from a node collection and an edge list.
    pub fn new(nodes: impl IntoIterator<Item = Node>, edges: Vec<Edge>) -> Self {
        let mut graph = Self::default();
        graph.initialize(nodes, edges);
        graph
    }

    /// Replace all stored data and rebuild the adjacency index.
    pub fn initialize(&mut self, nodes: impl IntoIterator<Item = Node>, edges: Vec<Edge>) {
        let mut by_id = HashMap::new();
        for node in nodes {
            if by_id.insert(node.id, node).is_some() {
                warn!(node = node.id, "duplicate node id, keeping the last occurrence");
            }
        }

        let adjacency = build_adjacency(&edges);
        debug!(
            nodes = by_id.len(),
            edges = edges.len(),
            indexed = adjacency.len(),
            "built road graph"
        );

        self.nodes = Arc::new(by_id);
        self.edges = Arc::new(edges);
        self.adjacency = Arc::new(adjacency);
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges that can be traversed out of `node`, honouring one-way flags.
    ///
    /// Unknown and isolated nodes yield nothing.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&index| &self.edges[index])
    }

    /// First edge (in input order) that can carry traffic from `from` to `to`.
    ///
    /// With parallel edges this is not necessarily the cheapest one; route
    /// reconstruction compares [`Graph::edges_between`] under the active cost
    /// function in that case.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.neighbours(from)
            .find(|edge| edge.source == from && edge.target == to)
            .or_else(|| {
                self.neighbours(from)
                    .find(|edge| !edge.oneway && edge.source == to && edge.target == from)
            })
    }

    /// Every edge (parallel ones included) that can carry traffic from `from` to `to`.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.neighbours(from)
            .filter(move |edge| edge.connects(from, to))
    }

    /// Great-circle distance in meters between two nodes, `None` if either is missing.
    pub fn straight_line_distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let a = self.node(from)?;
        let b = self.node(to)?;
        Some(a.coordinates().distance_to(&b.coordinates()))
    }
}

fn build_adjacency(edges: &[Edge]) -> HashMap<NodeId, Vec<usize>> {
    let mut adjacency: HashMap<NodeId, Vec<usize>> = HashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        adjacency.entry(edge.source).or_default().push(index);
        if !edge.oneway {
            adjacency.entry(edge.target).or_default().push(index);
        }
    }
    adjacency
}
