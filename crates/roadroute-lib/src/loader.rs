//! Road network loading from the JSON node and edge tables.
//!
//! The node table is an object keyed by stringified node id with `lat`/`lon`
//! members. The edge table is an array of OSM-derived records
//! (`u`, `v`, `distance`, and optional `maxspeed`, `highway`, `name`,
//! `oneway`). OSM exports are loose about types, so `maxspeed`, `highway`, and
//! `name` may be strings, numbers, or lists, and `oneway` may be a boolean or
//! a string.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::cost::{CostFunction, CostModel};
use crate::error::{Error, Result};
use crate::graph::{Edge, Graph, Node, NodeId};
use crate::traffic::{apply_traffic, TrafficReport, TrafficTable};

#[derive(Debug, Deserialize)]
struct RawNode {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    u: NodeId,
    v: NodeId,
    distance: f64,
    #[serde(default)]
    maxspeed: Option<RawValue>,
    #[serde(default)]
    highway: Option<RawValue>,
    #[serde(default)]
    name: Option<RawValue>,
    #[serde(default)]
    oneway: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
}

impl RawValue {
    /// First textual value, descending into lists.
    fn text(&self) -> Option<String> {
        match self {
            RawValue::Text(text) => Some(text.clone()),
            RawValue::Number(number) => Some(number.to_string()),
            RawValue::Bool(_) => None,
            RawValue::List(items) => items.iter().find_map(RawValue::text),
        }
    }

    fn speed(&self) -> Option<f64> {
        match self {
            RawValue::Number(number) => Some(*number),
            RawValue::Text(text) => parse_leading_number(text),
            RawValue::Bool(_) => None,
            RawValue::List(items) => items.iter().find_map(RawValue::speed),
        }
    }

    fn flag(&self) -> bool {
        match self {
            RawValue::Bool(flag) => *flag,
            RawValue::Number(number) => *number != 0.0,
            RawValue::Text(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "yes" | "true" | "1"
            ),
            RawValue::List(items) => items.first().is_some_and(RawValue::flag),
        }
    }
}

/// Parse the numeric prefix of strings such as `"50 mph"` or `"30;40"`.
fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Parse the node table. Nodes are returned sorted by id.
pub fn parse_nodes<R: Read>(reader: R) -> Result<Vec<Node>> {
    let raw: BTreeMap<String, RawNode> = serde_json::from_reader(reader)?;
    let mut nodes = Vec::with_capacity(raw.len());
    for (key, value) in raw {
        let id: NodeId = key.trim().parse().map_err(|_| Error::InvalidNetwork {
            message: format!("node key {key:?} is not an integer id"),
        })?;
        nodes.push(Node::new(id, value.lat, value.lon));
    }
    nodes.sort_by_key(|node| node.id);
    Ok(nodes)
}

/// Parse the edge table, preserving input order.
pub fn parse_edges<R: Read>(reader: R) -> Result<Vec<Edge>> {
    let raw: Vec<RawEdge> = serde_json::from_reader(reader)?;
    let mut edges = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        if !record.distance.is_finite() || record.distance < 0.0 {
            return Err(Error::InvalidNetwork {
                message: format!(
                    "edge #{index} ({} -> {}) has invalid distance {}",
                    record.u, record.v, record.distance
                ),
            });
        }

        let mut edge = Edge::new(record.u, record.v, record.distance);
        if let Some(value) = &record.maxspeed {
            edge.max_speed = value.speed();
            if edge.max_speed.is_none() {
                warn!(
                    source = record.u,
                    target = record.v,
                    raw = ?value,
                    "ignoring unparseable maxspeed"
                );
            }
        }
        edge.highway_type = record.highway.as_ref().and_then(RawValue::text);
        edge.name = record.name.as_ref().and_then(RawValue::text);
        edge.oneway = record.oneway.as_ref().is_some_and(RawValue::flag);
        edges.push(edge);
    }
    Ok(edges)
}

/// Nodes and edges as loaded, before the graph is built.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl RoadNetwork {
    /// Load the node and edge tables from disk.
    pub fn from_paths(nodes_file: &Path, edges_file: &Path) -> Result<Self> {
        let nodes = parse_nodes(BufReader::new(open(nodes_file)?))?;
        let edges = parse_edges(BufReader::new(open(edges_file)?))?;
        Ok(Self { nodes, edges })
    }

    /// Drop edges whose highway type is listed. Returns the number removed.
    pub fn exclude_highway_types(&mut self, excluded: &[String]) -> usize {
        if excluded.is_empty() {
            return 0;
        }
        let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
        let before = self.edges.len();
        self.edges.retain(|edge| {
            edge.highway_type
                .as_deref()
                .map_or(true, |highway| !excluded.contains(highway))
        });
        before - self.edges.len()
    }

    /// Fold traffic modifications into edge speeds.
    pub fn apply_traffic(&mut self, table: &TrafficTable, cost_model: &CostModel) -> TrafficReport {
        apply_traffic(&mut self.edges, table, cost_model)
    }

    pub fn into_graph(self) -> Graph {
        Graph::new(self.nodes, self.edges)
    }
}

/// Load the network named by `config`, apply its edge filters and traffic
/// modifications.
pub fn load_network(config: &Config) -> Result<RoadNetwork> {
    let mut network = RoadNetwork::from_paths(config.nodes_file(), config.edges_file())?;
    let excluded = network.exclude_highway_types(config.excluded_highway_types());

    let table = config.traffic_table()?;
    // Base speeds do not depend on the objective.
    let report = network.apply_traffic(&table, &config.cost_model(CostFunction::Time));

    info!(
        nodes = network.nodes.len(),
        edges = network.edges.len(),
        excluded,
        traffic_applied = report.applied,
        traffic_unmatched = report.unmatched.len(),
        "loaded road network"
    );
    Ok(network)
}

fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(Error::DataFileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(File::open(path)?)
}
