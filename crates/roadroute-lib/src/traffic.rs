//! Load-time traffic adjustments.
//!
//! Modifications are folded into each edge's `traffic_speed_mph` once, before
//! the graph is built. The cost model and search never see the table itself.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cost::{clamp_speed, CostModel, MIN_SPEED_MPH};
use crate::error::{Error, Result};
use crate::graph::{Edge, NodeId};

/// How a modification changes an edge's speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficAdjustment {
    /// Replace the speed with an absolute value in mph.
    Override(f64),
    /// Scale the edge's resolved speed.
    Multiplier(f64),
}

impl TrafficAdjustment {
    fn apply(self, base_speed_mph: f64) -> f64 {
        match self {
            TrafficAdjustment::Override(speed) => speed,
            TrafficAdjustment::Multiplier(factor) => base_speed_mph * factor,
        }
    }
}

/// One configured modification as written in the YAML `traffic` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRule {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
}

impl TrafficRule {
    /// Exactly one of `speed_mph` and `factor` must be set.
    pub fn adjustment(&self) -> Result<TrafficAdjustment> {
        match (self.speed_mph, self.factor) {
            (Some(speed), None) => Ok(TrafficAdjustment::Override(speed)),
            (None, Some(factor)) => Ok(TrafficAdjustment::Multiplier(factor)),
            (Some(_), Some(_)) => Err(Error::InvalidConfig {
                message: format!(
                    "traffic rule {} -> {} sets both speed_mph and factor",
                    self.from, self.to
                ),
            }),
            (None, None) => Err(Error::InvalidConfig {
                message: format!(
                    "traffic rule {} -> {} needs speed_mph or factor",
                    self.from, self.to
                ),
            }),
        }
    }
}

/// Modifications keyed by ordered `(from, to)` node pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficTable {
    entries: HashMap<(NodeId, NodeId), TrafficAdjustment>,
}

impl TrafficTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from configured rules. Later rules replace earlier ones
    /// for the same pair.
    pub fn from_rules(rules: &[TrafficRule]) -> Result<Self> {
        let mut table = Self::new();
        for rule in rules {
            table.insert(rule.from, rule.to, rule.adjustment()?);
        }
        Ok(table)
    }

    pub fn insert(&mut self, from: NodeId, to: NodeId, adjustment: TrafficAdjustment) {
        self.entries.insert((from, to), adjustment);
    }

    pub fn get(&self, from: NodeId, to: NodeId) -> Option<TrafficAdjustment> {
        self.entries.get(&(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of folding a [`TrafficTable`] into an edge list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficReport {
    /// Number of edges whose speed was modified.
    pub applied: usize,
    /// Keys that matched no edge, sorted.
    pub unmatched: Vec<(NodeId, NodeId)>,
}

/// Bake `table` into the edges' effective speeds.
///
/// An edge takes the modification keyed `(source, target)`; a two-way edge
/// also takes one keyed `(target, source)` when no forward key exists.
/// Multipliers scale the speed `cost_model` would resolve for the edge, and
/// every result is clamped to [`MIN_SPEED_MPH`].
pub fn apply_traffic(
    edges: &mut [Edge],
    table: &TrafficTable,
    cost_model: &CostModel,
) -> TrafficReport {
    if table.is_empty() {
        return TrafficReport::default();
    }

    let mut used: HashSet<(NodeId, NodeId)> = HashSet::new();
    let mut applied = 0usize;

    for edge in edges.iter_mut() {
        let forward = (edge.source, edge.target);
        let reverse = (edge.target, edge.source);
        let matched = table
            .get(forward.0, forward.1)
            .map(|adjustment| (forward, adjustment))
            .or_else(|| {
                (!edge.oneway)
                    .then(|| table.get(reverse.0, reverse.1))
                    .flatten()
                    .map(|adjustment| (reverse, adjustment))
            });

        let Some((key, adjustment)) = matched else {
            continue;
        };

        let base = cost_model.base_speed_mph(edge);
        let adjusted = adjustment.apply(base);
        if adjusted.is_nan() || adjusted < MIN_SPEED_MPH {
            warn!(
                source = edge.source,
                target = edge.target,
                speed = adjusted,
                floor = MIN_SPEED_MPH,
                "traffic-adjusted speed clamped to floor"
            );
        }
        edge.traffic_speed_mph = Some(clamp_speed(adjusted));
        used.insert(key);
        applied += 1;
    }

    let mut unmatched: Vec<(NodeId, NodeId)> = table
        .entries
        .keys()
        .filter(|key| !used.contains(key))
        .copied()
        .collect();
    unmatched.sort_unstable();

    for (from, to) in &unmatched {
        warn!(from, to, "traffic modification matches no edge");
    }
    debug!(applied, unmatched = unmatched.len(), "applied traffic modifications");

    TrafficReport { applied, unmatched }
}
