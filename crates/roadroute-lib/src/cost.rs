//! Edge cost model for the two supported optimisation objectives.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::Edge;

/// Meters per second in one mile per hour.
pub const MPH_TO_MPS: f64 = 0.44704;
/// Miles per hour in one kilometer per hour.
pub const KMH_TO_MPH: f64 = 0.621371;
/// Explicit speeds above this value are read as km/h, at or below as mph.
pub const KMH_SNIFF_THRESHOLD: f64 = 80.0;
/// Floor applied to every resolved speed so travel time stays finite.
pub const MIN_SPEED_MPH: f64 = 1.0;
/// Fallback speed when configuration does not provide one.
pub const DEFAULT_SPEED_MPH: f64 = 25.0;

/// Scalar quantity minimised by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum CostFunction {
    /// Cumulative distance in meters.
    #[default]
    Distance,
    /// Cumulative travel time in seconds.
    Time,
}

impl CostFunction {
    pub fn label(self) -> &'static str {
        match self {
            CostFunction::Distance => "distance",
            CostFunction::Time => "time",
        }
    }
}

impl fmt::Display for CostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CostFunction {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(CostFunction::Distance),
            "time" => Ok(CostFunction::Time),
            _ => Err(Error::UnknownCostFunction {
                name: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for CostFunction {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Highway classification to speed (mph) lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighwaySpeeds(HashMap<String, f64>);

impl HighwaySpeeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, highway: impl Into<String>, speed_mph: f64) {
        self.0.insert(highway.into(), speed_mph);
    }

    /// Speed for `highway`, ignoring entries that are not strictly positive.
    pub fn get(&self, highway: &str) -> Option<f64> {
        self.0
            .get(highway)
            .copied()
            .filter(|speed| speed.is_finite() && *speed > 0.0)
    }

    /// Fastest usable speed in the table.
    pub fn fastest(&self) -> Option<f64> {
        self.0
            .values()
            .copied()
            .filter(|speed| speed.is_finite() && *speed > 0.0)
            .reduce(f64::max)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for HighwaySpeeds {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Converts an edge into a traversal cost under the selected objective.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    function: CostFunction,
    default_speed_mph: f64,
    highway_speeds: HighwaySpeeds,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(CostFunction::Distance, DEFAULT_SPEED_MPH)
    }
}

impl CostModel {
    pub fn new(function: CostFunction, default_speed_mph: f64) -> Self {
        Self {
            function,
            default_speed_mph: clamp_speed(default_speed_mph),
            highway_speeds: HighwaySpeeds::default(),
        }
    }

    pub fn distance() -> Self {
        Self::new(CostFunction::Distance, DEFAULT_SPEED_MPH)
    }

    pub fn time(default_speed_mph: f64) -> Self {
        Self::new(CostFunction::Time, default_speed_mph)
    }

    pub fn with_highway_speeds(mut self, highway_speeds: HighwaySpeeds) -> Self {
        self.highway_speeds = highway_speeds;
        self
    }

    pub fn function(&self) -> CostFunction {
        self.function
    }

    pub fn default_speed_mph(&self) -> f64 {
        self.default_speed_mph
    }

    pub fn highway_speeds(&self) -> &HighwaySpeeds {
        &self.highway_speeds
    }

    /// Effective speed of `edge` in mph.
    ///
    /// Resolution order: the traffic-adjusted speed baked in at load time, the
    /// edge's explicit speed limit (values above [`KMH_SNIFF_THRESHOLD`] are
    /// taken as km/h), the highway classification table, then the default.
    /// The result never drops below [`MIN_SPEED_MPH`].
    pub fn speed_mph(&self, edge: &Edge) -> f64 {
        if let Some(speed) = edge.traffic_speed_mph.filter(|s| s.is_finite()) {
            return clamp_speed(speed);
        }
        clamp_speed(self.base_speed_mph(edge))
    }

    /// Speed of `edge` ignoring any traffic adjustment.
    pub fn base_speed_mph(&self, edge: &Edge) -> f64 {
        if let Some(speed) = edge
            .max_speed
            .filter(|speed| speed.is_finite() && *speed > 0.0)
        {
            return if speed > KMH_SNIFF_THRESHOLD {
                speed * KMH_TO_MPH
            } else {
                speed
            };
        }

        edge.highway_type
            .as_deref()
            .and_then(|highway| self.highway_speeds.get(highway))
            .unwrap_or(self.default_speed_mph)
    }

    /// Seconds needed to traverse `edge` at its effective speed.
    pub fn travel_time_seconds(&self, edge: &Edge) -> f64 {
        edge.distance / (self.speed_mph(edge) * MPH_TO_MPS)
    }

    /// Traversal cost of `edge` in the objective's unit (meters or seconds).
    pub fn edge_cost(&self, edge: &Edge) -> f64 {
        match self.function {
            CostFunction::Distance => edge.distance,
            CostFunction::Time => self.travel_time_seconds(edge),
        }
    }

    pub fn label(&self) -> &'static str {
        self.function.label()
    }
}

/// Clamp a speed to the positive floor.
pub fn clamp_speed(speed_mph: f64) -> f64 {
    if speed_mph.is_nan() {
        return MIN_SPEED_MPH;
    }
    speed_mph.max(MIN_SPEED_MPH)
}
