//! YAML configuration for data locations, planner defaults, and speed tables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cost::{CostFunction, CostModel, HighwaySpeeds, DEFAULT_SPEED_MPH};
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::routing::PlannerKind;
use crate::traffic::{TrafficRule, TrafficTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    pub nodes_file: PathBuf,
    pub edges_file: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default)]
    pub start: Option<Coordinates>,
    #[serde(default)]
    pub end: Option<Coordinates>,
}

/// Planner settings with names resolved to their typed values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannerSection {
    #[serde(rename = "type")]
    pub kind: PlannerKind,
    pub cost_functions: Vec<CostFunction>,
    pub default_speed_mph: f64,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            kind: PlannerKind::default(),
            cost_functions: vec![CostFunction::Distance],
            default_speed_mph: DEFAULT_SPEED_MPH,
        }
    }
}

/// Planner section as written. Names are kept as text so that unknown values
/// surface as [`Error::UnknownPlanner`] or [`Error::UnknownCostFunction`] and
/// accept the same spellings as the command line.
#[derive(Debug, Deserialize)]
struct RawPlannerSection {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    cost_functions: Option<CostFunctionNames>,
    #[serde(default = "default_speed")]
    default_speed_mph: f64,
}

/// Either a single cost function name or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CostFunctionNames {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<RawPlannerSection> for PlannerSection {
    type Error = Error;

    fn try_from(raw: RawPlannerSection) -> Result<Self> {
        let kind = match raw.kind {
            Some(name) => name.parse()?,
            None => PlannerKind::default(),
        };
        let cost_functions = match raw.cost_functions {
            None => vec![CostFunction::Distance],
            Some(CostFunctionNames::One(name)) => vec![name.parse()?],
            Some(CostFunctionNames::Many(names)) => names
                .iter()
                .map(|name| name.parse())
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(Self {
            kind,
            cost_functions,
            default_speed_mph: raw.default_speed_mph,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSection {
    #[serde(default)]
    pub exclude_highway_types: Vec<String>,
}

/// Parsed configuration file.
///
/// Relative data paths are resolved against the directory holding the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub data: DataSection,
    pub defaults: DefaultsSection,
    pub planner: PlannerSection,
    pub highway_speeds: HighwaySpeeds,
    pub filters: FilterSection,
    pub traffic: Vec<TrafficRule>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    data: DataSection,
    #[serde(default)]
    defaults: DefaultsSection,
    #[serde(default)]
    planner: Option<RawPlannerSection>,
    #[serde(default)]
    highway_speeds: HighwaySpeeds,
    #[serde(default)]
    filters: FilterSection,
    #[serde(default)]
    traffic: Vec<TrafficRule>,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_yaml_str(&text, base_dir)?;
        debug!(
            path = %path.display(),
            planner = %config.planner.kind,
            highway_types = config.highway_speeds.len(),
            traffic_rules = config.traffic.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration text, resolving relative data paths against `base_dir`.
    pub fn from_yaml_str(text: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(text)?;
        let planner = match raw.planner {
            Some(section) => PlannerSection::try_from(section)?,
            None => PlannerSection::default(),
        };
        let config = Config {
            data: DataSection {
                nodes_file: resolve(base_dir, &raw.data.nodes_file),
                edges_file: resolve(base_dir, &raw.data.edges_file),
            },
            defaults: raw.defaults,
            planner,
            highway_speeds: raw.highway_speeds,
            filters: raw.filters,
            traffic: raw.traffic,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let speed = self.planner.default_speed_mph;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(Error::InvalidConfig {
                message: format!("planner.default_speed_mph must be positive, got {speed}"),
            });
        }
        if self.planner.cost_functions.is_empty() {
            return Err(Error::InvalidConfig {
                message: "planner.cost_functions must name at least one cost function"
                    .to_string(),
            });
        }
        for (label, coordinate) in [("start", self.defaults.start), ("end", self.defaults.end)] {
            if let Some(coordinate) = coordinate {
                if !coordinate.is_valid() {
                    return Err(Error::InvalidConfig {
                        message: format!("defaults.{label} is not a valid coordinate"),
                    });
                }
            }
        }
        for rule in &self.traffic {
            rule.adjustment()?;
        }
        Ok(())
    }

    pub fn nodes_file(&self) -> &Path {
        &self.data.nodes_file
    }

    pub fn edges_file(&self) -> &Path {
        &self.data.edges_file
    }

    pub fn default_start(&self) -> Option<Coordinates> {
        self.defaults.start
    }

    pub fn default_end(&self) -> Option<Coordinates> {
        self.defaults.end
    }

    pub fn planner_kind(&self) -> PlannerKind {
        self.planner.kind
    }

    pub fn cost_functions(&self) -> Vec<CostFunction> {
        self.planner.cost_functions.clone()
    }

    pub fn default_speed_mph(&self) -> f64 {
        self.planner.default_speed_mph
    }

    pub fn excluded_highway_types(&self) -> &[String] {
        &self.filters.exclude_highway_types
    }

    pub fn traffic_table(&self) -> Result<TrafficTable> {
        TrafficTable::from_rules(&self.traffic)
    }

    /// Cost model for `function` using this configuration's speeds.
    pub fn cost_model(&self, function: CostFunction) -> CostModel {
        CostModel::new(function, self.planner.default_speed_mph)
            .with_highway_speeds(self.highway_speeds.clone())
    }
}

fn default_speed() -> f64 {
    DEFAULT_SPEED_MPH
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
data:
  nodes_file: nodes.json
  edges_file: /abs/edges.json
defaults:
  start: { lat: 1.0, lon: 2.0 }
  end: { lat: 3.0, lon: 4.0 }
planner:
  type: dijkstra
  cost_functions: [distance, time]
  default_speed_mph: 30
highway_speeds:
  primary: 45
filters:
  exclude_highway_types: [footway]
traffic:
  - { from: 1, to: 2, factor: 0.5 }
"#;

    #[test]
    fn parses_full_configuration() {
        let config = Config::from_yaml_str(FULL, Path::new("/data/config")).expect("valid");
        assert_eq!(config.nodes_file(), Path::new("/data/config/nodes.json"));
        assert_eq!(config.edges_file(), Path::new("/abs/edges.json"));
        assert_eq!(config.default_start(), Some(Coordinates::new(1.0, 2.0)));
        assert_eq!(config.planner_kind(), PlannerKind::Dijkstra);
        assert_eq!(
            config.cost_functions(),
            vec![CostFunction::Distance, CostFunction::Time]
        );
        assert_eq!(config.default_speed_mph(), 30.0);
        assert_eq!(config.highway_speeds.get("primary"), Some(45.0));
        assert_eq!(config.highway_speeds.get("service"), None);
        assert_eq!(config.excluded_highway_types(), ["footway".to_string()]);
        assert_eq!(config.traffic_table().expect("valid rules").len(), 1);
    }

    #[test]
    fn optional_sections_default() {
        let text = "data:\n  nodes_file: n.json\n  edges_file: e.json\n";
        let config = Config::from_yaml_str(text, Path::new(".")).expect("valid");
        assert_eq!(config.planner_kind(), PlannerKind::AStar);
        assert_eq!(config.cost_functions(), vec![CostFunction::Distance]);
        assert_eq!(config.default_speed_mph(), DEFAULT_SPEED_MPH);
        assert!(config.default_start().is_none());
        assert!(config.highway_speeds.is_empty());
    }

    #[test]
    fn single_cost_function_string_is_accepted() {
        let text = "data:\n  nodes_file: n.json\n  edges_file: e.json\nplanner:\n  cost_functions: time\n";
        let config = Config::from_yaml_str(text, Path::new(".")).expect("valid");
        assert_eq!(config.cost_functions(), vec![CostFunction::Time]);
    }

    #[test]
    fn names_accept_command_line_spellings() {
        let text = "data:\n  nodes_file: n.json\n  edges_file: e.json\nplanner:\n  type: A*\n  cost_functions: [Time, ' distance ']\n";
        let config = Config::from_yaml_str(text, Path::new(".")).expect("valid");
        assert_eq!(config.planner_kind(), PlannerKind::AStar);
        assert_eq!(
            config.cost_functions(),
            vec![CostFunction::Time, CostFunction::Distance]
        );
    }

    #[test]
    fn unknown_planner_is_reported_by_name() {
        let text = "data:\n  nodes_file: n.json\n  edges_file: e.json\nplanner:\n  type: bfs\n";
        let err = Config::from_yaml_str(text, Path::new(".")).expect_err("unknown planner");
        match err {
            Error::UnknownPlanner { name } => assert_eq!(name, "bfs"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_cost_function_is_reported_by_name() {
        for list in ["[fuel]", "fuel", "[distance, fuel]"] {
            let text = format!(
                "data:\n  nodes_file: n.json\n  edges_file: e.json\nplanner:\n  cost_functions: {list}\n"
            );
            let err = Config::from_yaml_str(&text, Path::new(".")).expect_err("unknown cost function");
            match err {
                Error::UnknownCostFunction { name } => assert_eq!(name, "fuel"),
                other => panic!("unexpected error for {list}: {other}"),
            }
        }
    }

    #[test]
    fn empty_cost_function_list_is_rejected() {
        let text = "data:\n  nodes_file: n.json\n  edges_file: e.json\nplanner:\n  cost_functions: []\n";
        let err = Config::from_yaml_str(text, Path::new(".")).expect_err("empty list");
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn missing_data_section_is_rejected() {
        let err = Config::from_yaml_str("planner:\n  type: astar\n", Path::new("."))
            .expect_err("data required");
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn non_positive_default_speed_is_rejected() {
        let text = "data:\n  nodes_file: n.json\n  edges_file: e.json\nplanner:\n  default_speed_mph: 0\n";
        let err = Config::from_yaml_str(text, Path::new(".")).expect_err("invalid speed");
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn cost_model_carries_speed_table() {
        let config = Config::from_yaml_str(FULL, Path::new("/")).expect("valid");
        let model = config.cost_model(CostFunction::Time);
        assert_eq!(model.function(), CostFunction::Time);
        assert_eq!(model.default_speed_mph(), 30.0);
        assert_eq!(model.highway_speeds().get("primary"), Some(45.0));
    }
}
