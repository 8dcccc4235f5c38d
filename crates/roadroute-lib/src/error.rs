use std::path::PathBuf;

use thiserror::Error;

use crate::geo::Coordinates;
use crate::graph::NodeId;

/// Convenient result alias for the route planner library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A query coordinate could not be snapped to any graph node.
    #[error("no graph node found near {coordinate}")]
    NodeNotFound { coordinate: Coordinates },

    /// The goal is unreachable from the start node.
    #[error("no path found from node {start} to node {goal}")]
    NoPathFound { start: NodeId, goal: NodeId },

    /// The parent chain recorded during search did not lead back to the start.
    #[error("search state is inconsistent: parent chain broke at node {node}")]
    InconsistentState { node: NodeId },

    /// Raised when the requested planner type is not known.
    #[error("unknown planner type: {name}")]
    UnknownPlanner { name: String },

    /// Raised when the requested cost function is not known.
    #[error("unknown cost function: {name}")]
    UnknownCostFunction { name: String },

    /// Configuration file was readable but semantically invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Road network data was readable but semantically invalid.
    #[error("invalid road network data: {message}")]
    InvalidNetwork { message: String },

    /// A data file referenced by the configuration does not exist.
    #[error("data file not found at {path}")]
    DataFileNotFound { path: PathBuf },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for YAML parsing errors.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapper for CSV writer errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
