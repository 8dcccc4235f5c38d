//! Snap arbitrary coordinates onto the closest graph node.
//!
//! The lookup is a linear scan over every registered node, O(N) per call. That
//! is adequate for single-shot offline queries; a grid or k-d tree would be
//! the upgrade for high query volumes.

use crate::geo::Coordinates;
use crate::graph::{Graph, NodeId};

/// Return the id of the node closest to `coordinate`, or `None` for an empty
/// graph or a coordinate outside the valid latitude/longitude ranges.
///
/// Equidistant candidates resolve to the smaller node id so results do not
/// depend on hash map iteration order.
pub fn nearest_node(graph: &Graph, coordinate: &Coordinates) -> Option<NodeId> {
    if !coordinate.is_valid() {
        return None;
    }

    graph
        .nodes()
        .map(|node| (node.coordinates().distance_to(coordinate), node.id))
        .min_by(|(da, ia), (db, ib)| da.total_cmp(db).then_with(|| ia.cmp(ib)))
        .map(|(_, id)| id)
}
