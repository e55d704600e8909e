//! Edge boundary policy.
//!
//! Decides which grid edges are open base level and which are closed
//! walls. Applied once, after the raster is loaded.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::raster::RasterGrid;
use super::status::NodeStatus;
use crate::types::{Side, SideBoundaries};

/// Status assigned to each grid edge.
///
/// North and south edges are applied first, then east and west, so the
/// corner nodes end up with the east/west status.
///
/// # Example
///
/// ```
/// use lem_rs::grid::{BoundaryPolicy, NodeStatus, RasterGrid};
/// use lem_rs::types::GridShape;
///
/// let mut grid = RasterGrid::new(GridShape::new(5, 6), 3.0);
/// BoundaryPolicy::single_ridge().apply(&mut grid);
///
/// assert_eq!(grid.status(grid.node_at(0, 3)), NodeStatus::FixedValue);
/// assert_eq!(grid.status(grid.node_at(2, 0)), NodeStatus::Closed);
/// assert_eq!(grid.status(grid.node_at(0, 0)), NodeStatus::Closed);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryPolicy {
    edges: SideBoundaries<NodeStatus>,
}

impl BoundaryPolicy {
    /// Create a policy from explicit per-edge statuses.
    pub fn new(edges: SideBoundaries<NodeStatus>) -> Self {
        Self { edges }
    }

    /// Every edge is fixed-value base level.
    pub fn all_fixed() -> Self {
        Self::new(SideBoundaries::uniform(NodeStatus::FixedValue))
    }

    /// North and south edges open (fixed-value), east and west closed.
    ///
    /// Drainage leaves a ridge running east-west across the grid through
    /// its northern and southern flanks only.
    pub fn single_ridge() -> Self {
        Self::new(SideBoundaries::new(
            NodeStatus::FixedValue,
            NodeStatus::Closed,
            NodeStatus::FixedValue,
            NodeStatus::Closed,
        ))
    }

    /// Status for one edge.
    pub fn status_for(&self, side: Side) -> NodeStatus {
        *self.edges.get(side)
    }

    /// Per-edge statuses.
    pub fn edges(&self) -> &SideBoundaries<NodeStatus> {
        &self.edges
    }

    /// Assign the edge statuses to a grid.
    ///
    /// Only perimeter nodes are touched. Marking an edge `Core` is ignored
    /// since perimeter nodes have no cell.
    pub fn apply(&self, grid: &mut RasterGrid) {
        debug!(edges = %self.edges, "applying boundary policy");
        for side in [Side::North, Side::South, Side::East, Side::West] {
            let status = self.status_for(side);
            if status.is_core() {
                warn!(%side, "ignoring core status requested for a grid edge");
                continue;
            }
            grid.set_status_at_edge(side, status);
        }

        let has_outlet = grid
            .status_at_node()
            .iter()
            .any(|s| *s == NodeStatus::FixedValue);
        if !has_outlet {
            warn!("boundary policy leaves no fixed-value nodes; material cannot leave the grid");
        }
    }
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self::single_ridge()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridShape;

    #[test]
    fn test_single_ridge_layout() {
        let mut grid = RasterGrid::new(GridShape::new(4, 5), 1.0);
        BoundaryPolicy::single_ridge().apply(&mut grid);

        for node in grid.nodes_at_edge(Side::West) {
            assert_eq!(grid.status(node), NodeStatus::Closed);
        }
        for node in grid.nodes_at_edge(Side::East) {
            assert_eq!(grid.status(node), NodeStatus::Closed);
        }
        // south/north edges minus corners stay fixed-value
        for col in 1..4 {
            assert_eq!(grid.status(grid.node_at(0, col)), NodeStatus::FixedValue);
            assert_eq!(grid.status(grid.node_at(3, col)), NodeStatus::FixedValue);
        }
        assert_eq!(grid.n_core_nodes(), 2 * 3);
    }

    #[test]
    fn test_core_edge_request_is_ignored() {
        let mut grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        let policy = BoundaryPolicy::new(SideBoundaries::new(
            NodeStatus::Core,
            NodeStatus::FixedValue,
            NodeStatus::FixedValue,
            NodeStatus::FixedValue,
        ));
        policy.apply(&mut grid);
        assert_eq!(grid.status(1), NodeStatus::FixedValue);
        assert_eq!(grid.n_core_nodes(), 1);
    }

    #[test]
    fn test_default_is_single_ridge() {
        assert_eq!(BoundaryPolicy::default(), BoundaryPolicy::single_ridge());
    }

    #[test]
    fn test_serde_roundtrip_shape() {
        let json = serde_json::to_string(&BoundaryPolicy::single_ridge()).unwrap();
        assert_eq!(
            json,
            r#"{"south":"fixed_value","east":"closed","north":"fixed_value","west":"closed"}"#
        );
    }
}
