//! D8 steepest-descent flow routing.

use super::routing::{FlowError, FlowRouter, FlowRouting};
use crate::grid::RasterGrid;

/// Route each core node to its steepest downhill neighbour among eight.
///
/// - Diagonal neighbours are `dx·√2` away.
/// - Closed nodes never receive flow.
/// - Non-core nodes are base level (their own receiver).
/// - A core node with no strictly lower open neighbour is a pit.
/// - Ties go to the first neighbour in E, N, W, S, NE, NW, SW, SE order.
#[derive(Clone, Copy, Debug, Default)]
pub struct D8Router;

impl FlowRouter for D8Router {
    fn name(&self) -> &'static str {
        "D8"
    }

    fn route(&self, elevation: &[f64], grid: &RasterGrid) -> Result<FlowRouting, FlowError> {
        let n = grid.n_nodes();
        if elevation.len() != n {
            return Err(FlowError::FieldLength {
                expected: n,
                found: elevation.len(),
            });
        }
        if let Some(node) =
            (0..n).find(|&i| grid.status(i).is_open() && !elevation[i].is_finite())
        {
            return Err(FlowError::NonFinite {
                node,
                value: elevation[node],
            });
        }

        let mut receivers: Vec<usize> = (0..n).collect();
        let mut receiver_distance = vec![0.0; n];
        let mut slope = vec![0.0; n];

        for &node in grid.core_nodes() {
            let z = elevation[node];
            let mut steepest = 0.0;

            for (k, neighbor) in grid.neighbors8(node).into_iter().enumerate() {
                let Some(j) = neighbor else { continue };
                if grid.status(j).is_closed() {
                    continue;
                }
                let distance = grid.neighbor_distance(k);
                let gradient = (z - elevation[j]) / distance;
                if gradient > steepest {
                    steepest = gradient;
                    receivers[node] = j;
                    receiver_distance[node] = distance;
                }
            }
            slope[node] = steepest;
        }

        FlowRouting::from_receivers(grid, receivers, receiver_distance, slope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BoundaryPolicy, NodeStatus};
    use crate::types::GridShape;
    use approx::assert_relative_eq;

    /// Plane dipping south, 1 m per row.
    fn south_dipping(nrows: usize, ncols: usize) -> (RasterGrid, Vec<f64>) {
        let grid = RasterGrid::new(GridShape::new(nrows, ncols), 1.0);
        let z = (0..grid.n_nodes())
            .map(|i| grid.row_col(i).0 as f64)
            .collect();
        (grid, z)
    }

    #[test]
    fn test_plane_routes_straight_downhill() {
        let (grid, z) = south_dipping(4, 4);
        let routing = D8Router.route(&z, &grid).unwrap();

        for &node in grid.core_nodes() {
            let (row, col) = grid.row_col(node);
            assert_eq!(routing.receivers[node], grid.node_at(row - 1, col));
            assert_relative_eq!(routing.slope[node], 1.0);
            assert_relative_eq!(routing.receiver_distance[node], 1.0);
        }
    }

    #[test]
    fn test_diagonal_wins_when_steeper() {
        let grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        let mut z = vec![10.0; 9];
        z[4] = 5.0;
        z[1] = 4.5; // S: slope 0.5
        z[0] = 0.0; // SW: slope 5/√2
        let routing = D8Router.route(&z, &grid).unwrap();
        assert_eq!(routing.receivers[4], 0);
        assert_relative_eq!(routing.slope[4], 5.0 / 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_closed_nodes_never_receive() {
        let mut grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        grid.set_status(1, NodeStatus::Closed);
        let mut z = vec![10.0; 9];
        z[1] = 0.0;
        z[4] = 5.0;
        z[3] = 4.0;
        let routing = D8Router.route(&z, &grid).unwrap();
        assert_eq!(routing.receivers[4], 3);
        assert!(routing.is_base_level(1));
    }

    #[test]
    fn test_pit_is_own_receiver() {
        let grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        let mut z = vec![10.0; 9];
        z[4] = 1.0;
        let routing = D8Router.route(&z, &grid).unwrap();
        assert!(routing.is_base_level(4));
        assert_eq!(routing.pits(&grid), vec![4]);
        assert_eq!(routing.slope[4], 0.0);
    }

    #[test]
    fn test_ties_prefer_east() {
        let grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        let mut z = vec![10.0; 9];
        z[4] = 5.0;
        z[5] = 0.0; // E
        z[3] = 0.0; // W
        let routing = D8Router.route(&z, &grid).unwrap();
        assert_eq!(routing.receivers[4], 5);
    }

    #[test]
    fn test_area_reaches_outlets_on_ridge_policy() {
        let (mut grid, z) = south_dipping(5, 6);
        BoundaryPolicy::single_ridge().apply(&mut grid);
        let routing = D8Router.route(&z, &grid).unwrap();

        let total_core_area = grid.n_core_nodes() as f64 * grid.cell_area();
        assert_relative_eq!(routing.outlet_area(&grid), total_core_area);
    }

    #[test]
    fn test_rejects_bad_fields() {
        let grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        assert!(matches!(
            D8Router.route(&[0.0; 4], &grid),
            Err(FlowError::FieldLength { expected: 9, found: 4 })
        ));

        let mut z = vec![0.0; 9];
        z[4] = f64::NAN;
        assert!(matches!(
            D8Router.route(&z, &grid),
            Err(FlowError::NonFinite { node: 4, .. })
        ));
    }
}
