//! Flow routing result and router trait.

use thiserror::Error;

use crate::grid::RasterGrid;

/// Error type for flow routing.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Elevation field does not match the grid
    #[error("Elevation has {found} values but grid has {expected} nodes")]
    FieldLength { expected: usize, found: usize },

    /// Elevation at an open node is NaN or infinite
    #[error("Non-finite elevation {value} at node {node}")]
    NonFinite { node: usize, value: f64 },

    /// Receiver graph contains a cycle or a node with no path to base level
    #[error("Receiver graph reaches {reached} of {expected} nodes from base level")]
    IncompleteStack { reached: usize, expected: usize },
}

/// Single-direction flow routing of every node.
///
/// Base-level nodes (boundaries and pits) are their own receivers.
#[derive(Clone, Debug)]
pub struct FlowRouting {
    /// Downstream receiver of each node
    pub receivers: Vec<usize>,
    /// Distance to the receiver (0 for base-level nodes)
    pub receiver_distance: Vec<f64>,
    /// Downhill gradient towards the receiver (0 for base-level nodes)
    pub slope: Vec<f64>,
    /// Node ordering with every receiver before its donors
    pub stack: Vec<usize>,
    /// Upslope contributing area including the node's own cell (m²)
    pub drainage_area: Vec<f64>,
}

impl FlowRouting {
    /// Build the stack and drainage area from per-node receivers.
    ///
    /// Only core nodes contribute their own cell area; perimeter and closed
    /// nodes add nothing of their own.
    pub fn from_receivers(
        grid: &RasterGrid,
        receivers: Vec<usize>,
        receiver_distance: Vec<f64>,
        slope: Vec<f64>,
    ) -> Result<Self, FlowError> {
        let n = receivers.len();
        if n != grid.n_nodes() {
            return Err(FlowError::FieldLength {
                expected: grid.n_nodes(),
                found: n,
            });
        }

        let stack = build_stack(&receivers);
        if stack.len() != n {
            return Err(FlowError::IncompleteStack {
                reached: stack.len(),
                expected: n,
            });
        }

        let cell_area = grid.cell_area();
        let mut drainage_area: Vec<f64> = (0..n)
            .map(|i| if grid.is_core(i) { cell_area } else { 0.0 })
            .collect();
        for &node in stack.iter().rev() {
            let r = receivers[node];
            if r != node {
                drainage_area[r] += drainage_area[node];
            }
        }

        Ok(Self {
            receivers,
            receiver_distance,
            slope,
            stack,
            drainage_area,
        })
    }

    /// Number of routed nodes.
    pub fn n_nodes(&self) -> usize {
        self.receivers.len()
    }

    /// Check if a node drains to itself.
    #[inline]
    pub fn is_base_level(&self, node: usize) -> bool {
        self.receivers[node] == node
    }

    /// Core nodes that drain to themselves (closed depressions).
    pub fn pits(&self, grid: &RasterGrid) -> Vec<usize> {
        grid.core_nodes()
            .iter()
            .copied()
            .filter(|&node| self.is_base_level(node))
            .collect()
    }

    /// Total drainage area delivered to non-core base-level nodes (m²).
    pub fn outlet_area(&self, grid: &RasterGrid) -> f64 {
        (0..self.n_nodes())
            .filter(|&node| self.is_base_level(node) && !grid.is_core(node))
            .map(|node| self.drainage_area[node])
            .sum()
    }
}

/// Strategy that assigns each node a receiver from the current elevation.
///
/// Implementations must be thread-safe (`Send + Sync`) so a configured
/// model can be handed to a worker thread.
pub trait FlowRouter: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Route flow over the grid for the given elevation field.
    fn route(&self, elevation: &[f64], grid: &RasterGrid) -> Result<FlowRouting, FlowError>;
}

/// Order nodes so that each receiver precedes all of its donors.
///
/// Depth-first from every base-level node over a compressed donor list.
fn build_stack(receivers: &[usize]) -> Vec<usize> {
    let n = receivers.len();

    let mut offsets = vec![0usize; n + 1];
    for (node, &r) in receivers.iter().enumerate() {
        if r != node {
            offsets[r + 1] += 1;
        }
    }
    for i in 0..n {
        offsets[i + 1] += offsets[i];
    }

    let mut donors = vec![0usize; offsets[n]];
    let mut fill = offsets[..n].to_vec();
    for (node, &r) in receivers.iter().enumerate() {
        if r != node {
            donors[fill[r]] = node;
            fill[r] += 1;
        }
    }

    let mut stack = Vec::with_capacity(n);
    let mut pending = Vec::new();
    for base in (0..n).filter(|&i| receivers[i] == i) {
        pending.push(base);
        while let Some(node) = pending.pop() {
            stack.push(node);
            pending.extend_from_slice(&donors[offsets[node]..offsets[node + 1]]);
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridShape;

    #[test]
    fn test_stack_puts_receivers_first() {
        // 0 <- 1 <- 2, 3 <- 4, 5 is its own base level
        let receivers = vec![0, 0, 1, 3, 3, 5];
        let stack = build_stack(&receivers);
        assert_eq!(stack.len(), 6);

        let position = |node: usize| stack.iter().position(|&s| s == node).unwrap();
        for (node, &r) in receivers.iter().enumerate() {
            assert!(position(r) <= position(node));
        }
    }

    #[test]
    fn test_cycle_is_incomplete() {
        // 1 and 2 point at each other and never reach base level
        let receivers = vec![0, 2, 1];
        assert_eq!(build_stack(&receivers).len(), 1);
    }

    #[test]
    fn test_drainage_area_accumulates_core_cells() {
        // 3x4 grid, cores are 5 and 6; 6 -> 5 -> 1 (south edge)
        let grid = RasterGrid::new(GridShape::new(3, 4), 2.0);
        let mut receivers: Vec<usize> = (0..12).collect();
        receivers[6] = 5;
        receivers[5] = 1;
        let routing =
            FlowRouting::from_receivers(&grid, receivers, vec![0.0; 12], vec![0.0; 12]).unwrap();

        assert_eq!(routing.drainage_area[6], 4.0);
        assert_eq!(routing.drainage_area[5], 8.0);
        assert_eq!(routing.drainage_area[1], 8.0);
        assert_eq!(routing.drainage_area[0], 0.0);
        assert_eq!(routing.outlet_area(&grid), 8.0);
        assert!(routing.pits(&grid).is_empty());
    }

    #[test]
    fn test_from_receivers_rejects_cycles() {
        let grid = RasterGrid::new(GridShape::new(3, 4), 1.0);
        let mut receivers: Vec<usize> = (0..12).collect();
        receivers[5] = 6;
        receivers[6] = 5;
        let err = FlowRouting::from_receivers(&grid, receivers, vec![0.0; 12], vec![0.0; 12])
            .unwrap_err();
        assert!(matches!(
            err,
            FlowError::IncompleteStack {
                reached: 10,
                expected: 12
            }
        ));
    }
}
