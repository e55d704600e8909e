//! Regular raster grid of nodes.
//!
//! Nodes are numbered row-major from the south-west corner:
//!
//! ```text
//!   row 2   8  9 10 11      (north)
//!   row 1   4  5  6  7
//!   row 0   0  1  2  3      (south)
//! ```
//!
//! Node `(row, col)` sits at `(x0 + col·dx, y0 + row·dx)`. Perimeter nodes
//! have no cell; interior nodes own a `dx × dx` cell.

use std::f64::consts::SQRT_2;

use super::status::NodeStatus;
use crate::types::{GridShape, Side};

/// Offsets `(d_row, d_col)` of the eight neighbours, in routing order:
/// E, N, W, S, NE, NW, SW, SE.
pub const D8_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

/// Regular raster grid with per-node boundary status.
#[derive(Clone, Debug)]
pub struct RasterGrid {
    shape: GridShape,
    /// Node spacing in x and y (m)
    spacing: f64,
    /// Coordinates of node 0 (lower-left node centre)
    origin: (f64, f64),
    status: Vec<NodeStatus>,
    /// Cached ids of core nodes, ascending
    core_nodes: Vec<usize>,
}

impl RasterGrid {
    /// Create a grid with the default status layout: perimeter nodes
    /// fixed-value, interior nodes core.
    ///
    /// # Panics
    ///
    /// Panics if `spacing` is not a positive finite number.
    pub fn new(shape: GridShape, spacing: f64) -> Self {
        assert!(
            spacing.is_finite() && spacing > 0.0,
            "grid spacing must be positive, got {}",
            spacing
        );

        let status = (0..shape.n_nodes())
            .map(|node| {
                if shape.is_perimeter(node) {
                    NodeStatus::FixedValue
                } else {
                    NodeStatus::Core
                }
            })
            .collect();

        let mut grid = Self {
            shape,
            spacing,
            origin: (0.0, 0.0),
            status,
            core_nodes: Vec::new(),
        };
        grid.refresh_core_nodes();
        grid
    }

    /// Set the coordinates of the lower-left node.
    pub fn with_origin(mut self, x0: f64, y0: f64) -> Self {
        self.origin = (x0, y0);
        self
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of node rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.shape.nrows()
    }

    /// Number of node columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.shape.ncols()
    }

    /// Total number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.shape.n_nodes()
    }

    /// Node spacing (m).
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Area of one interior cell (m²).
    #[inline]
    pub fn cell_area(&self) -> f64 {
        self.spacing * self.spacing
    }

    /// Coordinates of the lower-left node.
    #[inline]
    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// x-coordinate of a node.
    #[inline]
    pub fn node_x(&self, node: usize) -> f64 {
        let (_, col) = self.shape.row_col(node);
        self.origin.0 + col as f64 * self.spacing
    }

    /// y-coordinate of a node.
    #[inline]
    pub fn node_y(&self, node: usize) -> f64 {
        let (row, _) = self.shape.row_col(node);
        self.origin.1 + row as f64 * self.spacing
    }

    /// Node id at `(row, col)`.
    #[inline]
    pub fn node_at(&self, row: usize, col: usize) -> usize {
        self.shape.node_at(row, col)
    }

    /// `(row, col)` of a node.
    #[inline]
    pub fn row_col(&self, node: usize) -> (usize, usize) {
        self.shape.row_col(node)
    }

    /// Status of a node.
    #[inline]
    pub fn status(&self, node: usize) -> NodeStatus {
        self.status[node]
    }

    /// Status of every node.
    pub fn status_at_node(&self) -> &[NodeStatus] {
        &self.status
    }

    /// Check if a node is a core node.
    #[inline]
    pub fn is_core(&self, node: usize) -> bool {
        self.status[node].is_core()
    }

    /// Ids of all core nodes in ascending order.
    pub fn core_nodes(&self) -> &[usize] {
        &self.core_nodes
    }

    /// Number of core nodes.
    pub fn n_core_nodes(&self) -> usize {
        self.core_nodes.len()
    }

    /// Ids of the nodes on one edge, corners included.
    ///
    /// South and north edges run west to east; east and west edges run
    /// south to north.
    pub fn nodes_at_edge(&self, side: Side) -> Vec<usize> {
        let (nrows, ncols) = (self.nrows(), self.ncols());
        match side {
            Side::South => (0..ncols).map(|c| self.node_at(0, c)).collect(),
            Side::North => (0..ncols).map(|c| self.node_at(nrows - 1, c)).collect(),
            Side::West => (0..nrows).map(|r| self.node_at(r, 0)).collect(),
            Side::East => (0..nrows).map(|r| self.node_at(r, ncols - 1)).collect(),
        }
    }

    /// Set the status of one node.
    pub fn set_status(&mut self, node: usize, status: NodeStatus) {
        self.status[node] = status;
        self.refresh_core_nodes();
    }

    /// Set the status of every node on one edge.
    pub fn set_status_at_edge(&mut self, side: Side, status: NodeStatus) {
        for node in self.nodes_at_edge(side) {
            self.status[node] = status;
        }
        self.refresh_core_nodes();
    }

    /// Close every node whose field value equals `nodata`.
    ///
    /// Returns the number of nodes closed.
    pub fn set_nodata_nodes_to_closed(&mut self, field: &[f64], nodata: f64) -> usize {
        let mut n_closed = 0;
        for (status, &value) in self.status.iter_mut().zip(field) {
            if value == nodata {
                *status = NodeStatus::Closed;
                n_closed += 1;
            }
        }
        self.refresh_core_nodes();
        n_closed
    }

    /// The four orthogonal neighbours in order E, N, W, S.
    ///
    /// `None` marks positions outside the grid.
    #[inline]
    pub fn neighbors4(&self, node: usize) -> [Option<usize>; 4] {
        let mut out = [None; 4];
        for (slot, &offset) in out.iter_mut().zip(D8_OFFSETS[..4].iter()) {
            *slot = self.offset_node(node, offset);
        }
        out
    }

    /// The eight neighbours in order E, N, W, S, NE, NW, SW, SE.
    #[inline]
    pub fn neighbors8(&self, node: usize) -> [Option<usize>; 8] {
        let mut out = [None; 8];
        for (slot, &offset) in out.iter_mut().zip(D8_OFFSETS.iter()) {
            *slot = self.offset_node(node, offset);
        }
        out
    }

    /// Distance from a node to its neighbour at position `k` of
    /// [`RasterGrid::neighbors8`].
    #[inline]
    pub fn neighbor_distance(&self, k: usize) -> f64 {
        if k < 4 {
            self.spacing
        } else {
            self.spacing * SQRT_2
        }
    }

    /// Whether the orthogonal link between two nodes carries flux: neither
    /// end is closed and at least one end is core.
    #[inline]
    pub fn is_active_link(&self, a: usize, b: usize) -> bool {
        let (sa, sb) = (self.status[a], self.status[b]);
        sa.is_open() && sb.is_open() && (sa.is_core() || sb.is_core())
    }

    /// Column index through the middle of the grid.
    pub fn middle_column(&self) -> usize {
        self.ncols() / 2
    }

    fn offset_node(&self, node: usize, (d_row, d_col): (isize, isize)) -> Option<usize> {
        let (row, col) = self.row_col(node);
        let r = row.checked_add_signed(d_row)?;
        let c = col.checked_add_signed(d_col)?;
        (r < self.nrows() && c < self.ncols()).then(|| self.node_at(r, c))
    }

    fn refresh_core_nodes(&mut self) {
        self.core_nodes = self
            .status
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_core())
            .map(|(i, _)| i)
            .collect();
    }
}
