//! Raster grid shape.

use std::fmt;

/// Number of node rows and columns in a raster grid.
///
/// Keeps `nrows`/`ncols` from being swapped with each other or with
/// other integer parameters.
///
/// # Example
///
/// ```
/// use lem_rs::types::GridShape;
///
/// let shape = GridShape::new(215, 216);
/// assert_eq!(shape.nrows(), 215);
/// assert_eq!(shape.ncols(), 216);
/// assert_eq!(shape.n_nodes(), 215 * 216);
/// assert_eq!(shape.n_core_nodes(), 213 * 214);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    nrows: usize,
    ncols: usize,
}

impl GridShape {
    /// Create a new shape.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. Use [`GridShape::try_new`] for
    /// dimensions read from a file.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        assert!(nrows > 0, "nrows must be positive, got {}", nrows);
        assert!(ncols > 0, "ncols must be positive, got {}", ncols);
        Self { nrows, ncols }
    }

    /// Create a new shape, returning `None` if either dimension is zero.
    pub fn try_new(nrows: usize, ncols: usize) -> Option<Self> {
        (nrows > 0 && ncols > 0).then_some(Self { nrows, ncols })
    }

    /// Number of node rows (south to north).
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of node columns (west to east).
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Total number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nrows * self.ncols
    }

    /// Number of interior (non-perimeter) nodes.
    #[inline]
    pub fn n_core_nodes(&self) -> usize {
        self.nrows.saturating_sub(2) * self.ncols.saturating_sub(2)
    }

    /// Node id of `(row, col)`, row 0 being the southern row.
    #[inline]
    pub fn node_at(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.nrows && col < self.ncols);
        row * self.ncols + col
    }

    /// `(row, col)` of a node id.
    #[inline]
    pub fn row_col(&self, node: usize) -> (usize, usize) {
        (node / self.ncols, node % self.ncols)
    }

    /// Whether a node lies on the grid perimeter.
    #[inline]
    pub fn is_perimeter(&self, node: usize) -> bool {
        let (row, col) = self.row_col(node);
        row == 0 || col == 0 || row + 1 == self.nrows || col + 1 == self.ncols
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.nrows, self.ncols)
    }
}

impl From<(usize, usize)> for GridShape {
    fn from((nrows, ncols): (usize, usize)) -> Self {
        Self::new(nrows, ncols)
    }
}
