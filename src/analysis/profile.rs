//! North-south cross sections through the grid.
//!
//! A cross section samples one grid column from the southern edge to the
//! northern edge. Written as two-column CSV for external plotting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::grid::RasterGrid;

/// Error type for cross-section extraction and output.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested column is outside the grid
    #[error("Column {column} outside grid with {ncols} columns")]
    ColumnOutOfRange { column: usize, ncols: usize },

    /// Field does not have one value per grid node
    #[error("Field has {found} values, grid has {expected} nodes")]
    FieldLength { expected: usize, found: usize },
}

/// Values of a field along one grid column, south to north.
#[derive(Clone, Debug)]
pub struct CrossSection {
    /// Field name, used as the CSV value header
    pub name: String,
    /// Grid column sampled
    pub column: usize,
    /// x-coordinate of the column (m)
    pub x: f64,
    /// Node ids, south to north
    pub nodes: Vec<usize>,
    /// Node y-coordinates (m)
    pub y: Vec<f64>,
    /// Field values
    pub values: Vec<f64>,
}

impl CrossSection {
    /// Sample `field` along column `column`.
    pub fn north_south(
        grid: &RasterGrid,
        name: &str,
        field: &[f64],
        column: usize,
    ) -> Result<Self, ProfileError> {
        if column >= grid.ncols() {
            return Err(ProfileError::ColumnOutOfRange {
                column,
                ncols: grid.ncols(),
            });
        }
        if field.len() != grid.n_nodes() {
            return Err(ProfileError::FieldLength {
                expected: grid.n_nodes(),
                found: field.len(),
            });
        }

        let nodes: Vec<usize> = (0..grid.nrows()).map(|row| grid.node_at(row, column)).collect();
        let y = nodes.iter().map(|&node| grid.node_y(node)).collect();
        let values = nodes.iter().map(|&node| field[node]).collect();

        Ok(Self {
            name: name.to_string(),
            column,
            x: grid.node_x(grid.node_at(0, column)),
            nodes,
            y,
            values,
        })
    }

    /// Sample `field` along the middle column of the grid.
    pub fn middle(grid: &RasterGrid, name: &str, field: &[f64]) -> Result<Self, ProfileError> {
        Self::north_south(grid, name, field, grid.middle_column())
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Highest sample as `(y, value)`.
    pub fn crest(&self) -> Option<(f64, f64)> {
        self.y
            .iter()
            .zip(&self.values)
            .map(|(&y, &v)| (y, v))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Write the profile as `y,<name>` CSV.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ProfileError> {
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);
        writeln!(w, "y,{}", self.name)?;
        for (y, v) in self.y.iter().zip(&self.values) {
            writeln!(w, "{},{}", y, v)?;
        }
        w.flush()?;
        Ok(())
    }
}
