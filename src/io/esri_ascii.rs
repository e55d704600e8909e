//! ESRI ASCII grid reader and writer.
//!
//! # File Format
//!
//! ```text
//! ncols         4
//! nrows         3
//! xllcorner     500000.0
//! yllcorner     4800000.0
//! cellsize      3.0
//! NODATA_value  -9999
//! 310.2 311.0 311.4 310.9
//! 312.5 314.1 314.0 312.2
//! 309.8 310.4 310.6 309.9
//! ```
//!
//! Header keys are case-insensitive and may appear in any order. The first
//! data row is the northern row; values are flipped on read so that node 0
//! is the south-west node. `xllcorner`/`yllcorner` give the outer corner of
//! the lower-left cell, so the lower-left node sits half a cell inside it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::grid::RasterGrid;
use crate::types::GridShape;

/// Default NODATA value when the header omits one.
pub const DEFAULT_NODATA: f64 = -9999.0;

/// Error type for ESRI ASCII grid files.
#[derive(Debug, Error)]
pub enum EsriAsciiError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required header key not present
    #[error("Missing header key: {0}")]
    MissingHeader(&'static str),

    /// Header value could not be parsed or is out of range
    #[error("Invalid header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },

    /// Data value could not be parsed
    #[error("Invalid value '{token}' at line {line}")]
    InvalidValue { line: usize, token: String },

    /// Number of data values does not match nrows × ncols
    #[error("Expected {expected} values, found {found}")]
    ValueCount { expected: usize, found: usize },

    /// Field length does not match the grid when writing
    #[error("Field has {found} values but grid has {expected} nodes")]
    FieldLength { expected: usize, found: usize },
}

/// What the `xll`/`yll` header coordinates refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellAnchor {
    /// Outer corner of the lower-left cell (`xllcorner`)
    Corner,
    /// Centre of the lower-left cell (`xllcenter`)
    Center,
}

/// Parsed ESRI ASCII header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EsriAsciiHeader {
    /// Number of columns
    pub ncols: usize,
    /// Number of rows
    pub nrows: usize,
    /// x of the lower-left reference point
    pub xll: f64,
    /// y of the lower-left reference point
    pub yll: f64,
    /// Whether `xll`/`yll` are corner or centre coordinates
    pub anchor: CellAnchor,
    /// Cell size (m)
    pub cellsize: f64,
    /// NODATA marker
    pub nodata: f64,
}

impl EsriAsciiHeader {
    /// Coordinates of the lower-left node centre.
    pub fn lower_left_node(&self) -> (f64, f64) {
        match self.anchor {
            CellAnchor::Corner => (
                self.xll + 0.5 * self.cellsize,
                self.yll + 0.5 * self.cellsize,
            ),
            CellAnchor::Center => (self.xll, self.yll),
        }
    }
}

/// An ESRI ASCII raster with values in grid node order.
#[derive(Clone, Debug)]
pub struct EsriAsciiRaster {
    /// File header
    pub header: EsriAsciiHeader,
    /// Values in node order (south row first)
    values: Vec<f64>,
}

impl EsriAsciiRaster {
    /// Values in node order (south row first).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Build the grid described by the header.
    ///
    /// All perimeter nodes are fixed-value and interior nodes core; apply a
    /// [`crate::grid::BoundaryPolicy`] afterwards.
    pub fn grid(&self) -> RasterGrid {
        let shape = GridShape::new(self.header.nrows, self.header.ncols);
        let (x0, y0) = self.header.lower_left_node();
        RasterGrid::new(shape, self.header.cellsize).with_origin(x0, y0)
    }

    /// Split into the grid and the node-ordered field.
    pub fn into_grid(self) -> (RasterGrid, Vec<f64>) {
        let grid = self.grid();
        (grid, self.values)
    }
}

/// Parse ESRI ASCII grid content.
pub fn parse_esri_ascii(content: &str) -> Result<EsriAsciiRaster, EsriAsciiError> {
    let mut ncols = None;
    let mut nrows = None;
    let mut xll = None;
    let mut yll = None;
    let mut cellsize = None;
    let mut nodata = None;

    // rows as they appear in the file, northern row first
    let mut file_values: Vec<f64> = Vec::new();
    let mut in_data = false;

    for (line_idx, line) in content.lines().enumerate() {
        let line_num = line_idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let first = tokens.next().unwrap_or_default();

        let is_key = first
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());

        if is_key && !in_data {
            let value = tokens.next().ok_or_else(|| EsriAsciiError::InvalidHeader {
                line: line_num,
                message: format!("no value for '{}'", first),
            })?;

            match first.to_ascii_lowercase().as_str() {
                "ncols" => ncols = Some(parse_count(value, line_num)?),
                "nrows" => nrows = Some(parse_count(value, line_num)?),
                "xllcorner" => xll = Some((parse_real(value, line_num)?, CellAnchor::Corner)),
                "xllcenter" => xll = Some((parse_real(value, line_num)?, CellAnchor::Center)),
                "yllcorner" => yll = Some((parse_real(value, line_num)?, CellAnchor::Corner)),
                "yllcenter" => yll = Some((parse_real(value, line_num)?, CellAnchor::Center)),
                "cellsize" => cellsize = Some(parse_real(value, line_num)?),
                "nodata_value" => nodata = Some(parse_real(value, line_num)?),
                other => {
                    return Err(EsriAsciiError::InvalidHeader {
                        line: line_num,
                        message: format!("unknown key '{}'", other),
                    });
                }
            }
            continue;
        }

        in_data = true;
        for token in std::iter::once(first).chain(tokens) {
            let value = token
                .parse::<f64>()
                .map_err(|_| EsriAsciiError::InvalidValue {
                    line: line_num,
                    token: token.to_string(),
                })?;
            file_values.push(value);
        }
    }

    let ncols = ncols.ok_or(EsriAsciiError::MissingHeader("ncols"))?;
    let nrows = nrows.ok_or(EsriAsciiError::MissingHeader("nrows"))?;
    let (xll, x_anchor) = xll.ok_or(EsriAsciiError::MissingHeader("xllcorner"))?;
    let (yll, y_anchor) = yll.ok_or(EsriAsciiError::MissingHeader("yllcorner"))?;
    let cellsize = cellsize.ok_or(EsriAsciiError::MissingHeader("cellsize"))?;

    if x_anchor != y_anchor {
        return Err(EsriAsciiError::InvalidHeader {
            line: 0,
            message: "xll and yll must both be corner or both be center".into(),
        });
    }
    if !(cellsize.is_finite() && cellsize > 0.0) {
        return Err(EsriAsciiError::InvalidHeader {
            line: 0,
            message: format!("cellsize must be positive, got {}", cellsize),
        });
    }

    let expected = nrows * ncols;
    if file_values.len() != expected {
        return Err(EsriAsciiError::ValueCount {
            expected,
            found: file_values.len(),
        });
    }

    // Flip rows: file row 0 is the northern row
    let mut values = Vec::with_capacity(expected);
    for file_row in (0..nrows).rev() {
        let start = file_row * ncols;
        values.extend_from_slice(&file_values[start..start + ncols]);
    }

    Ok(EsriAsciiRaster {
        header: EsriAsciiHeader {
            ncols,
            nrows,
            xll,
            yll,
            anchor: x_anchor,
            cellsize,
            nodata: nodata.unwrap_or(DEFAULT_NODATA),
        },
        values,
    })
}

/// Read an ESRI ASCII grid file.
///
/// # Example
///
/// ```ignore
/// use lem_rs::io::read_esri_ascii;
///
/// let raster = read_esri_ascii("rootr.txt")?;
/// let (grid, elevation) = raster.into_grid();
/// ```
pub fn read_esri_ascii<P: AsRef<Path>>(path: P) -> Result<EsriAsciiRaster, EsriAsciiError> {
    let content = std::fs::read_to_string(path)?;
    parse_esri_ascii(&content)
}

/// Write a node field as an ESRI ASCII grid (corner-referenced header).
pub fn write_esri_ascii<P: AsRef<Path>>(
    path: P,
    grid: &RasterGrid,
    field: &[f64],
    nodata: f64,
) -> Result<(), EsriAsciiError> {
    if field.len() != grid.n_nodes() {
        return Err(EsriAsciiError::FieldLength {
            expected: grid.n_nodes(),
            found: field.len(),
        });
    }

    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    let dx = grid.spacing();
    let (x0, y0) = grid.origin();
    writeln!(w, "ncols         {}", grid.ncols())?;
    writeln!(w, "nrows         {}", grid.nrows())?;
    writeln!(w, "xllcorner     {}", x0 - 0.5 * dx)?;
    writeln!(w, "yllcorner     {}", y0 - 0.5 * dx)?;
    writeln!(w, "cellsize      {}", dx)?;
    writeln!(w, "NODATA_value  {}", nodata)?;

    for row in (0..grid.nrows()).rev() {
        let start = grid.node_at(row, 0);
        let line: Vec<String> = field[start..start + grid.ncols()]
            .iter()
            .map(|v| v.to_string())
            .collect();
        writeln!(w, "{}", line.join(" "))?;
    }

    w.flush()?;
    Ok(())
}

fn parse_count(value: &str, line: usize) -> Result<usize, EsriAsciiError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(EsriAsciiError::InvalidHeader {
            line,
            message: format!("expected a positive integer, got '{}'", value),
        }),
    }
}

fn parse_real(value: &str, line: usize) -> Result<f64, EsriAsciiError> {
    value
        .parse::<f64>()
        .map_err(|_| EsriAsciiError::InvalidHeader {
            line,
            message: format!("expected a number, got '{}'", value),
        })
}
