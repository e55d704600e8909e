//! I/O utilities for reading and writing raster data.
//!
//! This module provides:
//! - **ESRI ASCII grids**: DEM input and node-field output
//! - **GeoTIFF DEMs**: DEM input from georeferenced TIFF (requires `geotiff` feature)
//! - **VTK output**: VTI snapshots and PVD series for ParaView
//!
//! Cross-section CSV output lives in [`crate::analysis`].
//!
//! # Example
//!
//! ```ignore
//! use lem_rs::io::{read_esri_ascii, write_esri_ascii, DEFAULT_NODATA};
//!
//! let raster = read_esri_ascii("rootr.txt")?;
//! let (grid, elevation) = raster.into_grid();
//! // ... run the model ...
//! write_esri_ascii("final.asc", &grid, &elevation, DEFAULT_NODATA)?;
//! ```

mod esri_ascii;
#[cfg(feature = "geotiff")]
mod geotiff;
mod vtk;

pub use esri_ascii::{
    CellAnchor, DEFAULT_NODATA, EsriAsciiError, EsriAsciiHeader, EsriAsciiRaster,
    parse_esri_ascii, read_esri_ascii, write_esri_ascii,
};
#[cfg(feature = "geotiff")]
pub use geotiff::{GeoTiffDem, GeoTiffError};
pub use vtk::{VtkError, write_pvd, write_vti};
