//! GeoTIFF DEM reader.
//!
//! Loads a single-band elevation raster from a GeoTIFF file using the pure
//! Rust `tiff` crate. Georeferencing comes from the ModelPixelScale (33550)
//! and ModelTiepoint (33922) tags; the GDAL NODATA tag (42113) is used when
//! present.
//!
//! # Example
//!
//! ```ignore
//! use lem_rs::io::GeoTiffDem;
//!
//! let dem = GeoTiffDem::load("data/ridge.tif")?;
//! let (grid, elevation) = dem.into_grid();
//! ```

use std::fs::File;
use std::path::Path;

use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;

use super::esri_ascii::DEFAULT_NODATA;
use crate::grid::RasterGrid;
use crate::types::GridShape;

/// Error type for GeoTIFF operations.
#[derive(Debug, Error)]
pub enum GeoTiffError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error
    #[error("TIFF error: {0}")]
    Tiff(String),

    /// Missing or invalid geotransform tags
    #[error("Missing geotransform: {0}")]
    MissingGeotransform(String),

    /// Grid nodes must be evenly spaced in x and y
    #[error("Non-square pixels: {dx} × {dy}")]
    NonSquarePixels { dx: f64, dy: f64 },

    /// Image has zero width or height
    #[error("Empty raster")]
    Empty,

    /// Only single-band grayscale rasters hold elevations
    #[error("Unsupported color type {0:?}; expected a single band")]
    UnsupportedColorType(ColorType),
}

impl From<tiff::TiffError> for GeoTiffError {
    fn from(e: tiff::TiffError) -> Self {
        GeoTiffError::Tiff(e.to_string())
    }
}

/// Elevation raster loaded from a GeoTIFF file.
#[derive(Clone, Debug)]
pub struct GeoTiffDem {
    /// Elevations in node order (south row first)
    elevation: Vec<f64>,
    shape: GridShape,
    /// Pixel size (m)
    spacing: f64,
    /// Lower-left pixel centre
    origin: (f64, f64),
    nodata: f64,
}

impl GeoTiffDem {
    /// Load a DEM from a GeoTIFF file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeoTiffError> {
        let file = File::open(&path)?;
        let mut decoder = Decoder::new(file)?;

        let (width, height) = decoder.dimensions()?;
        let shape = GridShape::try_new(height as usize, width as usize).ok_or(GeoTiffError::Empty)?;

        let color = decoder.colortype()?;
        if !matches!(color, ColorType::Gray(_)) {
            return Err(GeoTiffError::UnsupportedColorType(color));
        }

        let scale = decoder
            .get_tag_f64_vec(Tag::ModelPixelScaleTag)
            .map_err(|_| GeoTiffError::MissingGeotransform("no ModelPixelScale tag".into()))?;
        let tiepoint = decoder
            .get_tag_f64_vec(Tag::ModelTiepointTag)
            .map_err(|_| GeoTiffError::MissingGeotransform("no ModelTiepoint tag".into()))?;

        // ModelTiepoint: [I, J, K, X, Y, Z]; ModelPixelScale: [ScaleX, ScaleY, ScaleZ]
        if tiepoint.len() < 6 || scale.len() < 2 {
            return Err(GeoTiffError::MissingGeotransform(
                "malformed ModelTiepoint/ModelPixelScale tags".into(),
            ));
        }
        let (dx, dy) = (scale[0], scale[1]);
        if (dx - dy).abs() > 1e-9 * dx.abs().max(1.0) {
            return Err(GeoTiffError::NonSquarePixels { dx, dy });
        }
        if !(dx.is_finite() && dx > 0.0) {
            return Err(GeoTiffError::MissingGeotransform(format!(
                "invalid pixel size {}",
                dx
            )));
        }

        // Tiepoint maps raster (I, J) to model (X, Y); the raster origin is
        // the upper-left corner of the upper-left pixel.
        let left = tiepoint[3] - tiepoint[0] * dx;
        let top = tiepoint[4] + tiepoint[1] * dx;
        let origin = (
            left + 0.5 * dx,
            top - (height as f64 - 0.5) * dx,
        );

        let nodata = decoder
            .get_tag_ascii_string(Tag::GdalNodata)
            .ok()
            .and_then(|s| s.trim_end_matches('\0').trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_NODATA);

        let flat: Vec<f64> = match decoder.read_image()? {
            DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U64(data) => data.into_iter().map(|v| v as f64).collect(),
            DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F64(data) => data,
            DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I64(data) => data.into_iter().map(|v| v as f64).collect(),
        };

        let (nrows, ncols) = (shape.nrows(), shape.ncols());
        if flat.len() < nrows * ncols {
            return Err(GeoTiffError::Tiff(format!(
                "expected {} samples, decoded {}",
                nrows * ncols,
                flat.len()
            )));
        }

        // Image rows run north to south
        let mut elevation = Vec::with_capacity(nrows * ncols);
        for image_row in (0..nrows).rev() {
            let start = image_row * ncols;
            elevation.extend_from_slice(&flat[start..start + ncols]);
        }

        Ok(Self {
            elevation,
            shape,
            spacing: dx,
            origin,
            nodata,
        })
    }

    /// Raster shape.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// NODATA marker.
    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    /// Elevations in node order.
    pub fn elevation(&self) -> &[f64] {
        &self.elevation
    }

    /// Split into a grid (default status layout) and the elevation field.
    pub fn into_grid(self) -> (RasterGrid, Vec<f64>) {
        let grid = RasterGrid::new(self.shape, self.spacing).with_origin(self.origin.0, self.origin.1);
        (grid, self.elevation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tiff::encoder::{colortype, TiffEncoder};

    /// Write a Gray32Float DEM with GeoTIFF georeferencing tags.
    fn write_dem(
        path: &Path,
        width: u32,
        height: u32,
        data: &[f32],
        scale: &[f64],
        nodata: Option<&str>,
    ) {
        let file = File::create(path).unwrap();
        let mut encoder = TiffEncoder::new(file).unwrap();
        let mut image = encoder
            .new_image::<colortype::Gray32Float>(width, height)
            .unwrap();
        let tiepoint = [0.0, 0.0, 0.0, 100.0, 200.0, 0.0];
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, scale)
            .unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
            .unwrap();
        if let Some(value) = nodata {
            image.encoder().write_tag(Tag::GdalNodata, value).unwrap();
        }
        image.write_data(data).unwrap();
    }

    #[test]
    fn test_load_georeferenced_dem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        // Image rows north to south
        write_dem(
            &path,
            3,
            2,
            &[7.0, 8.0, 9.0, 1.0, 2.0, 3.0],
            &[3.0, 3.0, 0.0],
            Some("-9999"),
        );

        let dem = GeoTiffDem::load(&path).unwrap();
        assert_eq!(dem.shape(), GridShape::new(2, 3));
        assert_relative_eq!(dem.nodata(), -9999.0);
        assert_eq!(dem.elevation(), &[1.0, 2.0, 3.0, 7.0, 8.0, 9.0]);

        let (grid, elevation) = dem.into_grid();
        assert_relative_eq!(grid.spacing(), 3.0);
        let (x0, y0) = grid.origin();
        assert_relative_eq!(x0, 101.5);
        assert_relative_eq!(y0, 195.5);
        assert_eq!(elevation.len(), grid.n_nodes());
    }

    #[test]
    fn test_missing_nodata_tag_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        write_dem(&path, 2, 2, &[1.0; 4], &[5.0, 5.0, 0.0], None);

        let dem = GeoTiffDem::load(&path).unwrap();
        assert_relative_eq!(dem.nodata(), DEFAULT_NODATA);
    }

    #[test]
    fn test_non_square_pixels_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dem.tif");
        write_dem(&path, 2, 2, &[1.0; 4], &[3.0, 2.0, 0.0], None);

        let err = GeoTiffDem::load(&path).unwrap_err();
        assert!(matches!(err, GeoTiffError::NonSquarePixels { .. }));
    }

    #[test]
    fn test_multiband_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.tif");
        let file = File::create(&path).unwrap();
        let mut encoder = TiffEncoder::new(file).unwrap();
        encoder
            .write_image::<colortype::RGB8>(2, 2, &[0u8; 12])
            .unwrap();

        let err = GeoTiffDem::load(&path).unwrap_err();
        assert!(matches!(
            err,
            GeoTiffError::UnsupportedColorType(ColorType::RGB(8))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GeoTiffDem::load("/nonexistent/ridge.tif").unwrap_err();
        assert!(matches!(err, GeoTiffError::Io(_)));
    }

    #[test]
    fn test_non_tiff_content_is_decode_error() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ncols 2").unwrap();
        let err = GeoTiffDem::load(file.path()).unwrap_err();
        assert!(matches!(err, GeoTiffError::Tiff(_)));
    }
}
