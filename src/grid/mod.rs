//! Raster grid, node status and edge boundary policy.
//!
//! - [`RasterGrid`]: node layout, coordinates, D8 neighbourhoods
//! - [`NodeStatus`]: core / fixed-value / closed classification
//! - [`BoundaryPolicy`]: per-edge status assignment

mod boundary;
mod raster;
mod status;

pub use boundary::BoundaryPolicy;
pub use raster::{D8_OFFSETS, RasterGrid};
pub use status::NodeStatus;
