//! Small strongly-typed helpers shared across the crate.
//!
//! - [`GridShape`]: node rows/columns of a raster grid
//! - [`SideBoundaries`]: one value per grid edge, addressed by [`Side`]

mod shape;
mod sides;

pub use shape::GridShape;
pub use sides::{Side, SideBoundaries};
