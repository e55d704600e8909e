//! # lem-rs
//!
//! A small landscape evolution model on a raster DEM.
//!
//! A ridge evolves under three processes, applied every fixed time step:
//! - Hillslope diffusion (soil creep), `dz/dt = D ∇²z`
//! - Stream-power fluvial erosion, `E = K·A^m·S^n`, on D8 flow routing
//! - Uniform tectonic uplift of core nodes
//!
//! The driver also averages the erosional change over a trailing window of
//! steps, giving a map of the late-run erosion/deposition rate.
//!
//! # Modules
//! - [`types`], [`grid`]: raster geometry, node status and edge policy
//! - [`io`]: ESRI ASCII and GeoTIFF input; ESRI ASCII and VTK output
//! - [`flow`]: D8 routing, stack ordering and drainage area
//! - [`process`]: diffusion, stream power and uplift strategies
//! - [`config`]: run parameters with JSON load/save
//! - [`simulation`]: the time-step driver and run diagnostics
//! - [`analysis`]: cross sections and field statistics
//!
//! # Example
//!
//! ```
//! use lem_rs::{CrossSection, ModelParameters, RasterGrid, TimeStepDriver};
//! use lem_rs::types::GridShape;
//!
//! let grid = RasterGrid::new(GridShape::new(20, 15), 3.0);
//! let elevation: Vec<f64> = (0..grid.n_nodes())
//!     .map(|i| {
//!         let (row, _) = grid.row_col(i);
//!         30.0 - 3.0 * (row as f64 - 9.5).abs()
//!     })
//!     .collect();
//!
//! let params = ModelParameters::default()
//!     .with_stream_power(1e-4, 0.5, 1.0)
//!     .with_time(500.0, 10.0);
//! let mut driver = TimeStepDriver::from_parameters(grid, elevation, params).unwrap();
//! driver.run().unwrap();
//!
//! let profile = CrossSection::middle(driver.grid(), "elevation", driver.elevation()).unwrap();
//! assert_eq!(profile.len(), 20);
//! ```

pub mod analysis;
pub mod config;
pub mod flow;
pub mod grid;
pub mod io;
pub mod process;
pub mod simulation;
pub mod types;

pub use analysis::{CrossSection, FieldStatistics};
pub use config::{ConfigError, ModelParameters};
pub use flow::{D8Router, FlowError, FlowRouter, FlowRouting};
pub use grid::{BoundaryPolicy, NodeStatus, RasterGrid};
pub use process::{
    LinearDiffuser, ProcessContext, ProcessError, StreamPowerEroder, SurfaceProcess,
    UpliftApplicator,
};
pub use simulation::{
    DriverState, ErosionWindow, ProcessBudget, SimulationError, SimulationResult, StepProgress,
    TimeStepDriver,
};
