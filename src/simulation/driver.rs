//! Fixed-step driver for the landscape evolution loop.
//!
//! Each step runs, in order:
//!
//! 1. snapshot elevation (inside the trailing window only)
//! 2. hillslope diffusion
//! 3. flow routing on the diffused surface
//! 4. fluvial erosion
//! 5. window accumulation of `post − pre`
//! 6. uplift of core nodes
//! 7. progress report every `report_interval` steps
//!
//! Uplift is applied after the measurement, so the window rate holds only
//! the erosional/depositional change.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::accumulator::ErosionWindow;
use super::diagnostics::{BudgetTerm, ProcessBudget, ProgressReporter, SimulationResult};
use crate::analysis::{FieldStatistics, ProfileError};
use crate::config::{ConfigError, ModelParameters};
use crate::flow::{D8Router, FlowError, FlowRouter, FlowRouting};
use crate::grid::RasterGrid;
#[cfg(feature = "geotiff")]
use crate::io::GeoTiffError;
use crate::io::{EsriAsciiError, VtkError};
use crate::process::{ProcessContext, ProcessError, SurfaceProcess};

// =============================================================================
// Errors
// =============================================================================

/// Error type for setting up and running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    EsriAscii(#[from] EsriAsciiError),

    #[cfg(feature = "geotiff")]
    #[error(transparent)]
    GeoTiff(#[from] GeoTiffError),

    #[error(transparent)]
    Vtk(#[from] VtkError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Initial elevation does not match the grid
    #[error("Elevation has {found} values but grid has {expected} nodes")]
    FieldLength { expected: usize, found: usize },

    /// `run` called on a driver that has already started
    #[error("Driver cannot run from state {0}")]
    InvalidState(DriverState),
}

// =============================================================================
// State
// =============================================================================

/// Lifecycle of a [`TimeStepDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Built, not yet run
    Initializing,
    /// Stepping before the trailing window
    Stepping,
    /// Stepping inside the trailing window
    WindowedAccumulating,
    /// Run complete, window normalised
    Done,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverState::Initializing => "initializing",
            DriverState::Stepping => "stepping",
            DriverState::WindowedAccumulating => "windowed-accumulating",
            DriverState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Snapshot handed to the progress callback.
#[derive(Clone, Copy, Debug)]
pub struct StepProgress<'a> {
    /// Step just completed (0-based)
    pub step: usize,
    /// Total steps in the run
    pub n_steps: usize,
    /// Simulated time after this step (yr)
    pub years: f64,
    /// Elevation after this step
    pub elevation: &'a [f64],
    /// Drainage area of this step
    pub drainage_area: &'a [f64],
    /// Whether the step was inside the trailing window
    pub in_window: bool,
}

// =============================================================================
// Driver
// =============================================================================

/// Owns the grid, the elevation field and the process strategies, and
/// advances them through a fixed number of steps.
///
/// # Example
///
/// ```
/// use lem_rs::config::ModelParameters;
/// use lem_rs::grid::RasterGrid;
/// use lem_rs::simulation::TimeStepDriver;
/// use lem_rs::types::GridShape;
///
/// let grid = RasterGrid::new(GridShape::new(10, 10), 3.0);
/// let elevation = vec![0.0; grid.n_nodes()];
/// let params = ModelParameters::default().with_time(100.0, 10.0);
///
/// let mut driver = TimeStepDriver::from_parameters(grid, elevation, params).unwrap();
/// let result = driver.run().unwrap();
/// assert_eq!(result.n_steps, 10);
/// ```
pub struct TimeStepDriver {
    params: ModelParameters,
    grid: RasterGrid,
    elevation: Vec<f64>,
    initial_elevation: Vec<f64>,
    router: Box<dyn FlowRouter>,
    hillslope: Box<dyn SurfaceProcess>,
    fluvial: Box<dyn SurfaceProcess>,
    uplift: Box<dyn SurfaceProcess>,
    routing: Option<FlowRouting>,
    window: ErosionWindow,
    budget: ProcessBudget,
    state: DriverState,
}

impl TimeStepDriver {
    /// Build a driver on a grid whose node statuses are already set.
    ///
    /// Parameters are validated here. Strategies default to D8 routing,
    /// linear diffusion, stream-power erosion and uniform uplift built from
    /// `params`.
    pub fn new(
        grid: RasterGrid,
        elevation: Vec<f64>,
        params: ModelParameters,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        if elevation.len() != grid.n_nodes() {
            return Err(SimulationError::FieldLength {
                expected: grid.n_nodes(),
                found: elevation.len(),
            });
        }
        let spacing_mismatch = (grid.spacing() - params.cell_size).abs();
        if spacing_mismatch > 1e-9 * params.cell_size {
            warn!(
                grid_spacing = grid.spacing(),
                cell_size = params.cell_size,
                "raster spacing differs from configured cell size; using raster spacing"
            );
        }

        let n_nodes = grid.n_nodes();
        let window = ErosionWindow::new(n_nodes, params.n_steps(), params.window_steps);
        Ok(Self {
            hillslope: Box::new(params.diffuser()),
            fluvial: Box::new(params.eroder()),
            uplift: Box::new(params.uplift()),
            router: Box::new(D8Router),
            initial_elevation: elevation.clone(),
            elevation,
            grid,
            params,
            routing: None,
            window,
            budget: ProcessBudget::new(n_nodes),
            state: DriverState::Initializing,
        })
    }

    /// Apply the parameters' boundary policy to `grid`, then build the driver.
    pub fn from_parameters(
        mut grid: RasterGrid,
        elevation: Vec<f64>,
        params: ModelParameters,
    ) -> Result<Self, SimulationError> {
        params.boundary.apply(&mut grid);
        Self::new(grid, elevation, params)
    }

    /// Replace the flow router.
    pub fn with_router(mut self, router: impl FlowRouter + 'static) -> Self {
        self.router = Box::new(router);
        self
    }

    /// Replace the hillslope process.
    pub fn with_hillslope(mut self, process: impl SurfaceProcess + 'static) -> Self {
        self.hillslope = Box::new(process);
        self
    }

    /// Replace the fluvial process.
    pub fn with_fluvial(mut self, process: impl SurfaceProcess + 'static) -> Self {
        self.fluvial = Box::new(process);
        self
    }

    /// Replace the uplift process.
    pub fn with_uplift(mut self, process: impl SurfaceProcess + 'static) -> Self {
        self.uplift = Box::new(process);
        self
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    pub fn grid(&self) -> &RasterGrid {
        &self.grid
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Current elevation (m).
    pub fn elevation(&self) -> &[f64] {
        &self.elevation
    }

    /// Elevation the driver was built with (m).
    pub fn initial_elevation(&self) -> &[f64] {
        &self.initial_elevation
    }

    /// Flow routing of the most recent step.
    pub fn routing(&self) -> Option<&FlowRouting> {
        self.routing.as_ref()
    }

    /// Drainage area of the most recent step (m²).
    pub fn drainage_area(&self) -> Option<&[f64]> {
        self.routing.as_ref().map(|r| r.drainage_area.as_slice())
    }

    /// Trailing-window accumulator.
    pub fn window(&self) -> &ErosionWindow {
        &self.window
    }

    /// Window-average rate of elevation change (m/yr) once the run is done.
    pub fn erosion_rate(&self) -> &[f64] {
        self.window.cumulative()
    }

    /// Per-process elevation change over the run.
    pub fn budget(&self) -> &ProcessBudget {
        &self.budget
    }

    /// Run every step.
    pub fn run(&mut self) -> Result<SimulationResult, SimulationError> {
        self.run_with_callback(|_| {})
    }

    /// Run every step, calling `callback` at each progress report.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<SimulationResult, SimulationError>
    where
        F: FnMut(&StepProgress),
    {
        if self.state != DriverState::Initializing {
            return Err(SimulationError::InvalidState(self.state));
        }

        let n_steps = self.params.n_steps();
        let dt = self.params.dt;
        let report_interval = self.params.report_interval;
        let initial = FieldStatistics::over_core_nodes(&self.grid, &self.elevation);

        info!(
            grid = %self.grid.shape(),
            core_nodes = self.grid.n_core_nodes(),
            n_steps,
            dt,
            window_steps = self.window.window_steps(),
            router = self.router.name(),
            hillslope = self.hillslope.name(),
            fluvial = self.fluvial.name(),
            "starting run"
        );

        let mut reporter = ProgressReporter::new(n_steps);
        self.state = DriverState::Stepping;

        for step in 0..n_steps {
            let in_window = self.window.contains(step);
            if in_window && self.state == DriverState::Stepping {
                debug!(step, "entering trailing window");
                self.state = DriverState::WindowedAccumulating;
            }

            self.advance(in_window, dt)?;
            reporter.step();

            if step % report_interval == 0 {
                let years = (step + 1) as f64 * dt;
                let mean = FieldStatistics::over_core_nodes(&self.grid, &self.elevation).mean;
                reporter.report(step, years, mean);

                let drainage_area = self.drainage_area().unwrap_or(&[]);
                callback(&StepProgress {
                    step,
                    n_steps,
                    years,
                    elevation: &self.elevation,
                    drainage_area,
                    in_window,
                });
            }
        }

        self.window.finalize(dt);
        self.state = DriverState::Done;

        let result = SimulationResult {
            n_steps,
            simulated_years: n_steps as f64 * dt,
            window_steps: self.window.steps_recorded(),
            wall_time: reporter.elapsed(),
            initial,
            final_state: FieldStatistics::over_core_nodes(&self.grid, &self.elevation),
            erosion_rate: FieldStatistics::over_core_nodes(&self.grid, self.window.cumulative()),
        };
        info!(
            hillslope_m3 = self.budget.volume(BudgetTerm::Hillslope, &self.grid),
            fluvial_m3 = self.budget.volume(BudgetTerm::Fluvial, &self.grid),
            uplift_m3 = self.budget.volume(BudgetTerm::Uplift, &self.grid),
            "run complete: {}",
            result.summary_line()
        );
        Ok(result)
    }

    /// One time step.
    fn advance(&mut self, in_window: bool, dt: f64) -> Result<(), SimulationError> {
        let pre = in_window.then(|| self.elevation.clone());
        let ctx = ProcessContext::new(&self.grid, dt);

        let delta = self.hillslope.apply(&mut self.elevation, &ctx)?;
        self.budget.add(BudgetTerm::Hillslope, &delta);

        let routing = self.router.route(&self.elevation, &self.grid)?;
        let delta = self
            .fluvial
            .apply(&mut self.elevation, &ctx.with_routing(&routing))?;
        self.budget.add(BudgetTerm::Fluvial, &delta);

        if let Some(pre) = pre {
            self.window.record(&pre, &self.elevation);
        }

        let delta = self.uplift.apply(&mut self.elevation, &ctx)?;
        self.budget.add(BudgetTerm::Uplift, &delta);

        self.routing = Some(routing);
        Ok(())
    }
}
