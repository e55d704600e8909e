//! Time stepping and run diagnostics.
//!
//! - [`TimeStepDriver`]: fixed-step loop over diffusion, routing, fluvial
//!   erosion and uplift
//! - [`ErosionWindow`]: trailing-window rate of elevation change
//! - [`ProgressReporter`], [`ProcessBudget`], [`SimulationResult`]

mod accumulator;
mod diagnostics;
mod driver;

pub use accumulator::ErosionWindow;
pub use diagnostics::{BudgetTerm, ProcessBudget, ProgressReporter, SimulationResult};
pub use driver::{DriverState, SimulationError, StepProgress, TimeStepDriver};
