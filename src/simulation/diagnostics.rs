//! Run diagnostics: progress reporting, per-process budgets and the run
//! summary.

use std::time::Instant;

use tracing::info;

use crate::analysis::FieldStatistics;
use crate::grid::RasterGrid;

// =============================================================================
// Progress Reporter
// =============================================================================

/// Step-based progress reporter.
///
/// Each report is a `tracing` info event with percentage, simulated time,
/// elapsed wall time, ETA and throughput.
#[derive(Debug)]
pub struct ProgressReporter {
    start_instant: Instant,
    /// Steps in the whole run
    total_steps: usize,
    /// Steps completed
    n_steps: usize,
}

impl ProgressReporter {
    pub fn new(total_steps: usize) -> Self {
        Self {
            start_instant: Instant::now(),
            total_steps,
            n_steps: 0,
        }
    }

    /// Record a completed step.
    pub fn step(&mut self) {
        self.n_steps += 1;
    }

    /// Steps completed so far.
    pub fn steps_done(&self) -> usize {
        self.n_steps
    }

    /// Completed fraction in percent.
    pub fn percent(&self) -> f64 {
        if self.total_steps == 0 {
            100.0
        } else {
            100.0 * self.n_steps as f64 / self.total_steps as f64
        }
    }

    /// Emit a progress event.
    pub fn report(&self, step: usize, years: f64, mean_elevation: f64) {
        let elapsed = self.start_instant.elapsed().as_secs_f64();
        let pct = self.percent();

        let eta = if pct > 0.1 && pct < 100.0 {
            format_duration(elapsed * 100.0 / pct - elapsed)
        } else {
            "-".to_string()
        };
        let steps_per_sec = if elapsed > 0.0 {
            self.n_steps as f64 / elapsed
        } else {
            0.0
        };

        info!(
            step,
            years,
            mean_elevation,
            "[{:>5.1}%] elapsed={} | ETA={} | {:.0} steps/s",
            pct,
            format_duration(elapsed),
            eta,
            steps_per_sec
        );
    }

    /// Wall time since creation (s).
    pub fn elapsed(&self) -> f64 {
        self.start_instant.elapsed().as_secs_f64()
    }
}

/// Format a duration in seconds as a short human-readable string.
pub(crate) fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        format!("{:.0}m{:.0}s", mins, secs - mins * 60.0)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs - hours * 3600.0) / 60.0).floor();
        format!("{:.0}h{:.0}m", hours, mins)
    }
}

// =============================================================================
// Process Budget
// =============================================================================

/// Contribution tracked in a [`ProcessBudget`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BudgetTerm {
    Hillslope,
    Fluvial,
    Uplift,
}

/// Per-node elevation change attributed to each process over a whole run.
#[derive(Clone, Debug)]
pub struct ProcessBudget {
    hillslope: Vec<f64>,
    fluvial: Vec<f64>,
    uplift: Vec<f64>,
}

impl ProcessBudget {
    pub fn new(n_nodes: usize) -> Self {
        Self {
            hillslope: vec![0.0; n_nodes],
            fluvial: vec![0.0; n_nodes],
            uplift: vec![0.0; n_nodes],
        }
    }

    /// Add one step's change for a process.
    pub fn add(&mut self, term: BudgetTerm, delta: &[f64]) {
        for (acc, d) in self.term_mut(term).iter_mut().zip(delta) {
            *acc += d;
        }
    }

    /// Accumulated change for a process (m).
    pub fn get(&self, term: BudgetTerm) -> &[f64] {
        match term {
            BudgetTerm::Hillslope => &self.hillslope,
            BudgetTerm::Fluvial => &self.fluvial,
            BudgetTerm::Uplift => &self.uplift,
        }
    }

    /// Sum of all processes per node (m).
    pub fn net(&self) -> Vec<f64> {
        self.hillslope
            .iter()
            .zip(&self.fluvial)
            .zip(&self.uplift)
            .map(|((h, f), u)| h + f + u)
            .collect()
    }

    /// Volume change of one process over the core cells (m³).
    pub fn volume(&self, term: BudgetTerm, grid: &RasterGrid) -> f64 {
        let values = self.get(term);
        grid.core_nodes().iter().map(|&node| values[node]).sum::<f64>() * grid.cell_area()
    }

    fn term_mut(&mut self, term: BudgetTerm) -> &mut Vec<f64> {
        match term {
            BudgetTerm::Hillslope => &mut self.hillslope,
            BudgetTerm::Fluvial => &mut self.fluvial,
            BudgetTerm::Uplift => &mut self.uplift,
        }
    }
}

// =============================================================================
// Simulation Result
// =============================================================================

/// Summary of a completed run.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Time steps taken
    pub n_steps: usize,
    /// Simulated span (yr)
    pub simulated_years: f64,
    /// Steps averaged into the erosion rate
    pub window_steps: usize,
    /// Wall-clock time (s)
    pub wall_time: f64,
    /// Core-node elevation before the run
    pub initial: FieldStatistics,
    /// Core-node elevation after the run
    pub final_state: FieldStatistics,
    /// Core-node window-average rate of change (m/yr)
    pub erosion_rate: FieldStatistics,
}

impl SimulationResult {
    /// Change of mean core elevation over the run (m).
    pub fn mean_elevation_change(&self) -> f64 {
        self.final_state.mean - self.initial.mean
    }

    /// One-line summary for logs.
    pub fn summary_line(&self) -> String {
        format!(
            "{} steps, {} yr in {} | mean z {:.3} -> {:.3} m | window rate mean {:.3e} m/yr",
            self.n_steps,
            self.simulated_years,
            format_duration(self.wall_time),
            self.initial.mean,
            self.final_state.mean,
            self.erosion_rate.mean
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridShape;
    use approx::assert_relative_eq;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30.0s");
        assert_eq!(format_duration(90.0), "1m30s");
        assert_eq!(format_duration(3700.0), "1h1m");
    }

    #[test]
    fn test_reporter_percent() {
        let mut reporter = ProgressReporter::new(4);
        assert_eq!(reporter.percent(), 0.0);
        reporter.step();
        assert_eq!(reporter.percent(), 25.0);
        assert_eq!(reporter.steps_done(), 1);
        assert_eq!(ProgressReporter::new(0).percent(), 100.0);
    }

    #[test]
    fn test_budget_terms_and_volume() {
        let grid = RasterGrid::new(GridShape::new(3, 4), 2.0);
        let mut budget = ProcessBudget::new(12);
        let mut uplift = vec![0.0; 12];
        uplift[5] = 0.5;
        uplift[6] = 0.5;
        budget.add(BudgetTerm::Uplift, &uplift);
        budget.add(BudgetTerm::Uplift, &uplift);
        let mut hill = vec![0.0; 12];
        hill[5] = -0.25;
        budget.add(BudgetTerm::Hillslope, &hill);

        assert_eq!(budget.get(BudgetTerm::Uplift)[5], 1.0);
        assert_eq!(budget.net()[5], 0.75);
        assert_eq!(budget.net()[6], 1.0);
        assert!(budget.get(BudgetTerm::Fluvial).iter().all(|&v| v == 0.0));
        assert_relative_eq!(budget.volume(BudgetTerm::Uplift, &grid), 8.0);
    }

    #[test]
    fn test_result_summary() {
        let result = SimulationResult {
            n_steps: 10,
            simulated_years: 100.0,
            window_steps: 10,
            wall_time: 0.5,
            initial: FieldStatistics::from_values([1.0, 3.0]),
            final_state: FieldStatistics::from_values([1.5, 3.5]),
            erosion_rate: FieldStatistics::from_values([0.0]),
        };
        assert_relative_eq!(result.mean_elevation_change(), 0.5);
        assert!(result.summary_line().starts_with("10 steps, 100 yr"));
    }
}
