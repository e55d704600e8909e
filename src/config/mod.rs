//! Model parameters.
//!
//! All physical coefficients, time control and the boundary policy of a run
//! live in [`ModelParameters`]. Parameters serialise to JSON; any field
//! missing from a file takes its default.
//!
//! ```
//! use lem_rs::config::ModelParameters;
//!
//! let params = ModelParameters::default()
//!     .with_diffusivity(0.5)
//!     .with_time(2000.0, 10.0);
//! assert_eq!(params.n_steps(), 200);
//! assert!(params.validate().is_ok());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::BoundaryPolicy;
use crate::process::{LinearDiffuser, StreamPowerEroder, UpliftApplicator};

/// Error type for parameter loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A parameter is out of range
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    Invalid {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

// =============================================================================
// Defaults
// =============================================================================

fn default_diffusivity() -> f64 {
    1.0
}
fn default_k_sp() -> f64 {
    0.0
}
fn default_m_sp() -> f64 {
    0.5
}
fn default_n_sp() -> f64 {
    1.0
}
fn default_threshold_sp() -> f64 {
    0.0
}
fn default_uplift_rate() -> f64 {
    0.0012
}
fn default_cell_size() -> f64 {
    3.0
}
fn default_total_time() -> f64 {
    10_000.0
}
fn default_dt() -> f64 {
    10.0
}
fn default_window_steps() -> usize {
    100
}
fn default_report_interval() -> usize {
    200
}

// =============================================================================
// ModelParameters
// =============================================================================

/// Physical and numerical parameters of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Hillslope diffusivity D (m²/yr)
    #[serde(default = "default_diffusivity")]
    pub diffusivity: f64,
    /// Stream-power erodibility K
    #[serde(default = "default_k_sp")]
    pub k_sp: f64,
    /// Drainage area exponent m
    #[serde(default = "default_m_sp")]
    pub m_sp: f64,
    /// Slope exponent n
    #[serde(default = "default_n_sp")]
    pub n_sp: f64,
    /// Erosion threshold (m/yr)
    #[serde(default = "default_threshold_sp")]
    pub threshold_sp: f64,
    /// Uplift rate of core nodes (m/yr)
    #[serde(default = "default_uplift_rate")]
    pub uplift_rate: f64,
    /// Expected raster cell size (m)
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
    /// Simulated span (yr)
    #[serde(default = "default_total_time")]
    pub total_time: f64,
    /// Time step (yr)
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Number of trailing steps averaged into the erosion rate
    #[serde(default = "default_window_steps")]
    pub window_steps: usize,
    /// Steps between progress reports
    #[serde(default = "default_report_interval")]
    pub report_interval: usize,
    /// Edge statuses applied to the loaded grid
    #[serde(default)]
    pub boundary: BoundaryPolicy,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            diffusivity: default_diffusivity(),
            k_sp: default_k_sp(),
            m_sp: default_m_sp(),
            n_sp: default_n_sp(),
            threshold_sp: default_threshold_sp(),
            uplift_rate: default_uplift_rate(),
            cell_size: default_cell_size(),
            total_time: default_total_time(),
            dt: default_dt(),
            window_steps: default_window_steps(),
            report_interval: default_report_interval(),
            boundary: BoundaryPolicy::default(),
        }
    }
}

impl ModelParameters {
    /// Set the hillslope diffusivity (m²/yr).
    pub fn with_diffusivity(mut self, diffusivity: f64) -> Self {
        self.diffusivity = diffusivity;
        self
    }

    /// Set the stream-power law: `E = K·A^m·S^n`.
    pub fn with_stream_power(mut self, k_sp: f64, m_sp: f64, n_sp: f64) -> Self {
        self.k_sp = k_sp;
        self.m_sp = m_sp;
        self.n_sp = n_sp;
        self
    }

    /// Set the stream-power erosion threshold (m/yr).
    pub fn with_threshold(mut self, threshold_sp: f64) -> Self {
        self.threshold_sp = threshold_sp;
        self
    }

    /// Set the uplift rate (m/yr).
    pub fn with_uplift_rate(mut self, uplift_rate: f64) -> Self {
        self.uplift_rate = uplift_rate;
        self
    }

    /// Set the expected raster cell size (m).
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the simulated span and time step (yr).
    pub fn with_time(mut self, total_time: f64, dt: f64) -> Self {
        self.total_time = total_time;
        self.dt = dt;
        self
    }

    /// Set the trailing accumulation window (steps).
    pub fn with_window_steps(mut self, window_steps: usize) -> Self {
        self.window_steps = window_steps;
        self
    }

    /// Set the progress report interval (steps).
    pub fn with_report_interval(mut self, report_interval: usize) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Set the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Number of time steps: `floor(total_time / dt)`.
    pub fn n_steps(&self) -> usize {
        // Tolerate ratios like 0.3 / 0.1 landing just below an integer
        let ratio = self.total_time / self.dt;
        (ratio * (1.0 + 1e-12)).floor() as usize
    }

    /// Number of steps inside the trailing window.
    pub fn effective_window_steps(&self) -> usize {
        self.window_steps.min(self.n_steps())
    }

    /// Index of the first step inside the trailing window.
    pub fn window_start(&self) -> usize {
        self.n_steps() - self.effective_window_steps()
    }

    /// Length of the trailing window (yr).
    pub fn window_years(&self) -> f64 {
        self.effective_window_steps() as f64 * self.dt
    }

    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("diffusivity", self.diffusivity),
            ("k_sp", self.k_sp),
            ("m_sp", self.m_sp),
            ("n_sp", self.n_sp),
            ("threshold_sp", self.threshold_sp),
            ("uplift_rate", self.uplift_rate),
            ("cell_size", self.cell_size),
            ("total_time", self.total_time),
            ("dt", self.dt),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(name, value, "must be finite"));
            }
        }

        for (name, value) in [
            ("diffusivity", self.diffusivity),
            ("k_sp", self.k_sp),
            ("m_sp", self.m_sp),
            ("threshold_sp", self.threshold_sp),
        ] {
            if value < 0.0 {
                return Err(invalid(name, value, "must be non-negative"));
            }
        }

        for (name, value) in [
            ("n_sp", self.n_sp),
            ("cell_size", self.cell_size),
            ("dt", self.dt),
        ] {
            if value <= 0.0 {
                return Err(invalid(name, value, "must be positive"));
            }
        }

        if self.total_time < self.dt {
            return Err(invalid(
                "total_time",
                self.total_time,
                "must cover at least one time step",
            ));
        }
        if self.window_steps == 0 {
            return Err(invalid("window_steps", 0.0, "must be at least 1"));
        }
        if self.report_interval == 0 {
            return Err(invalid("report_interval", 0.0, "must be at least 1"));
        }
        Ok(())
    }

    /// Hillslope process for these parameters.
    pub fn diffuser(&self) -> LinearDiffuser {
        LinearDiffuser::new(self.diffusivity)
    }

    /// Fluvial process for these parameters.
    pub fn eroder(&self) -> StreamPowerEroder {
        StreamPowerEroder::new(self.k_sp)
            .with_exponents(self.m_sp, self.n_sp)
            .with_threshold(self.threshold_sp)
    }

    /// Uplift for these parameters.
    pub fn uplift(&self) -> UpliftApplicator {
        UpliftApplicator::new(self.uplift_rate)
    }

    /// Load parameters from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save parameters to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::NodeStatus;
    use crate::process::SurfaceProcess;
    use crate::types::Side;
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let p = ModelParameters::default();
        assert_eq!(p.n_steps(), 1000);
        assert_eq!(p.window_start(), 900);
        assert_eq!(p.window_years(), 1000.0);
        assert_eq!(p.boundary.status_for(Side::East), NodeStatus::Closed);
        assert!(p.validate().is_ok());
        assert!(!p.eroder().is_active());
    }

    #[test]
    fn test_n_steps_floors() {
        assert_eq!(ModelParameters::default().with_time(105.0, 10.0).n_steps(), 10);
        assert_eq!(ModelParameters::default().with_time(0.3, 0.1).n_steps(), 3);
    }

    #[test]
    fn test_window_clamped_to_run() {
        let p = ModelParameters::default().with_time(100.0, 10.0);
        assert_eq!(p.effective_window_steps(), 10);
        assert_eq!(p.window_start(), 0);
        assert_eq!(p.window_years(), 100.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = ModelParameters::default();
        let cases = [
            base.clone().with_diffusivity(-1.0),
            base.clone().with_stream_power(-1e-5, 0.5, 1.0),
            base.clone().with_stream_power(1e-5, 0.5, 0.0),
            base.clone().with_time(10_000.0, 0.0),
            base.clone().with_time(5.0, 10.0),
            base.clone().with_cell_size(0.0),
            base.clone().with_uplift_rate(f64::NAN),
            base.clone().with_window_steps(0),
            base.clone().with_report_interval(0),
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(ConfigError::Invalid { .. })),
                "{:?}",
                params
            );
        }
    }

    #[test]
    fn test_negative_uplift_allowed() {
        let p = ModelParameters::default().with_uplift_rate(-0.001);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let params = ModelParameters::default()
            .with_stream_power(1e-4, 0.4, 1.2)
            .with_boundary(BoundaryPolicy::all_fixed());
        params.to_json_file(file.path()).unwrap();

        let loaded = ModelParameters::from_json_file(file.path()).unwrap();
        assert_relative_eq!(loaded.k_sp, params.k_sp);
        assert_relative_eq!(loaded.m_sp, params.m_sp);
        assert_relative_eq!(loaded.n_sp, params.n_sp);
        assert_relative_eq!(loaded.uplift_rate, params.uplift_rate);
        assert_eq!(loaded.window_steps, params.window_steps);
        assert_eq!(loaded.boundary, params.boundary);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let p: ModelParameters = serde_json::from_str(r#"{"diffusivity": 0.25}"#).unwrap();
        assert_eq!(p.diffusivity, 0.25);
        assert_eq!(p.dt, 10.0);
        assert_eq!(p.boundary, BoundaryPolicy::single_ridge());
    }
}
