//! Uniform tectonic uplift of core nodes.

use super::traits::{ProcessContext, ProcessError, SurfaceProcess};

/// Adds `rate·dt` to every core node.
#[derive(Clone, Copy, Debug)]
pub struct UpliftApplicator {
    /// Uplift rate (m/yr)
    rate: f64,
}

impl UpliftApplicator {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// Uplift rate (m/yr).
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl SurfaceProcess for UpliftApplicator {
    fn name(&self) -> &'static str {
        "uplift"
    }

    fn is_active(&self) -> bool {
        self.rate != 0.0
    }

    fn compute(&self, elevation: &[f64], ctx: &ProcessContext) -> Result<Vec<f64>, ProcessError> {
        ctx.check_field("elevation", elevation)?;
        let mut delta = vec![0.0; elevation.len()];
        let increment = self.rate * ctx.dt;
        for &node in ctx.grid.core_nodes() {
            delta[node] = increment;
        }
        Ok(delta)
    }
}
