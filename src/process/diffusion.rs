//! Linear hillslope diffusion.
//!
//! dz/dt = D ∇²z on the four-connected links of the grid. Flux only
//! crosses active links (both ends open, at least one end core), so closed
//! nodes act as no-flux walls and fixed-value nodes as Dirichlet values.
//!
//! The explicit update is sub-stepped with dt_sub ≤ 0.2·dx²/D, inside the
//! 0.25 limit of the five-point stencil, so the scheme is monotone.

use tracing::debug;

use super::traits::{ProcessContext, ProcessError, SurfaceProcess};

/// Fraction of dx²/D used as the stable sub-step.
pub const DIFFUSION_STABILITY_FACTOR: f64 = 0.2;

/// Linear diffusion of elevation with constant diffusivity.
#[derive(Clone, Copy, Debug)]
pub struct LinearDiffuser {
    /// Diffusivity D (m²/yr)
    diffusivity: f64,
}

impl LinearDiffuser {
    /// Create a diffuser with diffusivity `D` (m²/yr).
    pub fn new(diffusivity: f64) -> Self {
        Self { diffusivity }
    }

    /// Diffusivity (m²/yr).
    pub fn diffusivity(&self) -> f64 {
        self.diffusivity
    }

    /// Largest stable explicit step for spacing `dx` (yr).
    pub fn stable_dt(&self, dx: f64) -> f64 {
        DIFFUSION_STABILITY_FACTOR * dx * dx / self.diffusivity
    }

    /// Number of equal sub-steps needed to cover `dt`.
    pub fn n_substeps(&self, dt: f64, dx: f64) -> usize {
        if !self.is_active() || dt <= 0.0 {
            return 0;
        }
        ((dt / self.stable_dt(dx)).ceil() as usize).max(1)
    }
}

impl SurfaceProcess for LinearDiffuser {
    fn name(&self) -> &'static str {
        "linear_diffusion"
    }

    fn is_active(&self) -> bool {
        self.diffusivity > 0.0
    }

    fn compute(&self, elevation: &[f64], ctx: &ProcessContext) -> Result<Vec<f64>, ProcessError> {
        ctx.check_field("elevation", elevation)?;
        let grid = ctx.grid;
        let n_sub = self.n_substeps(ctx.dt, grid.spacing());
        if n_sub == 0 {
            return Ok(vec![0.0; elevation.len()]);
        }

        let sub_dt = ctx.dt / n_sub as f64;
        let coeff = self.diffusivity * sub_dt / grid.cell_area();
        debug!(substeps = n_sub, sub_dt, "diffusion sub-stepping");

        let mut z = elevation.to_vec();
        let mut dz = vec![0.0; z.len()];
        for _ in 0..n_sub {
            for &node in grid.core_nodes() {
                let mut sum = 0.0;
                for neighbor in grid.neighbors4(node).into_iter().flatten() {
                    if grid.is_active_link(node, neighbor) {
                        sum += z[neighbor] - z[node];
                    }
                }
                dz[node] = coeff * sum;
            }
            for &node in grid.core_nodes() {
                z[node] += dz[node];
            }
        }

        let mut delta = vec![0.0; z.len()];
        for &node in grid.core_nodes() {
            delta[node] = z[node] - elevation[node];
        }
        Ok(delta)
    }
}
