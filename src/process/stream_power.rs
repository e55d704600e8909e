//! Detachment-limited stream-power erosion.
//!
//! E = max(K·A^m·S^n − θ, 0), solved implicitly from base level upstream so
//! each receiver is final before its donors are visited. For n = 1 the
//! update is closed form; otherwise the per-node residual
//!
//! ```text
//! x + β·xⁿ = x₀ + θ·dt,   x = z − z_r,   β = K·A^m·dt / Lⁿ
//! ```
//!
//! is solved by Newton iteration. A node never drops below its receiver and
//! never rises (no deposition).

use super::traits::{ProcessContext, ProcessError, SurfaceProcess};

/// Newton iteration cap for n ≠ 1.
const MAX_NEWTON_ITERATIONS: usize = 100;

/// Relative convergence tolerance for the Newton update.
const NEWTON_TOLERANCE: f64 = 1e-12;

/// Stream-power fluvial eroder.
#[derive(Clone, Copy, Debug)]
pub struct StreamPowerEroder {
    /// Erodibility K (units depend on m)
    k_sp: f64,
    /// Drainage area exponent
    m_sp: f64,
    /// Slope exponent
    n_sp: f64,
    /// Erosion threshold θ (m/yr)
    threshold: f64,
}

impl Default for StreamPowerEroder {
    fn default() -> Self {
        Self {
            k_sp: 0.0,
            m_sp: 0.5,
            n_sp: 1.0,
            threshold: 0.0,
        }
    }
}

impl StreamPowerEroder {
    /// Create an eroder with erodibility `K` and the default exponents
    /// (m = 0.5, n = 1, no threshold).
    pub fn new(k_sp: f64) -> Self {
        Self {
            k_sp,
            ..Default::default()
        }
    }

    /// Set the exponents m and n.
    pub fn with_exponents(mut self, m_sp: f64, n_sp: f64) -> Self {
        self.m_sp = m_sp;
        self.n_sp = n_sp;
        self
    }

    /// Set the erosion threshold (m/yr).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn k_sp(&self) -> f64 {
        self.k_sp
    }

    pub fn m_sp(&self) -> f64 {
        self.m_sp
    }

    pub fn n_sp(&self) -> f64 {
        self.n_sp
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Solve x + β·xⁿ = c for x in (0, x0], given β·x0ⁿ > c − x0.
    fn solve_drop(&self, node: usize, beta: f64, x0: f64, c: f64) -> Result<f64, ProcessError> {
        let n = self.n_sp;
        let mut x = x0;
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let f = x + beta * x.powf(n) - c;
            let df = 1.0 + n * beta * x.powf(n - 1.0);
            let mut next = x - f / df;
            if next <= 0.0 {
                next = 0.5 * x;
            }
            if (next - x).abs() <= NEWTON_TOLERANCE * x0.max(1.0) {
                return Ok(next.min(x0));
            }
            x = next;
        }
        Err(ProcessError::NonConvergence {
            process: self.name(),
            node,
            iterations: MAX_NEWTON_ITERATIONS,
        })
    }
}

impl SurfaceProcess for StreamPowerEroder {
    fn name(&self) -> &'static str {
        "stream_power"
    }

    fn is_active(&self) -> bool {
        self.k_sp > 0.0
    }

    fn compute(&self, elevation: &[f64], ctx: &ProcessContext) -> Result<Vec<f64>, ProcessError> {
        ctx.check_field("elevation", elevation)?;
        let routing = ctx
            .routing
            .ok_or(ProcessError::MissingRouting { process: self.name() })?;
        ctx.check_field("drainage_area", &routing.drainage_area)?;

        let grid = ctx.grid;
        let dt = ctx.dt;
        let mut delta = vec![0.0; elevation.len()];
        if !self.is_active() || dt <= 0.0 {
            return Ok(delta);
        }

        let linear = (self.n_sp - 1.0).abs() < f64::EPSILON;
        let mut z = elevation.to_vec();

        for &node in &routing.stack {
            let receiver = routing.receivers[node];
            if receiver == node || !grid.is_core(node) {
                continue;
            }

            let z_old = z[node];
            let z_r = z[receiver];
            let x0 = z_old - z_r;
            if x0 <= 0.0 {
                continue;
            }

            let length = routing.receiver_distance[node];
            let area_term = self.k_sp * routing.drainage_area[node].powf(self.m_sp) * dt;

            let z_new = if linear {
                let alpha = area_term / length;
                let z_new = (z_old + alpha * z_r + self.threshold * dt) / (1.0 + alpha);
                z_new.min(z_old)
            } else {
                let beta = area_term / length.powf(self.n_sp);
                let c = x0 + self.threshold * dt;
                if beta * x0.powf(self.n_sp) <= self.threshold * dt {
                    z_old
                } else {
                    z_r + self.solve_drop(node, beta, x0, c)?
                }
            };

            z[node] = z_new;
            delta[node] = z_new - elevation[node];
        }

        Ok(delta)
    }
}
