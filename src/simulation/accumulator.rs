//! Trailing-window erosion accumulator.
//!
//! Sums the per-step elevation change from hillslope and fluvial processes
//! (uplift excluded) over the last steps of a run, then converts the sum to
//! an average rate. Negative values are net erosion.

/// Erosion/deposition accumulated over the trailing window of a run.
#[derive(Clone, Debug)]
pub struct ErosionWindow {
    /// First step (0-based) inside the window
    start_step: usize,
    /// Planned window length (steps)
    window_steps: usize,
    /// Steps recorded so far
    steps_recorded: usize,
    /// Change over the most recent recorded step (m)
    instantaneous: Vec<f64>,
    /// Sum of changes, then a rate (m/yr) once finalized
    cumulative: Vec<f64>,
    finalized: bool,
}

impl ErosionWindow {
    /// Window covering the last `window_steps` of `n_steps` steps.
    pub fn new(n_nodes: usize, n_steps: usize, window_steps: usize) -> Self {
        let window_steps = window_steps.min(n_steps);
        Self {
            start_step: n_steps - window_steps,
            window_steps,
            steps_recorded: 0,
            instantaneous: vec![0.0; n_nodes],
            cumulative: vec![0.0; n_nodes],
            finalized: false,
        }
    }

    /// Whether a step index falls inside the window.
    #[inline]
    pub fn contains(&self, step: usize) -> bool {
        step >= self.start_step && step < self.start_step + self.window_steps
    }

    /// First step inside the window.
    pub fn start_step(&self) -> usize {
        self.start_step
    }

    /// Planned window length (steps).
    pub fn window_steps(&self) -> usize {
        self.window_steps
    }

    /// Steps recorded so far.
    pub fn steps_recorded(&self) -> usize {
        self.steps_recorded
    }

    /// Record one step: `instantaneous = post − pre`, added to the sum.
    pub fn record(&mut self, pre: &[f64], post: &[f64]) {
        debug_assert!(!self.finalized, "recording into a finalized window");
        for (((inst, cum), &a), &b) in self
            .instantaneous
            .iter_mut()
            .zip(self.cumulative.iter_mut())
            .zip(pre)
            .zip(post)
        {
            *inst = b - a;
            *cum += *inst;
        }
        self.steps_recorded += 1;
    }

    /// Convert the sum to an average rate over the recorded window.
    ///
    /// Multiplies by `1 / (steps_recorded · dt)`. With nothing recorded the
    /// field stays zero.
    pub fn finalize(&mut self, dt: f64) {
        if self.finalized {
            return;
        }
        if self.steps_recorded > 0 {
            let scale = 1.0 / (self.steps_recorded as f64 * dt);
            for c in &mut self.cumulative {
                *c *= scale;
            }
        }
        self.finalized = true;
    }

    /// Whether [`ErosionWindow::finalize`] has run.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Change over the most recent recorded step (m).
    pub fn instantaneous(&self) -> &[f64] {
        &self.instantaneous
    }

    /// Window sum (m) before finalizing, average rate (m/yr) after.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }
}
