//! Surface process trait and evaluation context.

use thiserror::Error;

use crate::flow::FlowRouting;
use crate::grid::RasterGrid;

/// Error type for surface process evaluation.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Process needs flow routing but none was supplied
    #[error("{process} requires flow routing for the current step")]
    MissingRouting { process: &'static str },

    /// Field does not have one value per grid node
    #[error("{field} has {found} values but grid has {expected} nodes")]
    FieldLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// Implicit solve did not converge at a node
    #[error("{process} did not converge at node {node} after {iterations} iterations")]
    NonConvergence {
        process: &'static str,
        node: usize,
        iterations: usize,
    },
}

/// Everything a process needs besides the elevation field.
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext<'a> {
    /// Grid geometry and node status
    pub grid: &'a RasterGrid,
    /// Flow routing of the current step, if already computed
    pub routing: Option<&'a FlowRouting>,
    /// Time step (yr)
    pub dt: f64,
}

impl<'a> ProcessContext<'a> {
    /// Context without flow routing.
    pub fn new(grid: &'a RasterGrid, dt: f64) -> Self {
        Self {
            grid,
            routing: None,
            dt,
        }
    }

    /// Attach the flow routing of the current step.
    pub fn with_routing(mut self, routing: &'a FlowRouting) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Check that a field has one value per node.
    pub fn check_field(&self, field: &'static str, values: &[f64]) -> Result<(), ProcessError> {
        let expected = self.grid.n_nodes();
        if values.len() == expected {
            Ok(())
        } else {
            Err(ProcessError::FieldLength {
                field,
                expected,
                found: values.len(),
            })
        }
    }
}

/// A process that changes elevation over one time step.
///
/// `compute` returns the per-node elevation change without touching the
/// input; non-core nodes always get zero.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SurfaceProcess: Send + Sync {
    /// Name for logging and budgets.
    fn name(&self) -> &'static str;

    /// Elevation change over `ctx.dt` for the given elevation field.
    fn compute(&self, elevation: &[f64], ctx: &ProcessContext) -> Result<Vec<f64>, ProcessError>;

    /// Whether the process can change anything at all.
    ///
    /// Inactive processes are still called; they just return zeros.
    fn is_active(&self) -> bool {
        true
    }

    /// Compute the change and add it to `elevation`.
    ///
    /// Returns the applied change.
    fn apply(&self, elevation: &mut [f64], ctx: &ProcessContext) -> Result<Vec<f64>, ProcessError> {
        let delta = self.compute(elevation, ctx)?;
        for (z, dz) in elevation.iter_mut().zip(&delta) {
            *z += dz;
        }
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridShape;

    struct Constant(f64);

    impl SurfaceProcess for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }

        fn compute(&self, elevation: &[f64], ctx: &ProcessContext) -> Result<Vec<f64>, ProcessError> {
            ctx.check_field("elevation", elevation)?;
            Ok(vec![self.0 * ctx.dt; elevation.len()])
        }
    }

    #[test]
    fn test_default_apply_adds_delta() {
        let grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        let ctx = ProcessContext::new(&grid, 2.0);
        let mut z = vec![1.0; 9];
        let delta = Constant(0.5).apply(&mut z, &ctx).unwrap();
        assert_eq!(delta, vec![1.0; 9]);
        assert_eq!(z, vec![2.0; 9]);
    }

    #[test]
    fn test_check_field_length() {
        let grid = RasterGrid::new(GridShape::new(3, 3), 1.0);
        let ctx = ProcessContext::new(&grid, 1.0);
        let err = Constant(1.0).compute(&[0.0; 3], &ctx).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::FieldLength {
                expected: 9,
                found: 3,
                ..
            }
        ));
    }
}
