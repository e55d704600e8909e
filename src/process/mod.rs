//! Surface processes that change elevation each time step.
//!
//! - [`SurfaceProcess`]: strategy trait returning a per-node change
//! - [`LinearDiffuser`]: hillslope soil creep
//! - [`StreamPowerEroder`]: fluvial incision, needs flow routing
//! - [`UpliftApplicator`]: constant uplift of core nodes

mod diffusion;
mod stream_power;
mod traits;
mod uplift;

pub use diffusion::{DIFFUSION_STABILITY_FACTOR, LinearDiffuser};
pub use stream_power::StreamPowerEroder;
pub use traits::{ProcessContext, ProcessError, SurfaceProcess};
pub use uplift::UpliftApplicator;
