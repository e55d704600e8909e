//! Flow routing: drainage directions, stack order and drainage area.
//!
//! - [`FlowRouter`]: strategy trait, recomputed every time step
//! - [`D8Router`]: steepest descent over eight neighbours
//! - [`FlowRouting`]: receivers, slopes, stack and drainage area

mod d8;
mod routing;

pub use d8::D8Router;
pub use routing::{FlowError, FlowRouter, FlowRouting};
