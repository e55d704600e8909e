//! Post-processing of model fields.
//!
//! - [`CrossSection`]: north-south profile through a grid column
//! - [`FieldStatistics`]: min/max/mean summaries

mod profile;
mod statistics;

pub use profile::{CrossSection, ProfileError};
pub use statistics::FieldStatistics;
