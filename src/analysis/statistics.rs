//! Summary statistics of node fields.

use std::fmt;

use crate::grid::RasterGrid;

/// Min/max/mean/standard deviation of a field over a set of nodes.
///
/// An empty node set gives `count == 0` and NaN statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStatistics {
    /// Number of nodes included
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl FieldStatistics {
    /// Statistics of arbitrary values.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for v in values {
            count += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v;
            sum_sq += v * v;
        }

        if count == 0 {
            return Self {
                count,
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                std_dev: f64::NAN,
            };
        }

        let mean = sum / count as f64;
        let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
        Self {
            count,
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// Statistics of a node field over the core nodes.
    pub fn over_core_nodes(grid: &RasterGrid, field: &[f64]) -> Self {
        Self::from_values(grid.core_nodes().iter().map(|&node| field[node]))
    }

    /// Statistics of a node field over every node.
    pub fn over_all_nodes(field: &[f64]) -> Self {
        Self::from_values(field.iter().copied())
    }

    /// Relief (max − min).
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

impl fmt::Display for FieldStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} min={:.4} max={:.4} mean={:.4} std={:.4}",
            self.count, self.min, self.max, self.mean, self.std_dev
        )
    }
}
