//! Per-side values for the four edges of a raster grid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four grid edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Row 0
    South,
    /// Last column
    East,
    /// Last row
    North,
    /// Column 0
    West,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::South => "south",
            Side::East => "east",
            Side::North => "north",
            Side::West => "west",
        };
        f.write_str(name)
    }
}

/// A value for each grid edge, with named fields.
///
/// Avoids index conventions like `[south, east, north, west]` vs
/// `[top, bottom, left, right]`.
///
/// # Example
///
/// ```
/// use lem_rs::grid::NodeStatus;
/// use lem_rs::types::{Side, SideBoundaries};
///
/// let edges = SideBoundaries::new(
///     NodeStatus::FixedValue, // south
///     NodeStatus::Closed,     // east
///     NodeStatus::FixedValue, // north
///     NodeStatus::Closed,     // west
/// );
///
/// assert_eq!(*edges.get(Side::East), NodeStatus::Closed);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBoundaries<T> {
    /// South edge (row 0)
    pub south: T,
    /// East edge (last column)
    pub east: T,
    /// North edge (last row)
    pub north: T,
    /// West edge (column 0)
    pub west: T,
}

impl<T> SideBoundaries<T> {
    /// Create with explicit values, counterclockwise from the south.
    pub fn new(south: T, east: T, north: T, west: T) -> Self {
        Self {
            south,
            east,
            north,
            west,
        }
    }

    /// Same value on every side.
    pub fn uniform(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            south: value.clone(),
            east: value.clone(),
            north: value.clone(),
            west: value,
        }
    }

    /// Value for one side.
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::South => &self.south,
            Side::East => &self.east,
            Side::North => &self.north,
            Side::West => &self.west,
        }
    }
}

impl<T: fmt::Display> fmt::Display for SideBoundaries<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S:{} E:{} N:{} W:{}",
            self.south, self.east, self.north, self.west
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_side() {
        let sides = SideBoundaries::new(1, 2, 3, 4);
        assert_eq!(*sides.get(Side::South), 1);
        assert_eq!(*sides.get(Side::East), 2);
        assert_eq!(*sides.get(Side::North), 3);
        assert_eq!(*sides.get(Side::West), 4);
    }

    #[test]
    fn test_uniform_and_display() {
        let sides = SideBoundaries::uniform(7);
        assert_eq!(sides.to_string(), "S:7 E:7 N:7 W:7");
    }
}
