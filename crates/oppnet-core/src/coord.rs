//! 2D world coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the simulated world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    /// Horizontal position in meters.
    pub x: f64,
    /// Vertical position in meters.
    pub y: f64,
}

impl Coord {
    /// Create a coordinate.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another coordinate.
    #[must_use]
    pub fn distance(&self, other: &Coord) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2},{:.2})", self.x, self.y)
    }
}
