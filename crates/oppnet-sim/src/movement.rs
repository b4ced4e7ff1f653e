//! Movement model seam.
//!
//! Waypoint generation and kinematic integration are outside this core;
//! the simulation only polls a node's movement model once per tick for its
//! position and activity flag. The two implementations here are the
//! minimum needed by tests and demos.

use std::collections::VecDeque;

use oppnet_core::Coord;

/// Source of a node's position and activity, polled once per tick.
pub trait MovementModel {
    /// Advance the model by `dt` seconds.
    fn advance(&mut self, dt: f64);

    /// Current position.
    fn location(&self) -> Coord;

    /// Whether the node is switched on.
    fn is_active(&self) -> bool {
        true
    }
}

/// A node that never moves.
#[derive(Clone, Debug)]
pub struct Stationary {
    location: Coord,
    active: bool,
}

impl Stationary {
    /// An active node pinned at `location`.
    #[must_use]
    pub fn new(location: Coord) -> Self {
        Self {
            location,
            active: true,
        }
    }

    /// An inactive node pinned at `location`.
    #[must_use]
    pub fn inactive(location: Coord) -> Self {
        Self {
            location,
            active: false,
        }
    }
}

impl MovementModel for Stationary {
    fn advance(&mut self, _dt: f64) {}

    fn location(&self) -> Coord {
        self.location
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// A node that teleports through a fixed list of waypoints, one per tick,
/// then holds its final position.
#[derive(Clone, Debug)]
pub struct Scripted {
    current: Coord,
    upcoming: VecDeque<Coord>,
}

impl Scripted {
    /// Start at `start` and visit `waypoints` on the following ticks.
    #[must_use]
    pub fn new(start: Coord, waypoints: impl IntoIterator<Item = Coord>) -> Self {
        Self {
            current: start,
            upcoming: waypoints.into_iter().collect(),
        }
    }
}

impl MovementModel for Scripted {
    fn advance(&mut self, _dt: f64) {
        if let Some(next) = self.upcoming.pop_front() {
            self.current = next;
        }
    }

    fn location(&self) -> Coord {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_stays_put() {
        let mut m = Stationary::new(Coord::new(3.0, 4.0));
        m.advance(1.0);
        assert_eq!(m.location(), Coord::new(3.0, 4.0));
        assert!(m.is_active());
        assert!(!Stationary::inactive(Coord::default()).is_active());
    }

    #[test]
    fn scripted_walks_waypoints_then_holds() {
        let mut m = Scripted::new(
            Coord::new(0.0, 0.0),
            [Coord::new(1.0, 0.0), Coord::new(2.0, 0.0)],
        );
        assert_eq!(m.location(), Coord::new(0.0, 0.0));
        m.advance(1.0);
        assert_eq!(m.location(), Coord::new(1.0, 0.0));
        m.advance(1.0);
        m.advance(1.0);
        assert_eq!(m.location(), Coord::new(2.0, 0.0));
    }
}
