//! State discretization.
//!
//! Maps an agent's continuous perception (own position, goal, visible
//! entities) onto the finite symbolic vocabulary indexed by the Q-table.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::Position;

/// Compass direction of a target relative to an observer.
///
/// North is `+y`. [`Direction::Here`] is reported for coincident points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    Here,
}

impl Direction {
    /// Octant of the vector from `from` to `to`.
    ///
    /// The angle is taken from the reversed vector and offset by 180°, which
    /// yields the forward angle in `(0, 360]`. Octants are 45° wide and
    /// upper-inclusive, so a boundary angle falls into the lower-angle octant.
    pub fn between(from: &Position, to: &Position) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0.0 && dy == 0.0 {
            return Direction::Here;
        }
        let angle = (-dy).atan2(-dx).to_degrees() + 180.0;

        if angle > 337.5 || angle <= 22.5 {
            Direction::E
        } else if angle <= 67.5 {
            Direction::NE
        } else if angle <= 112.5 {
            Direction::N
        } else if angle <= 157.5 {
            Direction::NW
        } else if angle <= 202.5 {
            Direction::W
        } else if angle <= 247.5 {
            Direction::SW
        } else if angle <= 292.5 {
            Direction::S
        } else if angle <= 337.5 {
            Direction::SE
        } else {
            // NaN coordinates
            Direction::Here
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
            Direction::Here => "HERE",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete state key, e.g. `"3x5_goal_NE_threat_W"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StateKey(String);

impl StateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StateKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StateKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds discrete state keys from continuous perceptions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateCodec {
    /// Cell edge length used to round positions.
    pub resolution: f64,
}

impl StateCodec {
    /// Default cell edge length (one world unit).
    pub const DEFAULT_RESOLUTION: f64 = 1.0;

    pub fn new(resolution: f64) -> Self {
        Self { resolution }
    }

    /// Discretizes a perception into a state key.
    ///
    /// The key combines the rounded grid cell, the goal octant and the octant
    /// of the nearest visible entity (`none` when nothing is visible).
    /// Equidistant entities resolve to the first one in `others`.
    pub fn discretize(&self, position: &Position, goal: &Position, others: &[Position]) -> StateKey {
        let resolution = if self.resolution > 0.0 {
            self.resolution
        } else {
            Self::DEFAULT_RESOLUTION
        };
        let cell_x = (position.x / resolution).round() as i64;
        let cell_y = (position.y / resolution).round() as i64;

        let goal_dir = Direction::between(position, goal);

        let mut nearest: Option<&Position> = None;
        let mut min_dist_sq = f64::INFINITY;
        for other in others {
            let d = position.distance_sq_to(other);
            if d < min_dist_sq {
                min_dist_sq = d;
                nearest = Some(other);
            }
        }
        let threat = match nearest {
            Some(entity) => Direction::between(position, entity).as_str(),
            None => "none",
        };

        StateKey(format!("{cell_x}x{cell_y}_goal_{goal_dir}_threat_{threat}"))
    }
}

impl Default for StateCodec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RESOLUTION)
    }
}

/// Discretizes with the default one-unit resolution.
pub fn discretize(position: &Position, goal: &Position, others: &[Position]) -> StateKey {
    StateCodec::default().discretize(position, goal, others)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_angle(deg: f64) -> Position {
        let r = deg.to_radians();
        Position::new(r.cos() * 2.0, r.sin() * 2.0)
    }

    #[test]
    fn compass_angles_map_to_octants() {
        let origin = Position::origin();
        let expected = [
            (0.0, Direction::E),
            (45.0, Direction::NE),
            (90.0, Direction::N),
            (135.0, Direction::NW),
            (180.0, Direction::W),
            (225.0, Direction::SW),
            (270.0, Direction::S),
            (315.0, Direction::SE),
        ];
        for (deg, dir) in expected {
            assert_eq!(Direction::between(&origin, &at_angle(deg)), dir, "{deg}°");
        }
    }

    #[test]
    fn axis_aligned_targets() {
        let o = Position::new(5.0, 5.0);
        assert_eq!(Direction::between(&o, &Position::new(9.0, 5.0)), Direction::E);
        assert_eq!(Direction::between(&o, &Position::new(1.0, 5.0)), Direction::W);
        assert_eq!(Direction::between(&o, &Position::new(5.0, 9.0)), Direction::N);
        assert_eq!(Direction::between(&o, &Position::new(5.0, 1.0)), Direction::S);
    }

    #[test]
    fn zero_vector_is_here() {
        let p = Position::new(0.0, 0.0);
        assert_eq!(Direction::between(&p, &p), Direction::Here);
    }

    #[test]
    fn boundary_resolves_to_lower_octant() {
        let origin = Position::origin();
        let r = 67.5_f64.to_radians();
        // Exactly on the NE/N boundary within float precision.
        let dir = Direction::between(&origin, &Position::new(r.cos(), r.sin()));
        assert!(dir == Direction::NE || dir == Direction::N);
        let dir = Direction::between(&origin, &at_angle(67.0));
        assert_eq!(dir, Direction::NE);
        let dir = Direction::between(&origin, &at_angle(68.0));
        assert_eq!(dir, Direction::N);
    }

    #[test]
    fn key_format() {
        let key = discretize(
            &Position::new(3.2, 4.6),
            &Position::new(8.0, 9.0),
            &[Position::new(1.0, 4.6)],
        );
        assert_eq!(key.as_str(), "3x5_goal_NE_threat_W");
    }

    #[test]
    fn no_visible_entities_is_none() {
        let key = discretize(&Position::new(0.0, 0.0), &Position::new(0.0, 0.0), &[]);
        assert_eq!(key.as_str(), "0x0_goal_HERE_threat_none");
    }

    #[test]
    fn nearest_entity_wins() {
        let key = discretize(
            &Position::new(5.0, 5.0),
            &Position::new(5.0, 9.0),
            &[Position::new(9.0, 5.0), Position::new(5.0, 4.0)],
        );
        assert_eq!(key.as_str(), "5x5_goal_N_threat_S");
    }

    #[test]
    fn tie_keeps_first_entity() {
        let key = discretize(
            &Position::new(5.0, 5.0),
            &Position::new(5.0, 9.0),
            &[Position::new(6.0, 5.0), Position::new(4.0, 5.0)],
        );
        assert!(key.as_str().ends_with("threat_E"));
    }

    #[test]
    fn same_cell_same_key() {
        let goal = Position::new(9.0, 9.0);
        let a = discretize(&Position::new(2.1, 2.9), &goal, &[]);
        let b = discretize(&Position::new(1.8, 3.2), &goal, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn coarser_resolution_merges_cells() {
        let codec = StateCodec::new(2.0);
        let goal = Position::new(9.0, 9.0);
        let key = codec.discretize(&Position::new(3.9, 6.1), &goal, &[]);
        assert!(key.as_str().starts_with("2x3_"));
    }
}
