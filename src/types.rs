//! Core geometric types shared by the world, the state codec and the agents.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D position in the world domain Ω = [0, size] × [0, size].
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f64; 2]", into = "[f64; 2]"))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin position (0, 0).
    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.distance_sq_to(other).sqrt()
    }

    /// Squared Euclidean distance to another position.
    pub fn distance_sq_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Returns the unit direction vector from `self` toward `target`.
    ///
    /// Returns `(0, 0)` if positions are coincident.
    pub fn direction_to(&self, target: &Position) -> (f64, f64) {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < 1e-12 {
            (0.0, 0.0)
        } else {
            (dx / dist, dy / dist)
        }
    }

    /// Clamps this position to lie within the square domain [0, size]².
    pub fn clamp_to_bounds(&mut self, size: f64) {
        self.x = self.x.clamp(0.0, size);
        self.y = self.y.clamp(0.0, size);
    }

    /// Returns a new position clamped to the domain bounds.
    pub fn clamped(mut self, size: f64) -> Self {
        self.clamp_to_bounds(size);
        self
    }

    /// Moves a fixed `step` along the straight line toward `target`.
    ///
    /// The step is not shortened near the target, so the agent may overshoot
    /// by less than `step`. Coincident positions leave `self` unchanged.
    pub fn step_toward(&mut self, target: &Position, step: f64) {
        let (dx, dy) = self.direction_to(target);
        self.x += dx * step;
        self.y += dy * step;
    }

    /// Offsets this position by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

impl From<[f64; 2]> for Position {
    fn from(v: [f64; 2]) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.distance_sq_to(&b) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn position_direction_to() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.0, 0.0);
        let (dx, dy) = a.direction_to(&b);
        assert!((dx - 1.0).abs() < 1e-10);
        assert!(dy.abs() < 1e-10);
    }

    #[test]
    fn direction_to_self_is_zero() {
        let a = Position::new(2.0, 2.0);
        assert_eq!(a.direction_to(&a), (0.0, 0.0));
    }

    #[test]
    fn position_clamp() {
        let p = Position::new(-1.0, 15.0).clamped(10.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 10.0);
    }

    #[test]
    fn step_toward_moves_fixed_distance() {
        let mut p = Position::new(0.0, 0.0);
        p.step_toward(&Position::new(10.0, 0.0), 0.5);
        assert!((p.x - 0.5).abs() < 1e-10);
        assert!(p.y.abs() < 1e-10);
    }

    #[test]
    fn step_toward_coincident_is_noop() {
        let mut p = Position::new(4.0, 4.0);
        p.step_toward(&Position::new(4.0, 4.0), 0.5);
        assert_eq!(p, Position::new(4.0, 4.0));
        assert!(!p.x.is_nan());
    }

    #[test]
    fn array_conversion() {
        let p: Position = [1.5, 2.5].into();
        let arr: [f64; 2] = p.into();
        assert_eq!(arr, [1.5, 2.5]);
    }
}
