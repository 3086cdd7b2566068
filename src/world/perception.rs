//! What a single agent can see of the world.

use crate::codec::{StateCodec, StateKey};
use crate::types::Position;

/// An agent's view: its own position plus the positions of every other
/// agent and obstacle within view radius.
///
/// The flat encoding is `[own_x, own_y, other_x, other_y, ...]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Perception {
    pub own: Position,
    pub others: Vec<Position>,
}

impl Perception {
    pub fn new(own: Position, others: Vec<Position>) -> Self {
        Self { own, others }
    }

    /// Decodes a flat perception vector.
    ///
    /// Missing coordinates read as 0; a trailing unpaired value is ignored.
    pub fn from_flat(state: &[f64]) -> Self {
        let own = Position::new(
            state.first().copied().unwrap_or(0.0),
            state.get(1).copied().unwrap_or(0.0),
        );
        let others = state
            .get(2..)
            .unwrap_or(&[])
            .chunks_exact(2)
            .map(|c| Position::new(c[0], c[1]))
            .collect();
        Self { own, others }
    }

    pub fn to_flat(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(2 + self.others.len() * 2);
        flat.push(self.own.x);
        flat.push(self.own.y);
        for p in &self.others {
            flat.push(p.x);
            flat.push(p.y);
        }
        flat
    }

    /// Discrete state key for this view relative to `goal`.
    pub fn state_key(&self, codec: &StateCodec, goal: &Position) -> StateKey {
        codec.discretize(&self.own, goal, &self.others)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_encoding_interleaves() {
        let p = Perception::new(
            Position::new(1.0, 2.0),
            vec![Position::new(3.0, 4.0), Position::new(5.0, 6.0)],
        );
        assert_eq!(p.to_flat(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(Perception::from_flat(&p.to_flat()), p);
    }

    #[test]
    fn short_input_degrades() {
        let p = Perception::from_flat(&[7.0]);
        assert_eq!(p.own, Position::new(7.0, 0.0));
        assert!(p.others.is_empty());

        let p = Perception::from_flat(&[1.0, 1.0, 2.0]);
        assert!(p.others.is_empty());
    }

    #[test]
    fn state_key_uses_codec() {
        let p = Perception::new(Position::new(2.0, 2.0), vec![]);
        let key = p.state_key(&StateCodec::default(), &Position::new(2.0, 8.0));
        assert_eq!(key.as_str(), "2x2_goal_N_threat_none");
    }
}
