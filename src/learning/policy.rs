//! Epsilon-greedy action selection with affect-modulated exploration.

use rand::seq::SliceRandom;
use rand::Rng;

use super::q_table::max_value;

/// Inputs that shape the effective exploration rate for one decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exploration {
    /// Configured base rate ε (clamped to `[0, 1]` before use).
    pub epsilon: f64,
    /// Current arousal in `[0, 1]`.
    pub arousal: f64,
    /// Boost applied while frustrated, if frustrated.
    pub impulsive_boost: Option<f64>,
    /// Boost applied while confused, if confused.
    pub meta_boost: Option<f64>,
}

impl Exploration {
    /// `ε + arousal·(1 − ε)` plus any active boosts, clamped to `[0, 1]`
    /// after every term.
    pub fn effective_rate(&self) -> f64 {
        let eps = clamp_unit(self.epsilon);
        let arousal = clamp_unit(self.arousal);
        let mut rate = clamp_unit(eps + arousal * (1.0 - eps));
        if let Some(boost) = self.impulsive_boost {
            rate = clamp_unit(rate + boost.max(0.0));
        }
        if let Some(boost) = self.meta_boost {
            rate = clamp_unit(rate + boost.max(0.0));
        }
        rate
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Outcome of one epsilon-greedy draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub action: usize,
    /// True if the action came from the random branch.
    pub explored: bool,
}

/// Indices of every action tied for the maximum value.
pub fn greedy_actions(q_values: &[f64]) -> Vec<usize> {
    let best = max_value(q_values);
    q_values
        .iter()
        .enumerate()
        .filter(|(_, q)| **q == best)
        .map(|(i, _)| i)
        .collect()
}

/// With probability `rate` picks a uniformly random action, otherwise a
/// uniformly random one among the greedy ties.
///
/// `q_values` must not be empty.
pub fn epsilon_greedy<R: Rng + ?Sized>(q_values: &[f64], rate: f64, rng: &mut R) -> Choice {
    let n = q_values.len().max(1);
    if rng.gen::<f64>() < rate {
        return Choice {
            action: rng.gen_range(0..n),
            explored: true,
        };
    }
    let ties = greedy_actions(q_values);
    match ties.choose(rng) {
        Some(&action) => Choice {
            action,
            explored: false,
        },
        None => Choice {
            action: rng.gen_range(0..n),
            explored: true,
        },
    }
}
