//! Social frustration diffusion between agents within view.

use crate::types::Position;

/// The narrow interface through which the world influences an agent.
///
/// The world never touches agent internals beyond these two calls.
pub trait EmotionalInfluence {
    /// Current frustration in `[0, 1]`.
    fn frustration(&self) -> f64;

    /// Reacts to the mean frustration of visible neighbours.
    fn apply_emotional_influence(&mut self, neighbor_mean: f64, factor: f64);
}

/// Runs one diffusion pass over the `active` agents.
///
/// Frustration values are snapshotted before any agent is influenced, so the
/// result does not depend on iteration order. Each active agent receives the
/// mean frustration of the other active agents within `view_radius`
/// (inclusive). Returns the number of agents that had at least one visible
/// neighbour.
pub fn diffuse<A: EmotionalInfluence>(
    agents: &mut [A],
    positions: &[Position],
    active: &[usize],
    view_radius: f64,
    factor: f64,
) -> usize {
    let snapshot: Vec<f64> = agents.iter().map(|a| a.frustration()).collect();
    let mut influenced = 0;

    for &i in active {
        if i >= agents.len() {
            continue;
        }
        let Some(own_pos) = positions.get(i) else {
            continue;
        };
        let mut sum = 0.0;
        let mut count = 0usize;
        for &j in active {
            if j == i {
                continue;
            }
            if let (Some(other_pos), Some(frustration)) = (positions.get(j), snapshot.get(j)) {
                if own_pos.distance_to(other_pos) <= view_radius {
                    sum += frustration;
                    count += 1;
                }
            }
        }
        if count > 0 {
            agents[i].apply_emotional_influence(sum / count as f64, factor);
            influenced += 1;
        }
    }

    influenced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Mood(f64);

    impl EmotionalInfluence for Mood {
        fn frustration(&self) -> f64 {
            self.0
        }

        fn apply_emotional_influence(&mut self, neighbor_mean: f64, factor: f64) {
            if neighbor_mean > self.0 {
                self.0 += (neighbor_mean - self.0) * factor;
            }
        }
    }

    #[test]
    fn pulls_toward_higher_neighbour() {
        let mut agents = vec![Mood(0.8), Mood(0.2)];
        let positions = vec![Position::new(1.0, 1.0), Position::new(2.0, 1.0)];
        let n = diffuse(&mut agents, &positions, &[0, 1], 4.0, 0.1);
        assert_eq!(n, 2);
        assert_eq!(agents[0].0, 0.8);
        assert!((agents[1].0 - 0.26).abs() < 1e-12);
    }

    #[test]
    fn uses_pre_pass_snapshot() {
        // The middle agent is raised by agent 0, but agent 2 must still see
        // the middle agent's pre-pass value.
        let mut agents = vec![Mood(1.0), Mood(0.0), Mood(0.0)];
        let positions = vec![
            Position::new(0.0, 0.0),
            Position::new(3.0, 0.0),
            Position::new(6.0, 0.0),
        ];
        diffuse(&mut agents, &positions, &[0, 1, 2], 3.0, 0.5);
        assert!((agents[1].0 - 0.25).abs() < 1e-12);
        assert_eq!(agents[2].0, 0.0);
    }

    #[test]
    fn out_of_view_and_inactive_are_ignored() {
        let mut agents = vec![Mood(0.0), Mood(1.0), Mood(1.0)];
        let positions = vec![
            Position::new(0.0, 0.0),
            Position::new(9.0, 9.0),
            Position::new(0.5, 0.0),
        ];
        let n = diffuse(&mut agents, &positions, &[0, 1], 4.0, 0.5);
        assert_eq!(n, 0);
        assert_eq!(agents[0].0, 0.0);
    }

    #[test]
    fn view_radius_is_inclusive() {
        let mut agents = vec![Mood(0.0), Mood(1.0)];
        let positions = vec![Position::new(0.0, 0.0), Position::new(4.0, 0.0)];
        diffuse(&mut agents, &positions, &[0, 1], 4.0, 0.5);
        assert_eq!(agents[0].0, 0.5);
    }
}
