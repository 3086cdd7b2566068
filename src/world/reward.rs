//! Per-agent reward function.
//!
//! Combines a distance penalty, obstacle collision penalties and the
//! goal-reaching bonus.

use super::Obstacle;
use crate::types::Position;

/// Radius within which an obstacle counts as a collision.
pub const OBSTACLE_RADIUS: f64 = 0.75;
/// Penalty per colliding obstacle.
pub const OBSTACLE_PENALTY: f64 = 5.0;
/// Distance under which the goal counts as reached.
pub const GOAL_RADIUS: f64 = 0.5;
/// Bonus for reaching the goal.
pub const GOAL_BONUS: f64 = 10.0;

/// Components of one agent's reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardBreakdown {
    /// Distance to the goal after moving.
    pub distance: f64,
    /// Number of obstacles within [`OBSTACLE_RADIUS`].
    pub collisions: usize,
    /// Whether the goal was reached.
    pub reached: bool,
    /// Final reward.
    pub total: f64,
}

/// Computes rewards for the grid world.
pub struct RewardComputer;

impl RewardComputer {
    /// Reward for an agent at `position` pursuing `goal`.
    ///
    /// # Components
    ///
    /// 1. **Distance penalty**: `-distance / grid_size`.
    /// 2. **Collision penalty**: `-OBSTACLE_PENALTY` per obstacle closer than
    ///    [`OBSTACLE_RADIUS`].
    /// 3. **Goal bonus**: `+GOAL_BONUS` when closer than [`GOAL_RADIUS`].
    pub fn compute(
        position: &Position,
        goal: &Position,
        obstacles: &[Obstacle],
        grid_size: f64,
    ) -> RewardBreakdown {
        let distance = position.distance_to(goal);
        let mut total = -distance / grid_size;

        let collisions = obstacles
            .iter()
            .filter(|o| position.distance_to(&o.position) < OBSTACLE_RADIUS)
            .count();
        total -= OBSTACLE_PENALTY * collisions as f64;

        let reached = distance < GOAL_RADIUS;
        if reached {
            total += GOAL_BONUS;
        }

        RewardBreakdown {
            distance,
            collisions,
            reached,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_penalty_scales_with_grid() {
        let r = RewardComputer::compute(&Position::new(0.0, 0.0), &Position::new(3.0, 4.0), &[], 10.0);
        assert!((r.total - (-0.5)).abs() < 1e-12);
        assert!(!r.reached);
        assert_eq!(r.collisions, 0);
    }

    #[test]
    fn collisions_are_penalized_per_obstacle() {
        let obstacles = vec![
            Obstacle::new(Position::new(5.1, 5.0)),
            Obstacle::new(Position::new(5.0, 5.5)),
            Obstacle::new(Position::new(9.0, 9.0)),
        ];
        let r = RewardComputer::compute(
            &Position::new(5.0, 5.0),
            &Position::new(5.0, 7.0),
            &obstacles,
            10.0,
        );
        assert_eq!(r.collisions, 2);
        assert!((r.total - (-0.2 - 10.0)).abs() < 1e-12);
    }

    #[test]
    fn reaching_goal_adds_bonus() {
        let r = RewardComputer::compute(&Position::new(1.0, 1.0), &Position::new(1.2, 1.0), &[], 10.0);
        assert!(r.reached);
        assert!((r.total - (10.0 - 0.02)).abs() < 1e-12);
    }
}
