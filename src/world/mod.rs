//! Shared grid world.
//!
//! Owns every agent, goal and obstacle position, advances kinematics,
//! computes rewards and runs the emotional-diffusion pass.

pub mod diffusion;
pub mod perception;
pub mod reward;

pub use diffusion::EmotionalInfluence;
pub use perception::Perception;
pub use reward::{RewardBreakdown, RewardComputer};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::WorldConfig;
use crate::error::ConfigError;
use crate::snapshot::WorldRecord;
use crate::types::Position;

/// Distance an agent covers per "move to goal" action.
pub const MOVE_STEP: f64 = 0.5;
/// Half-width of the per-axis displacement of the random-move action.
pub const RANDOM_MOVE_HALF_SPAN: f64 = 0.5;
/// Half-width of the per-axis obstacle drift per tick.
pub const OBSTACLE_DRIFT_HALF_SPAN: f64 = 0.1;

/// Action index that moves straight toward the goal.
pub const ACTION_TO_GOAL: usize = 0;
/// Action index that applies an unbiased random displacement.
pub const ACTION_RANDOM: usize = 1;

/// A drifting obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    pub position: Position,
}

impl Obstacle {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

/// Result of a single world step.
///
/// Every vector is aligned with the `active` indices passed to
/// [`World::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Flat perception of each active agent after the step.
    pub next_states: Vec<Vec<f64>>,
    /// Reward of each active agent.
    pub rewards: Vec<f64>,
    /// Whether each active agent reached its goal this step.
    pub dones: Vec<bool>,
}

/// The shared square world.
///
/// # Lifecycle
///
/// 1. Build with [`World::new`] (random layout) or [`World::from_layout`].
/// 2. Each tick, snapshot perceptions with [`World::perceive`], then call
///    [`World::step`] with the chosen actions of the active agents.
/// 3. After agents learn, call [`World::diffuse`].
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    agent_positions: Vec<Position>,
    goal_positions: Vec<Position>,
    obstacles: Vec<Obstacle>,
    rng: StdRng,
}

impl World {
    /// Creates a world with uniformly random agents, goals and obstacles.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let size = config.grid_size;
        let goal_positions = (0..config.agent_count)
            .map(|_| random_position(&mut rng, size))
            .collect();
        let agent_positions = (0..config.agent_count)
            .map(|_| random_position(&mut rng, size))
            .collect();
        let obstacles = (0..config.num_obstacles)
            .map(|_| Obstacle::new(random_position(&mut rng, size)))
            .collect();
        Ok(Self {
            config,
            agent_positions,
            goal_positions,
            obstacles,
            rng,
        })
    }

    /// Creates a world with an explicit layout.
    ///
    /// `config.agent_count` and `config.num_obstacles` are overwritten with
    /// the layout sizes; positions are clamped to the grid.
    pub fn from_layout(
        mut config: WorldConfig,
        agents: Vec<Position>,
        goals: Vec<Position>,
        obstacles: Vec<Obstacle>,
    ) -> Result<Self, ConfigError> {
        config.agent_count = agents.len();
        config.num_obstacles = obstacles.len();
        config.validate()?;
        if goals.len() != agents.len() {
            return Err(ConfigError::GoalCountMismatch {
                agents: agents.len(),
                goals: goals.len(),
            });
        }
        let size = config.grid_size;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            agent_positions: agents.into_iter().map(|p| p.clamped(size)).collect(),
            goal_positions: goals.into_iter().map(|p| p.clamped(size)).collect(),
            obstacles: obstacles
                .into_iter()
                .map(|o| Obstacle::new(o.position.clamped(size)))
                .collect(),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn grid_size(&self) -> f64 {
        self.config.grid_size
    }

    pub fn agent_count(&self) -> usize {
        self.agent_positions.len()
    }

    pub fn view_radius(&self) -> f64 {
        self.config.view_radius
    }

    pub fn diffusion_factor(&self) -> f64 {
        self.config.diffusion_factor
    }

    /// Updates the visibility radius and diffusion strength in place.
    pub fn set_social(&mut self, view_radius: f64, diffusion_factor: f64) {
        self.config.view_radius = view_radius;
        self.config.diffusion_factor = diffusion_factor;
    }

    pub fn agent_positions(&self) -> &[Position] {
        &self.agent_positions
    }

    pub fn goal_positions(&self) -> &[Position] {
        &self.goal_positions
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Goal of agent `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn goal_of(&self, index: usize) -> Position {
        self.goal_positions[index]
    }

    /// Position of agent `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn position_of(&self, index: usize) -> Position {
        self.agent_positions[index]
    }

    /// Everything agent `index` can see: every other agent (active or not),
    /// then every obstacle, within the inclusive view radius.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn perceive(&self, index: usize) -> Perception {
        let own = self.agent_positions[index];
        let radius = self.config.view_radius;
        let agents = self
            .agent_positions
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != index)
            .map(|(_, p)| *p);
        let obstacles = self.obstacles.iter().map(|o| o.position);
        let others = agents
            .chain(obstacles)
            .filter(|p| own.distance_to(p) <= radius)
            .collect();
        Perception::new(own, others)
    }

    /// Flat perception vector of agent `index` (see [`Perception::to_flat`]).
    pub fn state_of(&self, index: usize) -> Vec<f64> {
        self.perceive(index).to_flat()
    }

    /// Flat perceptions of every agent.
    pub fn states(&self) -> Vec<Vec<f64>> {
        (0..self.agent_count()).map(|i| self.state_of(i)).collect()
    }

    /// Re-randomizes agent positions; goals and obstacles are kept.
    pub fn reset(&mut self) -> Vec<Vec<f64>> {
        let size = self.config.grid_size;
        for p in &mut self.agent_positions {
            *p = random_position(&mut self.rng, size);
        }
        self.states()
    }

    /// Advances the world by one tick.
    ///
    /// 1. Obstacles drift and are clamped.
    /// 2. Each active agent applies `actions[k]` (for `active[k]`); moves are
    ///    computed on a copy of the positions and committed together.
    /// 3. Rewards are computed; a reached goal is re-randomized.
    ///
    /// Inactive agents neither move nor receive a reward. Extra actions or
    /// indices without a counterpart are ignored.
    pub fn step(&mut self, actions: &[usize], active: &[usize]) -> StepResult {
        if actions.len() != active.len() {
            warn!(
                actions = actions.len(),
                active = active.len(),
                "action count does not match active agents"
            );
        }
        let size = self.config.grid_size;

        self.drift_obstacles();

        let mut next_positions = self.agent_positions.clone();
        let mut moved = Vec::with_capacity(active.len());
        for (&index, &action) in active.iter().zip(actions) {
            let Some(position) = next_positions.get_mut(index) else {
                warn!(index, "ignoring unknown agent index");
                continue;
            };
            let goal = self.goal_positions[index];
            match action {
                ACTION_TO_GOAL => position.step_toward(&goal, MOVE_STEP),
                ACTION_RANDOM => {
                    let dx = self.rng.gen_range(-RANDOM_MOVE_HALF_SPAN..RANDOM_MOVE_HALF_SPAN);
                    let dy = self.rng.gen_range(-RANDOM_MOVE_HALF_SPAN..RANDOM_MOVE_HALF_SPAN);
                    position.translate(dx, dy);
                }
                _ => {}
            }
            position.clamp_to_bounds(size);
            moved.push(index);
        }
        self.agent_positions = next_positions;

        let mut result = StepResult {
            next_states: Vec::with_capacity(moved.len()),
            rewards: Vec::with_capacity(moved.len()),
            dones: Vec::with_capacity(moved.len()),
        };
        for index in moved {
            let breakdown = RewardComputer::compute(
                &self.agent_positions[index],
                &self.goal_positions[index],
                &self.obstacles,
                size,
            );
            if breakdown.reached {
                let goal = random_position(&mut self.rng, size);
                debug!(agent = index, new_goal = %goal, "goal reached");
                self.goal_positions[index] = goal;
            }
            if breakdown.collisions > 0 {
                debug!(agent = index, collisions = breakdown.collisions, "obstacle collision");
            }
            result.next_states.push(self.state_of(index));
            result.rewards.push(breakdown.total);
            result.dones.push(breakdown.reached);
        }
        result
    }

    /// Runs emotional diffusion over the active agents.
    ///
    /// Skipped when diffusion is disabled or fewer than two agents are
    /// active. Returns the number of agents influenced.
    pub fn diffuse<A: EmotionalInfluence>(&self, agents: &mut [A], active: &[usize]) -> usize {
        let factor = self.config.diffusion_factor;
        if factor <= 0.0 || active.len() <= 1 {
            return 0;
        }
        diffusion::diffuse(
            agents,
            &self.agent_positions,
            active,
            self.config.view_radius,
            factor,
        )
    }

    pub fn to_record(&self) -> WorldRecord {
        WorldRecord {
            grid_size: self.config.grid_size,
            agent_count: self.agent_positions.len(),
            view_radius: self.config.view_radius,
            diffusion_factor: self.config.diffusion_factor,
            obstacle_count: self.obstacles.len(),
            goal_positions: self.goal_positions.clone(),
            agent_positions: self.agent_positions.clone(),
            obstacles: self.obstacles.iter().map(|o| o.position).collect(),
        }
    }

    /// Rebuilds a world from a stored record; kinematics are reseeded.
    ///
    /// The stored obstacle list wins over `obstacle_count`.
    pub fn from_record(record: WorldRecord, seed: u64) -> Result<Self, ConfigError> {
        let config = WorldConfig {
            grid_size: record.grid_size,
            agent_count: record.agent_positions.len(),
            view_radius: record.view_radius,
            diffusion_factor: record.diffusion_factor,
            num_obstacles: record.obstacles.len(),
            seed,
        };
        Self::from_layout(
            config,
            record.agent_positions,
            record.goal_positions,
            record.obstacles.into_iter().map(Obstacle::new).collect(),
        )
    }

    fn drift_obstacles(&mut self) {
        let size = self.config.grid_size;
        for obstacle in &mut self.obstacles {
            let dx = self
                .rng
                .gen_range(-OBSTACLE_DRIFT_HALF_SPAN..OBSTACLE_DRIFT_HALF_SPAN);
            let dy = self
                .rng
                .gen_range(-OBSTACLE_DRIFT_HALF_SPAN..OBSTACLE_DRIFT_HALF_SPAN);
            obstacle.position.translate(dx, dy);
            obstacle.position.clamp_to_bounds(size);
        }
    }
}

fn random_position<R: Rng + ?Sized>(rng: &mut R, size: f64) -> Position {
    Position::new(rng.gen_range(0.0..size), rng.gen_range(0.0..size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(agents: usize, obstacles: usize) -> WorldConfig {
        WorldConfig {
            agent_count: agents,
            num_obstacles: obstacles,
            ..WorldConfig::default()
        }
    }

    fn layout(agents: Vec<Position>, goals: Vec<Position>) -> World {
        World::from_layout(config(agents.len(), 0), agents, goals, vec![]).unwrap()
    }

    #[test]
    fn new_places_everything_in_bounds() {
        let world = World::new(config(5, 4)).unwrap();
        assert_eq!(world.agent_count(), 5);
        assert_eq!(world.obstacles().len(), 4);
        let size = world.grid_size();
        for p in world
            .agent_positions()
            .iter()
            .chain(world.goal_positions())
            .chain(world.obstacles().iter().map(|o| &o.position))
        {
            assert!((0.0..=size).contains(&p.x) && (0.0..=size).contains(&p.y));
        }
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(World::new(config(0, 0)).is_err());
        let bad = World::from_layout(
            config(1, 0),
            vec![Position::origin()],
            vec![],
            vec![],
        );
        assert!(matches!(bad, Err(ConfigError::GoalCountMismatch { .. })));
    }

    #[test]
    fn move_to_goal_steps_half_unit() {
        let mut world = layout(vec![Position::new(0.0, 0.0)], vec![Position::new(10.0, 0.0)]);
        let result = world.step(&[ACTION_TO_GOAL], &[0]);
        assert!((world.position_of(0).x - 0.5).abs() < 1e-12);
        assert_eq!(result.rewards.len(), 1);
        assert!((result.rewards[0] - (-0.95)).abs() < 1e-12);
        assert!(!result.dones[0]);
    }

    #[test]
    fn move_to_goal_on_goal_does_not_nan() {
        let mut world = layout(vec![Position::new(3.0, 3.0)], vec![Position::new(3.0, 3.0)]);
        let result = world.step(&[ACTION_TO_GOAL], &[0]);
        assert_eq!(world.position_of(0), Position::new(3.0, 3.0));
        assert!(result.dones[0]);
        assert!(result.rewards[0].is_finite());
    }

    #[test]
    fn random_move_is_bounded() {
        let mut world = layout(vec![Position::new(5.0, 5.0)], vec![Position::new(0.0, 0.0)]);
        for _ in 0..50 {
            let before = world.position_of(0);
            world.step(&[ACTION_RANDOM], &[0]);
            let after = world.position_of(0);
            assert!((after.x - before.x).abs() <= RANDOM_MOVE_HALF_SPAN);
            assert!((after.y - before.y).abs() <= RANDOM_MOVE_HALF_SPAN);
            assert!((0.0..=10.0).contains(&after.x) && (0.0..=10.0).contains(&after.y));
        }
    }

    #[test]
    fn inactive_agents_do_not_move() {
        let mut world = layout(
            vec![Position::new(1.0, 1.0), Position::new(8.0, 8.0)],
            vec![Position::new(9.0, 1.0), Position::new(1.0, 8.0)],
        );
        let result = world.step(&[ACTION_TO_GOAL], &[0]);
        assert_eq!(world.position_of(1), Position::new(8.0, 8.0));
        assert_eq!(result.rewards.len(), 1);
    }

    #[test]
    fn reached_goal_is_rerandomized() {
        let mut world = layout(vec![Position::new(5.0, 5.0)], vec![Position::new(5.3, 5.0)]);
        let result = world.step(&[ACTION_TO_GOAL], &[0]);
        assert!(result.dones[0]);
        assert!(result.rewards[0] > 9.0);
        assert_ne!(world.goal_of(0), Position::new(5.3, 5.0));
    }

    #[test]
    fn obstacles_drift_within_bounds() {
        let mut world = World::from_layout(
            config(1, 1),
            vec![Position::new(9.0, 9.0)],
            vec![Position::new(9.0, 9.0)],
            vec![Obstacle::new(Position::new(0.0, 10.0))],
        )
        .unwrap();
        for _ in 0..20 {
            let before = world.obstacles()[0].position;
            world.step(&[2], &[0]);
            let after = world.obstacles()[0].position;
            assert!((after.x - before.x).abs() <= OBSTACLE_DRIFT_HALF_SPAN + 1e-12);
            assert!((0.0..=10.0).contains(&after.x) && (0.0..=10.0).contains(&after.y));
        }
    }

    #[test]
    fn perception_respects_view_radius() {
        let world = World::from_layout(
            config(3, 2),
            vec![
                Position::new(0.0, 0.0),
                Position::new(4.0, 0.0),
                Position::new(9.0, 9.0),
            ],
            vec![Position::origin(); 3],
            vec![
                Obstacle::new(Position::new(0.0, 1.0)),
                Obstacle::new(Position::new(8.0, 0.0)),
            ],
        )
        .unwrap();
        assert_eq!(world.state_of(0), vec![0.0, 0.0, 4.0, 0.0, 0.0, 1.0]);
        let p = world.perceive(2);
        assert!(p.others.is_empty());
    }

    #[test]
    fn reset_keeps_goals() {
        let mut world = World::new(config(3, 2)).unwrap();
        let goals = world.goal_positions().to_vec();
        let states = world.reset();
        assert_eq!(states.len(), 3);
        assert_eq!(world.goal_positions(), &goals[..]);
    }

    #[test]
    fn record_preserves_layout() {
        let world = World::new(config(3, 2)).unwrap();
        let record = world.to_record();
        assert_eq!(record.agent_count, 3);
        assert_eq!(record.obstacle_count, 2);
        let restored = World::from_record(record.clone(), 5).unwrap();
        assert_eq!(restored.to_record(), record);
    }

    #[test]
    fn unknown_actions_hold_position() {
        let mut world = layout(vec![Position::new(2.0, 2.0)], vec![Position::new(8.0, 8.0)]);
        world.step(&[7], &[0]);
        assert_eq!(world.position_of(0), Position::new(2.0, 2.0));
    }
}
