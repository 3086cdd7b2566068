//! Configuration for agents and the shared world.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::motivation::GoalMode;

/// Per-agent learning and behaviour configuration.
///
/// Read at construction and hot-reloadable through
/// [`crate::agent::Agent::update_config`]. Probabilities and rates are
/// clamped at their point of use, so out-of-range values degrade gracefully.
///
/// When deserialized, missing fields take their [`Default`] values except the
/// obstacle settings: a configuration without them predates obstacles and
/// loads with obstacles disabled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    // --- Q-learning ---
    /// Learning rate α.
    pub learning_rate: f64,
    /// Discount factor γ.
    pub gamma: f64,
    /// Base exploration rate ε.
    pub epsilon: f64,
    /// Number of discrete actions (0 = move to goal, 1 = random move).
    pub action_size: usize,
    /// Capacity of the short-term experience buffer.
    pub memory_capacity: usize,

    // --- Exploration modulation ---
    /// Frustration level above which the agent explores impulsively.
    pub frustration_threshold: f64,
    /// Additive ε boost while frustrated.
    pub impulsive_exploration_boost: f64,
    /// Additive ε boost while confused.
    pub meta_cognitive_boost: f64,
    /// Rolling window length for the confusion detector (0 disables it).
    pub meta_cognitive_reward_window: usize,

    // --- Social ---
    /// Perception range for other agents and obstacles.
    pub view_radius: f64,
    /// Strength of frustration diffusion between neighbours.
    pub diffusion_factor: f64,

    // --- Environment ---
    /// Whether obstacles are placed in the world.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enable_obstacles: bool,
    /// Number of obstacles when enabled.
    #[cfg_attr(feature = "serde", serde(default))]
    pub num_obstacles: usize,

    /// Goal mode every agent starts in.
    pub initial_goal_key: GoalMode,
}

impl SimConfig {
    /// Verifies the structural settings an agent cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.action_size == 0 {
            return Err(ConfigError::EmptyActionSpace);
        }
        Ok(())
    }

    /// Returns true if `other` differs in a setting that only takes effect
    /// after the world is rebuilt.
    pub fn obstacles_changed(&self, other: &SimConfig) -> bool {
        self.enable_obstacles != other.enable_obstacles
            || self.num_obstacles != other.num_obstacles
    }

    /// Number of obstacles a world built from this config should hold.
    pub fn effective_obstacles(&self) -> usize {
        if self.enable_obstacles {
            self.num_obstacles
        } else {
            0
        }
    }

    /// Builds the matching world configuration.
    pub fn world_config(&self, grid_size: f64, agent_count: usize, seed: u64) -> WorldConfig {
        WorldConfig {
            grid_size,
            agent_count,
            view_radius: self.view_radius,
            diffusion_factor: self.diffusion_factor,
            num_obstacles: self.effective_obstacles(),
            seed,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            gamma: 0.9,
            epsilon: 0.1,
            action_size: 2,
            memory_capacity: 1000,
            frustration_threshold: 0.8,
            impulsive_exploration_boost: 0.4,
            meta_cognitive_boost: 0.25,
            meta_cognitive_reward_window: 20,
            view_radius: 4.0,
            diffusion_factor: 0.05,
            enable_obstacles: true,
            num_obstacles: 5,
            initial_goal_key: GoalMode::Explore,
        }
    }
}

/// Geometry and social settings of the shared world.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Side length of the square domain.
    pub grid_size: f64,
    /// Number of agents placed in the world.
    pub agent_count: usize,
    /// Visibility radius (inclusive).
    pub view_radius: f64,
    /// Frustration diffusion strength (0 disables diffusion).
    pub diffusion_factor: f64,
    /// Number of obstacles to place.
    pub num_obstacles: usize,
    /// Seed for layout and kinematics randomness.
    pub seed: u64,
}

impl WorldConfig {
    /// Verifies the geometry is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.grid_size.is_finite() || self.grid_size <= 0.0 {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        if self.agent_count == 0 {
            return Err(ConfigError::NoAgents);
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            agent_count: 2,
            view_radius: 4.0,
            diffusion_factor: 0.05,
            num_obstacles: 5,
            seed: 42,
        }
    }
}
