//! Headless simulation orchestrator.
//!
//! Drives the tick loop over a [`World`] and its agents, tracks which agents
//! are active, keeps a bounded reward history and saves/restores snapshots.
//!
//! Each tick runs: perceive (snapshot for every active agent) → decide →
//! world step → learn → emotional diffusion.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::agent::{Agent, AgentSnapshot, Observation};
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::snapshot::{RewardPoint, SimulationSnapshot, SnapshotError, SCHEMA_VERSION};
use crate::world::{Perception, World};
use crate::{generate_id, Id};

/// Side length of the world built by [`Simulation::new`].
pub const DEFAULT_GRID_SIZE: f64 = 10.0;
/// Number of reward points kept in the history.
pub const REWARD_HISTORY_LEN: usize = 200;

/// Summary of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Step number the tick ran as.
    pub step: u64,
    /// Indices of the agents that acted.
    pub active: Vec<usize>,
    /// Actions chosen, aligned with `active`.
    pub actions: Vec<usize>,
    /// Rewards received, aligned with `active`.
    pub rewards: Vec<f64>,
    /// Mean reward of the active agents, if any acted.
    pub mean_reward: Option<f64>,
    /// Number of agents that reached their goal.
    pub goals_reached: usize,
    /// Number of agents influenced by diffusion.
    pub influenced: usize,
}

/// A world plus its agents and run bookkeeping.
#[derive(Debug, Clone)]
pub struct Simulation {
    run_id: Id,
    seed: u64,
    config: SimConfig,
    world: World,
    agents: Vec<Agent>,
    active: Vec<bool>,
    step: u64,
    episode: u64,
    reward_history: VecDeque<RewardPoint>,
}

impl Simulation {
    /// Builds a world of [`DEFAULT_GRID_SIZE`] with `agent_count` agents, all
    /// active.
    pub fn new(config: SimConfig, agent_count: usize, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let (world, agents) = build(&config, agent_count, seed, 0)?;
        let run_id = generate_id();
        info!(
            run_id = %run_id,
            agents = agent_count,
            obstacles = world.obstacles().len(),
            seed,
            "simulation initialized"
        );
        Ok(Self {
            run_id,
            seed,
            config,
            world,
            agents,
            active: vec![true; agent_count],
            step: 0,
            episode: 0,
            reward_history: VecDeque::with_capacity(REWARD_HISTORY_LEN),
        })
    }

    /// Wraps an existing world; one agent is created per world agent.
    ///
    /// The world's view radius and diffusion factor are overwritten with the
    /// ones in `config`.
    pub fn with_world(
        config: SimConfig,
        mut world: World,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        world.set_social(config.view_radius, config.diffusion_factor);
        let agents = (0..world.agent_count())
            .map(|i| Agent::new(i, config.clone(), agent_seed(seed, 0, i)))
            .collect::<Result<Vec<_>, _>>()?;
        let active = vec![true; agents.len()];
        Ok(Self {
            run_id: generate_id(),
            seed,
            config,
            world,
            agents,
            active,
            step: 0,
            episode: 0,
            reward_history: VecDeque::with_capacity(REWARD_HISTORY_LEN),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn agent_mut(&mut self, index: usize) -> Option<&mut Agent> {
        self.agents.get_mut(index)
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn reward_history(&self) -> &VecDeque<RewardPoint> {
        &self.reward_history
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Indices of the active agents, ascending.
    pub fn active_indices(&self) -> Vec<usize> {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
            .collect()
    }

    /// Flips an agent's activity flag and returns the new value.
    pub fn toggle_agent(&mut self, index: usize) -> Option<bool> {
        let flag = self.active.get_mut(index)?;
        *flag = !*flag;
        debug!(agent = index, active = *flag, "agent toggled");
        Some(*flag)
    }

    /// Sets an agent's activity flag. Returns false for an unknown index.
    pub fn set_active(&mut self, index: usize, active: bool) -> bool {
        match self.active.get_mut(index) {
            Some(flag) => {
                *flag = active;
                true
            }
            None => false,
        }
    }

    /// What agent `index` currently observes.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn observation(&self, index: usize) -> Observation {
        Observation::new(self.world.perceive(index), self.world.goal_of(index))
    }

    /// Runs one tick.
    ///
    /// With no active agent only the step counter advances.
    pub fn tick(&mut self) -> TickReport {
        let step = self.step;
        self.step += 1;
        let active = self.active_indices();
        if active.is_empty() {
            return TickReport {
                step,
                active,
                actions: Vec::new(),
                rewards: Vec::new(),
                mean_reward: None,
                goals_reached: 0,
                influenced: 0,
            };
        }

        let observations: Vec<Observation> =
            active.iter().map(|&i| self.observation(i)).collect();

        let actions: Vec<usize> = active
            .iter()
            .zip(&observations)
            .map(|(&i, obs)| self.agents[i].decide(obs, step))
            .collect();

        let result = self.world.step(&actions, &active);

        for (k, &i) in active.iter().enumerate() {
            let next = Observation::new(
                Perception::from_flat(&result.next_states[k]),
                self.world.goal_of(i),
            );
            self.agents[i].learn(&observations[k], actions[k], result.rewards[k], &next, step);
        }

        let influenced = self.world.diffuse(&mut self.agents, &active);

        let mean_reward = result.rewards.iter().sum::<f64>() / result.rewards.len() as f64;
        if self.reward_history.len() >= REWARD_HISTORY_LEN {
            self.reward_history.pop_front();
        }
        self.reward_history.push_back(RewardPoint {
            step: self.step,
            avg_reward: mean_reward,
        });

        let goals_reached = result.dones.iter().filter(|&&d| d).count();
        debug!(step, mean_reward, goals_reached, influenced, "tick");

        TickReport {
            step,
            active,
            actions,
            rewards: result.rewards,
            mean_reward: Some(mean_reward),
            goals_reached,
            influenced,
        }
    }

    /// Runs `n` ticks and returns the last report.
    pub fn run(&mut self, n: usize) -> Option<TickReport> {
        (0..n).map(|_| self.tick()).last()
    }

    /// Rebuilds the world and every agent and re-activates all of them.
    ///
    /// The step counter restarts. The episode counter advances and seeds the
    /// new layout, so successive resets differ.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        let episode = self.episode + 1;
        let (world, agents) = build(&self.config, self.agents.len(), self.seed, episode)?;
        self.world = world;
        self.active = vec![true; agents.len()];
        self.agents = agents;
        self.step = 0;
        self.episode = episode;
        self.reward_history.clear();
        info!(run_id = %self.run_id, episode, "simulation reset");
        Ok(())
    }

    /// Hot-reloads the configuration into every agent and the world.
    ///
    /// Obstacle settings are stored but only applied by [`Self::reset`].
    pub fn update_config(&mut self, config: SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        for agent in &mut self.agents {
            agent.update_config(config.clone())?;
        }
        self.world
            .set_social(config.view_radius, config.diffusion_factor);
        self.config = config;
        Ok(())
    }

    /// Per-tick views of every agent.
    pub fn agent_views(&self) -> Vec<AgentSnapshot> {
        self.agents
            .iter()
            .enumerate()
            .map(|(i, agent)| agent.full_state(&self.observation(i)))
            .collect()
    }

    pub fn save(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            schema_version: SCHEMA_VERSION,
            run_id: Some(self.run_id.clone()),
            seed: self.seed,
            step: self.step,
            episode: self.episode,
            config: self.config.clone(),
            activity: self.active.clone(),
            world: self.world.to_record(),
            agents: self.agents.iter().map(Agent::to_record).collect(),
            reward_history: self.reward_history.iter().copied().collect(),
        }
    }

    /// Builds a simulation from a snapshot.
    ///
    /// Random generators are reseeded from the stored seed and step, so a
    /// restored run is deterministic but does not replay the saved run's
    /// random stream.
    pub fn restore(snapshot: SimulationSnapshot) -> Result<Self, SnapshotError> {
        snapshot.validate()?;
        snapshot.config.validate()?;
        let activity: Vec<bool> = (0..snapshot.agents.len())
            .map(|i| snapshot.is_active(i))
            .collect();
        let SimulationSnapshot {
            run_id,
            seed,
            step,
            episode,
            config,
            world,
            agents,
            reward_history,
            ..
        } = snapshot;

        let reseed = seed ^ step.rotate_left(32);
        let world = World::from_record(world, reseed)?;
        let agents = agents
            .into_iter()
            .enumerate()
            .map(|(i, record)| Agent::from_record(record, agent_seed(reseed, episode, i)))
            .collect::<Result<Vec<_>, _>>()?;

        let skip = reward_history.len().saturating_sub(REWARD_HISTORY_LEN);
        let run_id = run_id.unwrap_or_else(generate_id);
        info!(run_id = %run_id, step, episode, agents = agents.len(), "simulation loaded");
        Ok(Self {
            run_id,
            seed,
            config,
            world,
            agents,
            active: activity,
            step,
            episode,
            reward_history: reward_history.into_iter().skip(skip).collect(),
        })
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        self.save().to_json()
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Self::restore(SimulationSnapshot::from_json(json)?)
    }
}

fn agent_seed(seed: u64, episode: u64, index: usize) -> u64 {
    seed.wrapping_add(episode.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(index as u64 + 1)
}

fn build(
    config: &SimConfig,
    agent_count: usize,
    seed: u64,
    episode: u64,
) -> Result<(World, Vec<Agent>), ConfigError> {
    let world_seed = seed.wrapping_add(episode.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let world = World::new(config.world_config(DEFAULT_GRID_SIZE, agent_count, world_seed))?;
    let agents = (0..agent_count)
        .map(|i| Agent::new(i, config.clone(), agent_seed(seed, episode, i)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((world, agents))
}
