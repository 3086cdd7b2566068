//! The agent aggregate: learning core, affect, motivation and event log
//! behind `decide` / `learn` / `full_state`.

use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::affect::{AffectModel, Emotion};
use crate::codec::{StateCodec, StateKey};
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::events::{AgentEvent, EventLog};
use crate::learning::{DecisionContext, LearnOutcome, LearningCore, MetaCognition, QTable, Transition};
use crate::motivation::{DriveSignal, Drives, GoalMode, MotivationModel};
use crate::snapshot::AgentRecord;
use crate::types::Position;
use crate::world::{EmotionalInfluence, Perception};

/// What an agent observes at one instant: its perception plus its goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub perception: Perception,
    pub goal: Position,
}

impl Observation {
    pub fn new(perception: Perception, goal: Position) -> Self {
        Self { perception, goal }
    }

    pub fn position(&self) -> Position {
        self.perception.own
    }
}

/// Read-only per-tick view of an agent, for rendering and explanation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AgentSnapshot {
    pub id: usize,
    pub position: Position,
    pub goal_position: Position,
    pub emotion: Emotion,
    pub drives: Drives,
    pub goal_mode: GoalMode,
    pub subgoal: Option<String>,
    pub last_reward: f64,
    pub last_action: Option<usize>,
    pub state: StateKey,
    pub q_values: Vec<f64>,
    pub event_history: Vec<AgentEvent>,
    pub confused: bool,
}

/// An autonomous learner.
///
/// Agents never touch world state; the world influences them only through
/// [`EmotionalInfluence`].
#[derive(Debug, Clone)]
pub struct Agent {
    id: usize,
    config: SimConfig,
    codec: StateCodec,
    learning: LearningCore,
    affect: AffectModel,
    motivation: MotivationModel,
    events: EventLog,
    rng: StdRng,
    last_action: Option<usize>,
    last_reward: f64,
}

impl Agent {
    /// Creates an agent with randomized initial drives.
    pub fn new(id: usize, config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let motivation = MotivationModel::new(config.initial_goal_key, &mut rng);
        Ok(Self {
            id,
            codec: StateCodec::default(),
            learning: LearningCore::new(config.action_size, config.memory_capacity),
            affect: AffectModel::new(),
            motivation,
            events: EventLog::new(),
            rng,
            last_action: None,
            last_reward: 0.0,
            config,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn learning(&self) -> &LearningCore {
        &self.learning
    }

    pub fn emotion(&self) -> Emotion {
        self.affect.emotion()
    }

    pub fn drives(&self) -> Drives {
        self.motivation.drives()
    }

    pub fn goal_mode(&self) -> GoalMode {
        self.motivation.goal()
    }

    pub fn subgoal(&self) -> Option<&str> {
        self.motivation.subgoal()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn last_action(&self) -> Option<usize> {
        self.last_action
    }

    pub fn last_reward(&self) -> f64 {
        self.last_reward
    }

    pub fn is_confused(&self) -> bool {
        self.learning.is_confused()
    }

    /// Overwrites frustration (clamped). Used for scenario setup.
    pub fn set_frustration(&mut self, value: f64) {
        self.motivation.set_frustration(value);
    }

    /// Discrete state key of an observation.
    pub fn state_key(&self, observation: &Observation) -> StateKey {
        observation
            .perception
            .state_key(&self.codec, &observation.goal)
    }

    /// Chooses an action for the observed state.
    pub fn decide(&mut self, observation: &Observation, step: u64) -> usize {
        let key = self.state_key(observation);
        let ctx = DecisionContext {
            arousal: self.affect.emotion().arousal,
            frustration: self.motivation.frustration(),
        };
        let action = self.learning.decide(
            &key,
            ctx,
            &self.config,
            step,
            &mut self.events,
            &mut self.rng,
        );
        self.last_action = Some(action);
        action
    }

    /// Learns from one transition.
    ///
    /// Runs the Q-update, then the affect update on the external reward,
    /// then the drive update on the total reward, then the goal state
    /// machine.
    pub fn learn(
        &mut self,
        observation: &Observation,
        action: usize,
        reward: f64,
        next: &Observation,
        step: u64,
    ) -> LearnOutcome {
        let transition = Transition {
            state: self.state_key(observation),
            action,
            reward,
            next_state: self.state_key(next),
        };
        let curiosity = self.motivation.drives().curiosity;
        let outcome = self
            .learning
            .learn(transition, curiosity, &self.config, step, &mut self.events);

        self.affect.update(reward, outcome.predictability);

        self.motivation.update_drives(
            DriveSignal {
                intrinsic_reward: outcome.intrinsic_reward,
                valence: self.affect.emotion().valence,
                total_reward: outcome.total_reward,
            },
            self.config.frustration_threshold,
            step,
            &mut self.events,
            &mut self.rng,
        );
        self.motivation
            .update_goal(self.config.frustration_threshold, step, &mut self.events);

        self.last_action = Some(action);
        self.last_reward = outcome.total_reward;
        outcome
    }

    /// Builds the per-tick view for `observation`.
    ///
    /// An unseen current state reports zero Q-values without being inserted.
    pub fn full_state(&self, observation: &Observation) -> AgentSnapshot {
        let state = self.state_key(observation);
        let q_values = self.learning.q_table().values_or_zero(&state);
        AgentSnapshot {
            id: self.id,
            position: observation.position(),
            goal_position: observation.goal,
            emotion: self.affect.emotion(),
            drives: self.motivation.drives(),
            goal_mode: self.motivation.goal(),
            subgoal: self.motivation.subgoal().map(str::to_string),
            last_reward: self.last_reward,
            last_action: self.last_action,
            state,
            q_values,
            event_history: self.events.to_vec(),
            confused: self.learning.is_confused(),
        }
    }

    /// Hot-reloads the configuration.
    ///
    /// Obstacle settings only take effect once the world is rebuilt, which
    /// is reported rather than acted on here.
    pub fn update_config(&mut self, config: SimConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if self.config.obstacles_changed(&config) {
            warn!(
                agent = self.id,
                enable_obstacles = config.enable_obstacles,
                num_obstacles = config.num_obstacles,
                "obstacle settings changed; reinitialize the world to apply"
            );
        }
        self.learning
            .reconfigure(config.action_size, config.memory_capacity);
        self.config = config;
        Ok(())
    }

    pub fn to_record(&self) -> AgentRecord {
        let drives = self.motivation.drives();
        AgentRecord {
            id: self.id,
            config: self.config.clone(),
            q_table: self.learning.q_table().rows().clone(),
            emotion: self.affect.emotion(),
            drives,
            goal_mode: self.motivation.goal(),
            subgoal: self.motivation.subgoal().map(str::to_string),
            last_action: self.last_action,
            last_reward: self.last_reward,
            event_history: self.events.to_vec(),
            event_id_counter: self.events.next_id(),
            frustration_peak_logged: self.motivation.frustration_peak_logged(),
            impulsive_explore_logged: self.learning.impulsive_explore_logged(),
            reward_window: self.learning.meta().rewards(),
            confused: self.learning.is_confused(),
        }
    }

    /// Rebuilds an agent from a stored record.
    ///
    /// The experience buffer starts empty and the random generator is
    /// reseeded from `seed`.
    pub fn from_record(record: AgentRecord, seed: u64) -> Result<Self, ConfigError> {
        let AgentRecord {
            id,
            config,
            q_table,
            emotion,
            drives,
            goal_mode,
            subgoal,
            last_action,
            last_reward,
            event_history,
            event_id_counter,
            frustration_peak_logged,
            impulsive_explore_logged,
            reward_window,
            confused,
        } = record;
        config.validate()?;

        let meta = MetaCognition::restore(
            reward_window,
            confused,
            config.meta_cognitive_reward_window,
        );
        let learning = LearningCore::restore(
            QTable::from_rows(q_table, config.action_size),
            config.memory_capacity,
            meta,
            impulsive_explore_logged,
        );
        debug!(agent = id, states = learning.q_table().len(), "agent restored");
        Ok(Self {
            id,
            codec: StateCodec::default(),
            learning,
            affect: AffectModel::from_emotion(emotion),
            motivation: MotivationModel::restore(drives, goal_mode, subgoal, frustration_peak_logged),
            events: EventLog::restore(event_history, event_id_counter),
            rng: StdRng::seed_from_u64(seed),
            last_action,
            last_reward,
            config,
        })
    }
}

impl EmotionalInfluence for Agent {
    fn frustration(&self) -> f64 {
        self.motivation.frustration()
    }

    fn apply_emotional_influence(&mut self, neighbor_mean: f64, factor: f64) {
        let delta = self
            .motivation
            .apply_emotional_influence(neighbor_mean, factor);
        if delta > 0.0 {
            debug!(agent = self.id, delta, "frustration raised by neighbours");
        }
    }
}
