//! Tabular Q-learning core.
//!
//! Owns the Q-table, the short-term experience buffer and the
//! meta-cognitive confusion detector, and implements epsilon-greedy
//! selection and the one-step Q-update with an intrinsic curiosity bonus.

pub mod memory;
pub mod meta;
pub mod policy;
pub mod q_table;

pub use memory::{Experience, ShortTermMemory};
pub use meta::MetaCognition;
pub use policy::{epsilon_greedy, greedy_actions, Choice, Exploration};
pub use q_table::QTable;

use rand::Rng;
use tracing::{debug, warn};

use crate::codec::StateKey;
use crate::config::SimConfig;
use crate::events::{EventKind, EventLog};

/// Affective context consulted when choosing an action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionContext {
    pub arousal: f64,
    pub frustration: f64,
}

/// One observed transition handed to [`LearningCore::learn`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: StateKey,
    pub action: usize,
    /// External reward from the world.
    pub reward: f64,
    pub next_state: StateKey,
}

/// Result of a learning step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnOutcome {
    /// External reward plus the curiosity-scaled intrinsic bonus.
    pub total_reward: f64,
    /// Curiosity bonus earned by reaching `next_state` (0 if known).
    pub intrinsic_reward: f64,
    /// `1 - min(1, |ΔQ|)`, consumed by the affect model.
    pub predictability: f64,
}

/// Per-agent learner.
#[derive(Debug, Clone)]
pub struct LearningCore {
    q_table: QTable,
    memory: ShortTermMemory,
    meta: MetaCognition,
    impulsive_explore_logged: bool,
}

impl LearningCore {
    /// Bonus granted on the first visit of a discrete state.
    pub const CURIOSITY_BONUS: f64 = 0.5;

    pub fn new(action_size: usize, memory_capacity: usize) -> Self {
        Self {
            q_table: QTable::new(action_size),
            memory: ShortTermMemory::new(memory_capacity),
            meta: MetaCognition::new(),
            impulsive_explore_logged: false,
        }
    }

    /// Rebuilds a learner from stored parts. The memory buffer starts empty.
    pub fn restore(
        q_table: QTable,
        memory_capacity: usize,
        meta: MetaCognition,
        impulsive_explore_logged: bool,
    ) -> Self {
        Self {
            q_table,
            memory: ShortTermMemory::new(memory_capacity),
            meta,
            impulsive_explore_logged,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn memory(&self) -> &ShortTermMemory {
        &self.memory
    }

    pub fn meta(&self) -> &MetaCognition {
        &self.meta
    }

    pub fn is_confused(&self) -> bool {
        self.meta.is_confused()
    }

    pub fn impulsive_explore_logged(&self) -> bool {
        self.impulsive_explore_logged
    }

    /// Applies a new action count and memory capacity.
    ///
    /// Existing Q-rows are padded with zeros or truncated; the newest
    /// experiences that still fit are kept.
    pub fn reconfigure(&mut self, action_size: usize, memory_capacity: usize) {
        if action_size != self.q_table.action_size() {
            warn!(
                from = self.q_table.action_size(),
                to = action_size,
                "resizing Q-table rows"
            );
            let old = std::mem::replace(&mut self.q_table, QTable::new(action_size));
            self.q_table = QTable::from_rows(old.into_rows(), action_size);
        }
        if memory_capacity != self.memory.capacity() {
            let mut memory = ShortTermMemory::new(memory_capacity);
            for experience in self.memory.iter() {
                memory.store(experience.clone());
            }
            self.memory = memory;
        }
    }

    /// Touches `key` and returns the intrinsic reward for visiting it.
    ///
    /// The first visit of a state inserts a zero row, logs a `NewState` event
    /// and yields [`Self::CURIOSITY_BONUS`]; later visits yield 0.
    pub fn visit(&mut self, key: &StateKey, step: u64, log: &mut EventLog) -> f64 {
        let (_, first_visit) = self.q_table.get_or_init(key);
        if !first_visit {
            return 0.0;
        }
        debug!(state = %key, "discovered new state");
        log.push(EventKind::NewState, format!("Discovered state: {key}"), step);
        Self::CURIOSITY_BONUS
    }

    /// Chooses an action for `key`.
    ///
    /// An unseen state is initialized silently here; the curiosity bonus is
    /// reserved for transitions into novel states (see [`Self::learn`]).
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        key: &StateKey,
        ctx: DecisionContext,
        config: &SimConfig,
        step: u64,
        log: &mut EventLog,
        rng: &mut R,
    ) -> usize {
        let frustrated = ctx.frustration > config.frustration_threshold;
        if frustrated {
            if !self.impulsive_explore_logged {
                debug!(frustration = ctx.frustration, "impulsive exploration");
                log.push(
                    EventKind::ImpulsiveExplore,
                    "Frustration > threshold. Boosting exploration.",
                    step,
                );
                self.impulsive_explore_logged = true;
            }
        } else {
            self.impulsive_explore_logged = false;
        }

        let rate = Exploration {
            epsilon: config.epsilon,
            arousal: ctx.arousal,
            impulsive_boost: frustrated.then_some(config.impulsive_exploration_boost),
            meta_boost: self
                .meta
                .is_confused()
                .then_some(config.meta_cognitive_boost),
        }
        .effective_rate();

        let (q_values, _) = self.q_table.get_or_init(key);
        epsilon_greedy(q_values, rate, rng).action
    }

    /// Applies the one-step Q-learning update for a transition.
    ///
    /// `Q[s,a] += α·(r + γ·max Q[s'] − Q[s,a])` where `r` is the external
    /// reward plus the intrinsic bonus scaled by `curiosity`.
    pub fn learn(
        &mut self,
        transition: Transition,
        curiosity: f64,
        config: &SimConfig,
        step: u64,
        log: &mut EventLog,
    ) -> LearnOutcome {
        let Transition {
            state,
            action,
            reward,
            next_state,
        } = transition;

        let intrinsic_reward = self.visit(&next_state, step, log);
        let total_reward = reward + intrinsic_reward * curiosity.clamp(0.0, 1.0);

        let alpha = config.learning_rate.clamp(0.0, 1.0);
        let gamma = config.gamma.clamp(0.0, 1.0);

        let max_next = {
            let (next_values, _) = self.q_table.get_or_init(&next_state);
            q_table::max_value(next_values)
        };

        let (values, _) = self.q_table.get_or_init(&state);
        let actions = values.len();
        let delta = match values.get_mut(action) {
            Some(q) => {
                let old = *q;
                *q = old + alpha * (total_reward + gamma * max_next - old);
                *q - old
            }
            None => {
                warn!(action, actions, "ignoring out-of-range action");
                0.0
            }
        };

        self.memory.store(Experience {
            state,
            action,
            reward: total_reward,
            next_state,
        });

        self.meta
            .observe(total_reward, config.meta_cognitive_reward_window, step, log);

        let predictability = if delta.is_finite() {
            1.0 - delta.abs().min(1.0)
        } else {
            0.0
        };

        LearnOutcome {
            total_reward,
            intrinsic_reward,
            predictability,
        }
    }
}
