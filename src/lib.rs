//! affectgrid - affective multi-agent Q-learning on a shared grid
//!
//! Agents learn with single-step tabular Q-learning to reach individual
//! goals in a bounded 2D world with drifting obstacles. Each agent carries a
//! valence/arousal/dominance affect model and a drive/goal-mode model that
//! modulate exploration; frustration spreads between agents in view.
//!
//! The [`Simulation`] type runs the whole loop headlessly:
//!
//! ```no_run
//! use affectgrid::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::default(), 4, 42).unwrap();
//! for _ in 0..100 {
//!     sim.tick();
//! }
//! for view in sim.agent_views() {
//!     println!("{} {:?} {}", view.id, view.goal_mode, view.state);
//! }
//! ```

pub mod affect;
pub mod agent;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod explain;
pub mod learning;
pub mod motivation;
pub mod simulation;
pub mod snapshot;
pub mod types;
pub mod world;

pub use affect::{AffectModel, Emotion};
pub use agent::{Agent, AgentSnapshot, Observation};
pub use codec::{discretize, Direction, StateCodec, StateKey};
pub use config::{SimConfig, WorldConfig};
pub use error::ConfigError;
pub use events::{AgentEvent, EventKind, EventLog};
pub use explain::{BriefingExplainer, Explainer};
pub use motivation::{Drives, GoalMode};
pub use simulation::{Simulation, TickReport};
pub use snapshot::{AgentRecord, RewardPoint, SimulationSnapshot, SnapshotError, WorldRecord};
pub use types::Position;
pub use world::{EmotionalInfluence, Obstacle, Perception, StepResult, World};

/// Identifier type used for simulation runs.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
