//! Versioned save/load records for a whole simulation.
//!
//! Records are plain data: the world and each agent convert to and from
//! them (`World::to_record`, `Agent::to_record`), and
//! [`SimulationSnapshot`] bundles them with the orchestrator state. With the
//! `serde` feature the snapshot reads and writes JSON; missing optional
//! fields fall back to defaults so older documents keep loading.

mod errors;

pub use errors::SnapshotError;

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::affect::Emotion;
use crate::codec::StateKey;
use crate::config::SimConfig;
use crate::events::AgentEvent;
use crate::motivation::{Drives, GoalMode};
use crate::types::Position;
use crate::Id;

/// Schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

#[cfg(feature = "serde")]
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Stored world geometry and layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WorldRecord {
    pub grid_size: f64,
    pub agent_count: usize,
    pub view_radius: f64,
    pub diffusion_factor: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub obstacle_count: usize,
    pub goal_positions: Vec<Position>,
    pub agent_positions: Vec<Position>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub obstacles: Vec<Position>,
}

/// Stored state of one agent.
///
/// The experience buffer and the random generator are not persisted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AgentRecord {
    pub id: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: SimConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub q_table: BTreeMap<StateKey, Vec<f64>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub emotion: Emotion,
    #[cfg_attr(feature = "serde", serde(default))]
    pub drives: Drives,
    #[cfg_attr(feature = "serde", serde(default))]
    pub goal_mode: GoalMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subgoal: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_action: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_reward: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub event_history: Vec<AgentEvent>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub event_id_counter: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub frustration_peak_logged: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub impulsive_explore_logged: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reward_window: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub confused: bool,
}

/// Mean reward of the active agents after one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RewardPoint {
    /// Number of ticks completed when the mean was recorded.
    pub step: u64,
    pub avg_reward: f64,
}

/// A complete saved simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SimulationSnapshot {
    #[cfg_attr(feature = "serde", serde(default = "default_schema_version"))]
    pub schema_version: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub run_id: Option<Id>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub step: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub episode: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub config: SimConfig,
    /// Per-agent activity flags; missing or short lists read as active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub activity: Vec<bool>,
    pub world: WorldRecord,
    pub agents: Vec<AgentRecord>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reward_history: Vec<RewardPoint>,
}

impl SimulationSnapshot {
    /// Checks the schema version and that every section agrees on the
    /// number of agents.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        check_version(self.schema_version)?;
        let world = self.world.agent_count;
        for (records, what) in [
            (self.world.agent_positions.len(), "agent positions"),
            (self.world.goal_positions.len(), "goal positions"),
            (self.agents.len(), "agent records"),
        ] {
            if records != world {
                return Err(SnapshotError::AgentCountMismatch {
                    world,
                    records,
                    what,
                });
            }
        }
        Ok(())
    }

    /// Activity flag of agent `index`; absent flags read as active.
    pub fn is_active(&self, index: usize) -> bool {
        self.activity.get(index).copied().unwrap_or(true)
    }

    /// Serializes to pretty-printed JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a JSON document.
    ///
    /// The schema version is checked before the body is decoded, so a
    /// document from a newer writer reports `UnsupportedVersion` rather than
    /// a parse error.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(version) = value.get("schemaVersion").and_then(serde_json::Value::as_u64) {
            check_version(u32::try_from(version).unwrap_or(u32::MAX))?;
        }
        let snapshot: Self = serde_json::from_value(value)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

fn check_version(found: u32) -> Result<(), SnapshotError> {
    if found > SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(())
}
