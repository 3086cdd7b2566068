use thiserror::Error;

use crate::error::ConfigError;

/// Failures while importing a saved simulation.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The document is not valid JSON or does not match the schema.
    #[cfg(feature = "serde")]
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document was written by a newer schema.
    #[error("unsupported snapshot schema version {found} (latest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The world and agent sections disagree on the number of agents.
    #[error("world holds {world} agents but snapshot has {records} {what}")]
    AgentCountMismatch {
        world: usize,
        records: usize,
        what: &'static str,
    },

    /// The embedded configuration or layout is unusable.
    #[error("invalid configuration in snapshot: {0}")]
    InvalidConfig(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_display() {
        let e = SnapshotError::UnsupportedVersion {
            found: 7,
            supported: 1,
        };
        assert_eq!(
            e.to_string(),
            "unsupported snapshot schema version 7 (latest supported is 1)"
        );
    }

    #[test]
    fn config_error_converts() {
        let e: SnapshotError = ConfigError::NoAgents.into();
        assert!(matches!(e, SnapshotError::InvalidConfig(ConfigError::NoAgents)));
        assert!(e.to_string().contains("at least one agent"));
    }

    #[test]
    fn count_mismatch_display() {
        let e = SnapshotError::AgentCountMismatch {
            world: 3,
            records: 2,
            what: "agent records",
        };
        assert_eq!(e.to_string(), "world holds 3 agents but snapshot has 2 agent records");
    }
}
