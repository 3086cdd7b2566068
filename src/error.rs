use thiserror::Error;

/// Structural configuration problems detected when building agents or worlds.
///
/// Out-of-range probabilities and rates are clamped rather than rejected;
/// only values that leave no meaningful simulation are errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("action_size must be at least 1")]
    EmptyActionSpace,

    #[error("grid size must be positive and finite, got {0}")]
    InvalidGridSize(f64),

    #[error("at least one agent is required")]
    NoAgents,

    #[error("layout for {agents} agents has {goals} goal positions")]
    GoalCountMismatch { agents: usize, goals: usize },
}
