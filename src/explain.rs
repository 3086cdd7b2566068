//! Decision explanations.
//!
//! An [`Explainer`] turns an agent view into prose. The crate ships
//! [`BriefingExplainer`], a deterministic template that lays out the data a
//! decision was based on; richer sinks (for example a language-model
//! client) can implement the same trait outside the crate.

use std::fmt;

use crate::agent::AgentSnapshot;
use crate::motivation::GoalMode;

/// Human-readable label of an action index.
pub fn action_label(action: usize) -> String {
    match action {
        0 => "Move towards goal".to_string(),
        1 => "Move randomly".to_string(),
        n => format!("Action {n}"),
    }
}

fn goal_label(goal: GoalMode) -> &'static str {
    match goal {
        GoalMode::Explore => "Explore",
        GoalMode::ReduceFrustration => "Reduce Frustration",
    }
}

/// Produces an explanation of an agent's last decision.
pub trait Explainer {
    /// Explains the chosen action, or why `alternative` was not chosen.
    fn explain(&self, snapshot: &AgentSnapshot, alternative: Option<usize>) -> String;
}

/// Renders a Markdown briefing of the decision data.
#[derive(Debug, Clone, Copy, Default)]
pub struct BriefingExplainer;

impl Explainer for BriefingExplainer {
    fn explain(&self, snapshot: &AgentSnapshot, alternative: Option<usize>) -> String {
        Briefing {
            snapshot,
            alternative,
        }
        .to_string()
    }
}

struct Briefing<'a> {
    snapshot: &'a AgentSnapshot,
    alternative: Option<usize>,
}

impl fmt::Display for Briefing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.snapshot;
        match self.alternative {
            Some(_) => writeln!(f, "## Counterfactual analysis for agent {}", s.id)?,
            None => writeln!(f, "## Decision analysis for agent {}", s.id)?,
        }
        writeln!(f)?;
        writeln!(f, "**Agent data:**")?;
        writeln!(f, "- **Agent ID:** {}", s.id)?;
        writeln!(f, "- **Current goal:** {}", goal_label(s.goal_mode))?;
        if let Some(subgoal) = &s.subgoal {
            writeln!(f, "- **Subgoal:** {subgoal}")?;
        }
        writeln!(
            f,
            "- **Emotions:** valence: {:.2}, arousal: {:.2}, dominance: {:.2}",
            s.emotion.valence, s.emotion.arousal, s.emotion.dominance
        )?;
        writeln!(
            f,
            "- **Drives:** curiosity: {:.2}, frustration: {:.2}",
            s.drives.curiosity, s.drives.frustration
        )?;
        writeln!(f, "- **State:** \"{}\"", s.state)?;
        if s.confused {
            writeln!(f, "- **Meta-cognition:** confused, exploring more")?;
        }
        writeln!(f)?;
        writeln!(f, "**Decision data:**")?;
        writeln!(f, "- **Q-values:**")?;
        for (action, q) in s.q_values.iter().enumerate() {
            writeln!(f, "  - {}: {q:.4}", action_label(action))?;
        }
        match s.last_action {
            Some(action) => writeln!(
                f,
                "- **Action chosen:** {action} ({})",
                action_label(action)
            )?,
            None => writeln!(f, "- **Action chosen:** none yet")?,
        }

        if let Some(alternative) = self.alternative {
            writeln!(f)?;
            let chosen = s.last_action.and_then(|a| s.q_values.get(a).copied());
            let other = s.q_values.get(alternative).copied();
            match (chosen, other) {
                (Some(chosen), Some(other)) => writeln!(
                    f,
                    "Choosing {} would have traded an estimated value of {chosen:.4} for {other:.4} ({:+.4}).",
                    action_label(alternative),
                    other - chosen
                )?,
                _ => writeln!(
                    f,
                    "No value estimate is available for {}.",
                    action_label(alternative)
                )?,
            }
        }
        Ok(())
    }
}
