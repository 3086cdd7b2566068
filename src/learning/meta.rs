//! Meta-cognitive confusion detection over a rolling reward window.

use std::collections::VecDeque;

use tracing::info;

use crate::events::{EventKind, EventLog};

/// Tracks recent total rewards and flags sustained poor performance.
///
/// A single threshold decides both entry and exit, so the flag may toggle on
/// consecutive steps while the mean hovers around it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaCognition {
    window: VecDeque<f64>,
    confused: bool,
}

impl MetaCognition {
    /// Mean reward below which the agent is considered confused.
    pub const CONFUSION_THRESHOLD: f64 = -0.5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds from stored state, keeping at most `window_len` rewards.
    pub fn restore(rewards: Vec<f64>, confused: bool, window_len: usize) -> Self {
        let skip = rewards.len().saturating_sub(window_len);
        Self {
            window: rewards.into_iter().skip(skip).collect(),
            confused,
        }
    }

    pub fn is_confused(&self) -> bool {
        self.confused
    }

    pub fn rewards(&self) -> Vec<f64> {
        self.window.iter().copied().collect()
    }

    /// Mean of the window, if it holds any rewards.
    pub fn mean(&self) -> Option<f64> {
        if self.window.is_empty() {
            None
        } else {
            Some(self.window.iter().sum::<f64>() / self.window.len() as f64)
        }
    }

    /// Records a total reward and returns the new flag when it changes.
    ///
    /// Nothing is evaluated until the window holds `window_len` rewards.
    /// A zero-length window disables detection.
    pub fn observe(
        &mut self,
        total_reward: f64,
        window_len: usize,
        step: u64,
        log: &mut EventLog,
    ) -> Option<bool> {
        if window_len == 0 {
            return None;
        }
        self.window.push_back(total_reward);
        while self.window.len() > window_len {
            self.window.pop_front();
        }
        if self.window.len() < window_len {
            return None;
        }

        let avg = self.mean()?;
        if avg < Self::CONFUSION_THRESHOLD && !self.confused {
            self.confused = true;
            info!(avg_reward = avg, "meta-cognition active");
            log.push(
                EventKind::MetaCognitionActive,
                format!("Performance is low (avg reward: {avg:.2}). Boosting exploration."),
                step,
            );
            Some(true)
        } else if avg >= Self::CONFUSION_THRESHOLD && self.confused {
            self.confused = false;
            info!(avg_reward = avg, "meta-cognition inactive");
            log.push(
                EventKind::MetaCognitionInactive,
                format!("Performance improved (avg reward: {avg:.2}). Resuming normal operation."),
                step,
            );
            Some(false)
        } else {
            None
        }
    }
}
