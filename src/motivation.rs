//! Drives and the goal-mode state machine.

use std::fmt;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::affect::finite_or_zero;
use crate::events::{EventKind, EventLog};

/// Motivational drives, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Drives {
    pub curiosity: f64,
    pub understanding: f64,
    pub frustration: f64,
}

impl Drives {
    pub fn clamped(self) -> Self {
        Self {
            curiosity: finite_or_zero(self.curiosity).clamp(0.0, 1.0),
            understanding: finite_or_zero(self.understanding).clamp(0.0, 1.0),
            frustration: finite_or_zero(self.frustration).clamp(0.0, 1.0),
        }
    }

    pub fn in_range(&self) -> bool {
        [self.curiosity, self.understanding, self.frustration]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

/// High-level behavioural regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GoalMode {
    #[default]
    Explore,
    ReduceFrustration,
}

impl GoalMode {
    /// Subgoal label that accompanies the mode.
    pub fn default_subgoal(&self) -> Option<&'static str> {
        match self {
            GoalMode::Explore => Some("Find a new state"),
            GoalMode::ReduceFrustration => None,
        }
    }
}

impl fmt::Display for GoalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalMode::Explore => write!(f, "explore"),
            GoalMode::ReduceFrustration => write!(f, "reduce_frustration"),
        }
    }
}

/// Signals feeding one drive update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveSignal {
    /// Curiosity bonus earned this step (0 when the state was known).
    pub intrinsic_reward: f64,
    /// Current emotional valence.
    pub valence: f64,
    /// Total (external + intrinsic) reward of the last learning step.
    pub total_reward: f64,
}

/// Per-agent drives, goal mode and subgoal.
#[derive(Debug, Clone, PartialEq)]
pub struct MotivationModel {
    drives: Drives,
    goal: GoalMode,
    subgoal: Option<String>,
    frustration_peak_logged: bool,
}

impl MotivationModel {
    /// Multiplicative frustration decay applied before every drive update.
    pub const FRUSTRATION_DECAY: f64 = 0.98;
    /// Frustration below which `ReduceFrustration` returns to `Explore`.
    pub const FRUSTRATION_EXIT: f64 = 0.4;
    /// Total reward above which the step counts as reaching the goal.
    pub const HIGH_REWARD: f64 = 5.0;

    /// Creates a model with randomized starting drives.
    pub fn new<R: Rng + ?Sized>(initial_goal: GoalMode, rng: &mut R) -> Self {
        let drives = Drives {
            curiosity: rng.gen_range(0.1..0.5),
            understanding: rng.gen_range(0.1..0.3),
            frustration: rng.gen_range(0.0..0.2),
        };
        Self::restore(drives, initial_goal, None, false)
    }

    /// Rebuilds a model from stored state.
    ///
    /// A `None` subgoal falls back to the mode's default label.
    pub fn restore(
        drives: Drives,
        goal: GoalMode,
        subgoal: Option<String>,
        frustration_peak_logged: bool,
    ) -> Self {
        Self {
            drives: drives.clamped(),
            goal,
            subgoal: subgoal.or_else(|| goal.default_subgoal().map(str::to_string)),
            frustration_peak_logged,
        }
    }

    pub fn drives(&self) -> Drives {
        self.drives
    }

    pub fn goal(&self) -> GoalMode {
        self.goal
    }

    pub fn subgoal(&self) -> Option<&str> {
        self.subgoal.as_deref()
    }

    pub fn frustration(&self) -> f64 {
        self.drives.frustration
    }

    pub fn frustration_peak_logged(&self) -> bool {
        self.frustration_peak_logged
    }

    /// Overwrites frustration (clamped).
    pub fn set_frustration(&mut self, value: f64) {
        self.drives.frustration = value;
        self.drives = self.drives.clamped();
    }

    /// Applies one step of drive dynamics.
    ///
    /// Frustration decays, then moves with valence; a goal-reaching reward
    /// halves it. Curiosity and understanding grow with the intrinsic reward
    /// plus a small symmetric noise. A single `FrustrationPeak` event is
    /// logged per upward crossing of `threshold`.
    pub fn update_drives<R: Rng + ?Sized>(
        &mut self,
        signal: DriveSignal,
        threshold: f64,
        step: u64,
        log: &mut EventLog,
        rng: &mut R,
    ) {
        let intrinsic = finite_or_zero(signal.intrinsic_reward);
        let valence = finite_or_zero(signal.valence);
        let Drives {
            mut curiosity,
            mut understanding,
            mut frustration,
        } = self.drives;

        frustration *= Self::FRUSTRATION_DECAY;

        curiosity += intrinsic * 0.1 + rng.gen_range(-0.005..0.005);
        understanding += intrinsic * 0.05 + rng.gen_range(-0.0025..0.0025);

        if valence < -0.5 {
            frustration += 0.04;
        } else if valence > 0.2 {
            frustration -= 0.05;
        } else {
            frustration -= 0.01;
        }

        if signal.total_reward > Self::HIGH_REWARD {
            frustration *= 0.5;
        }

        self.drives = Drives {
            curiosity,
            understanding,
            frustration,
        }
        .clamped();

        let frustration = self.drives.frustration;
        if frustration > threshold && !self.frustration_peak_logged {
            log.push(
                EventKind::FrustrationPeak,
                format!("Frustration crossed threshold ({frustration:.2})"),
                step,
            );
            self.frustration_peak_logged = true;
        } else if frustration < threshold {
            self.frustration_peak_logged = false;
        }
    }

    /// Runs the goal-mode state machine and returns the new mode on a change.
    ///
    /// Entry into `ReduceFrustration` uses `threshold`; exit requires
    /// frustration below [`Self::FRUSTRATION_EXIT`].
    pub fn update_goal(&mut self, threshold: f64, step: u64, log: &mut EventLog) -> Option<GoalMode> {
        let frustration = self.drives.frustration;
        let next = match self.goal {
            GoalMode::Explore if frustration > threshold => GoalMode::ReduceFrustration,
            GoalMode::ReduceFrustration if frustration < Self::FRUSTRATION_EXIT => {
                GoalMode::Explore
            }
            _ => return None,
        };

        self.goal = next;
        self.subgoal = next.default_subgoal().map(str::to_string);
        let label = match next {
            GoalMode::Explore => "Explore",
            GoalMode::ReduceFrustration => "Reduce Frustration",
        };
        info!(goal = %next, frustration, "goal mode changed");
        log.push(EventKind::GoalChange, format!("Goal set to '{label}'"), step);
        Some(next)
    }

    /// Pulls frustration toward a higher neighbourhood mean.
    ///
    /// Returns the applied increase; a lower or equal mean changes nothing.
    pub fn apply_emotional_influence(&mut self, neighbor_mean: f64, factor: f64) -> f64 {
        let current = self.drives.frustration;
        let diff = finite_or_zero(neighbor_mean) - current;
        if diff <= 0.0 {
            return 0.0;
        }
        let factor = finite_or_zero(factor).max(0.0);
        self.set_frustration(current + diff * factor);
        self.drives.frustration - current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model(frustration: f64) -> MotivationModel {
        MotivationModel::restore(
            Drives {
                curiosity: 0.3,
                understanding: 0.2,
                frustration,
            },
            GoalMode::Explore,
            None,
            false,
        )
    }

    fn signal(valence: f64, total_reward: f64) -> DriveSignal {
        DriveSignal {
            intrinsic_reward: 0.0,
            valence,
            total_reward,
        }
    }

    #[test]
    fn initial_drives_in_documented_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let m = MotivationModel::new(GoalMode::Explore, &mut rng);
            let d = m.drives();
            assert!((0.1..0.5).contains(&d.curiosity));
            assert!((0.1..0.3).contains(&d.understanding));
            assert!((0.0..0.2).contains(&d.frustration));
            assert_eq!(m.subgoal(), Some("Find a new state"));
        }
    }

    #[test]
    fn negative_valence_raises_frustration() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut log = EventLog::new();
        let mut m = model(0.5);
        m.update_drives(signal(-0.8, -1.0), 0.8, 0, &mut log, &mut rng);
        assert!((m.frustration() - (0.5 * 0.98 + 0.04)).abs() < 1e-12);
    }

    #[test]
    fn positive_valence_lowers_frustration() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut log = EventLog::new();
        let mut m = model(0.5);
        m.update_drives(signal(0.5, 0.0), 0.8, 0, &mut log, &mut rng);
        assert!((m.frustration() - (0.5 * 0.98 - 0.05)).abs() < 1e-12);
    }

    #[test]
    fn goal_reward_halves_frustration() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut log = EventLog::new();
        let mut m = model(0.6);
        m.update_drives(signal(0.0, 9.9), 0.8, 0, &mut log, &mut rng);
        assert!((m.frustration() - (0.6 * 0.98 - 0.01) * 0.5).abs() < 1e-12);
    }

    #[test]
    fn intrinsic_reward_feeds_curiosity() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut log = EventLog::new();
        let mut m = model(0.1);
        let before = m.drives().curiosity;
        m.update_drives(
            DriveSignal {
                intrinsic_reward: 0.5,
                valence: 0.0,
                total_reward: 0.0,
            },
            0.8,
            0,
            &mut log,
            &mut rng,
        );
        assert!(m.drives().curiosity > before + 0.04);
    }

    #[test]
    fn frustration_peak_logged_once_per_crossing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut log = EventLog::new();
        let mut m = model(0.95);
        for step in 0..3 {
            m.update_drives(signal(-0.9, -1.0), 0.8, step, &mut log, &mut rng);
        }
        assert_eq!(log.count(EventKind::FrustrationPeak), 1);
        assert!(m.frustration_peak_logged());
    }

    #[test]
    fn goal_hysteresis() {
        let mut log = EventLog::new();
        let mut m = model(0.0);
        assert_eq!(m.update_goal(0.8, 0, &mut log), None);

        m.set_frustration(0.85);
        assert_eq!(
            m.update_goal(0.8, 1, &mut log),
            Some(GoalMode::ReduceFrustration)
        );
        assert_eq!(m.subgoal(), None);

        // Just below the entry threshold but above the exit bound.
        m.set_frustration(0.79);
        assert_eq!(m.update_goal(0.8, 2, &mut log), None);
        m.set_frustration(0.4);
        assert_eq!(m.update_goal(0.8, 3, &mut log), None);
        assert_eq!(m.goal(), GoalMode::ReduceFrustration);

        m.set_frustration(0.39);
        assert_eq!(m.update_goal(0.8, 4, &mut log), Some(GoalMode::Explore));
        assert_eq!(m.subgoal(), Some("Find a new state"));
        assert_eq!(log.count(EventKind::GoalChange), 2);
    }

    #[test]
    fn influence_only_increases() {
        let mut m = model(0.2);
        let delta = m.apply_emotional_influence(0.8, 0.1);
        assert!((delta - 0.06).abs() < 1e-12);
        assert!((m.frustration() - 0.26).abs() < 1e-12);

        let mut m = model(0.8);
        assert_eq!(m.apply_emotional_influence(0.2, 0.1), 0.0);
        assert_eq!(m.frustration(), 0.8);
    }

    #[test]
    fn influence_stays_clamped() {
        let mut m = model(0.9);
        m.apply_emotional_influence(50.0, 10.0);
        assert_eq!(m.frustration(), 1.0);
    }
}
