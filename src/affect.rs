//! Affective state: a three-dimensional valence/arousal/dominance model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Emotion vector.
///
/// Invariant: `valence ∈ [-1, 1]`, `arousal ∈ [0, 1]`, `dominance ∈ [-1, 1]`
/// after every update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Emotion {
    pub valence: f64,
    pub arousal: f64,
    pub dominance: f64,
}

impl Emotion {
    /// Returns the emotion with every field forced into its range.
    ///
    /// Non-finite fields collapse to 0.
    pub fn clamped(self) -> Self {
        Self {
            valence: finite_or_zero(self.valence).clamp(-1.0, 1.0),
            arousal: finite_or_zero(self.arousal).clamp(0.0, 1.0),
            dominance: finite_or_zero(self.dominance).clamp(-1.0, 1.0),
        }
    }

    /// True if every field is inside its documented interval.
    pub fn in_range(&self) -> bool {
        (-1.0..=1.0).contains(&self.valence)
            && (0.0..=1.0).contains(&self.arousal)
            && (-1.0..=1.0).contains(&self.dominance)
    }
}

pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Per-agent emotion dynamics driven by reward and learning surprise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffectModel {
    emotion: Emotion,
}

impl AffectModel {
    const VALENCE_RETENTION: f64 = 0.95;
    const VALENCE_GAIN: f64 = 0.1;
    const AROUSAL_GAIN: f64 = 0.05;
    const DOMINANCE_GAIN: f64 = 0.05;
    const DECAY: f64 = 0.99;

    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a model from a stored emotion (clamped on the way in).
    pub fn from_emotion(emotion: Emotion) -> Self {
        Self {
            emotion: emotion.clamped(),
        }
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    /// Updates emotions from an external reward and the predictability of
    /// the last learning step (`1 - min(1, |ΔQ|)`).
    ///
    /// Arousal and dominance decay once per call after being clamped.
    pub fn update(&mut self, reward: f64, predictability: f64) {
        let reward = finite_or_zero(reward);
        let predictability = finite_or_zero(predictability).clamp(0.0, 1.0);
        let e = &mut self.emotion;

        e.valence = (e.valence * Self::VALENCE_RETENTION + reward * Self::VALENCE_GAIN)
            .clamp(-1.0, 1.0);

        e.arousal = (e.arousal + (1.0 - predictability) * Self::AROUSAL_GAIN).clamp(0.0, 1.0);
        e.arousal *= Self::DECAY;

        let dominance_intensity = (reward + predictability) / 2.0;
        e.dominance = (e.dominance + dominance_intensity * Self::DOMINANCE_GAIN).clamp(-1.0, 1.0);
        e.dominance *= Self::DECAY;

        self.emotion = self.emotion.clamped();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_neutral() {
        let m = AffectModel::new();
        assert_eq!(m.emotion(), Emotion::default());
    }

    #[test]
    fn positive_reward_raises_valence() {
        let mut m = AffectModel::new();
        m.update(1.0, 1.0);
        let e = m.emotion();
        assert!((e.valence - 0.1).abs() < 1e-12);
        // Fully predictable: no arousal gain, decay keeps it at 0.
        assert_eq!(e.arousal, 0.0);
        // (1 + 1) / 2 * 0.05 = 0.05, then * 0.99
        assert!((e.dominance - 0.0495).abs() < 1e-12);
    }

    #[test]
    fn surprise_raises_arousal() {
        let mut m = AffectModel::new();
        m.update(0.0, 0.0);
        assert!((m.emotion().arousal - 0.05 * 0.99).abs() < 1e-12);
    }

    #[test]
    fn large_penalty_saturates_valence() {
        let mut m = AffectModel::new();
        for _ in 0..100 {
            m.update(-50.0, 0.0);
        }
        let e = m.emotion();
        assert_eq!(e.valence, -1.0);
        assert!(e.in_range());
    }

    #[test]
    fn non_finite_inputs_keep_range() {
        let mut m = AffectModel::new();
        m.update(f64::NAN, f64::INFINITY);
        assert!(m.emotion().in_range());
        assert!(!m.emotion().valence.is_nan());
    }

    #[test]
    fn restored_emotion_is_clamped() {
        let m = AffectModel::from_emotion(Emotion {
            valence: 3.0,
            arousal: -1.0,
            dominance: -7.0,
        });
        assert_eq!(
            m.emotion(),
            Emotion {
                valence: 1.0,
                arousal: 0.0,
                dominance: -1.0
            }
        );
    }
}
