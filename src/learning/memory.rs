//! Short-term experience buffer.

use std::collections::VecDeque;

use rand::Rng;

use crate::codec::StateKey;

/// A single stored transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    /// Discrete state the action was taken in.
    pub state: StateKey,
    /// Chosen action.
    pub action: usize,
    /// Total reward (external plus scaled intrinsic).
    pub reward: f64,
    /// Discrete state observed after the action.
    pub next_state: StateKey,
}

/// Fixed-capacity FIFO buffer of recent experiences.
///
/// Written on every learning step. The Q-update never reads it back; it is
/// kept for diagnostics and inspection through [`ShortTermMemory::recall`].
#[derive(Debug, Clone)]
pub struct ShortTermMemory {
    experiences: VecDeque<Experience>,
    capacity: usize,
}

impl ShortTermMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            experiences: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Stores an experience, evicting the oldest one at capacity.
    pub fn store(&mut self, experience: Experience) {
        if self.capacity == 0 {
            return;
        }
        if self.experiences.len() >= self.capacity {
            self.experiences.pop_front();
        }
        self.experiences.push_back(experience);
    }

    /// Draws `n` experiences uniformly at random, with replacement.
    ///
    /// Returns an empty vector when the buffer is empty.
    pub fn recall<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&Experience> {
        if self.experiences.is_empty() {
            return Vec::new();
        }
        (0..n)
            .map(|_| &self.experiences[rng.gen_range(0..self.experiences.len())])
            .collect()
    }

    /// Most recently stored experience.
    pub fn last(&self) -> Option<&Experience> {
        self.experiences.back()
    }

    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.experiences.iter()
    }

    pub fn clear(&mut self) {
        self.experiences.clear();
    }
}
