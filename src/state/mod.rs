//! Job-state model
//!
//! A harvest job is described by two sets: the universe of discovered
//! detail-page links and the subset that has been completed. The remaining
//! work queue is always recomputed as their difference; no other progress
//! signal exists.

use std::collections::HashSet;

/// In-memory snapshot of a manufacturer's harvest progress
///
/// The universe preserves discovery (page-major, document) order so the
/// remaining queue is deterministic across runs. The store guarantees
/// `completed ⊆ universe` by construction: completion is a flag on a
/// discovered link, never a free-standing entry.
#[derive(Debug, Clone, Default)]
pub struct JobState {
    universe: Vec<String>,
    completed: HashSet<String>,
}

impl JobState {
    /// Creates a job state from persisted sets
    pub fn new(universe: Vec<String>, completed: HashSet<String>) -> Self {
        Self {
            universe,
            completed,
        }
    }

    /// Returns true once link discovery has populated the universe
    pub fn is_discovered(&self) -> bool {
        !self.universe.is_empty()
    }

    /// All discovered links, in discovery order
    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// Links whose extraction has been persisted
    pub fn completed(&self) -> &HashSet<String> {
        &self.completed
    }

    /// Computes the remaining work queue: universe minus completed,
    /// preserving universe order
    pub fn remaining(&self) -> Vec<String> {
        self.universe
            .iter()
            .filter(|url| !self.completed.contains(*url))
            .cloned()
            .collect()
    }
}
