//! Global threshold filter deciding which atoms are removed everywhere.

use indexmap::IndexSet;

use crate::record::AtomId;
use crate::stats::SegmentStats;

/// User-configured thresholds for global atom removal.
#[derive(Debug, Clone)]
pub struct FilterThresholds {
    /// Atoms with fewer total occurrences than this are removal candidates.
    pub min_depth: usize,
    /// Only atoms no longer than this are eligible for depth/context removal.
    pub max_length: i64,
    /// Remove every atom duplicated within a single genome.
    pub remove_dup: bool,
    /// Removal requires strictly more unique contexts than this.
    pub max_unique: usize,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_depth: 10,
            max_length: 10_000,
            remove_dup: false,
            max_unique: 1,
        }
    }
}

impl FilterThresholds {
    /// The removal decision for one atom:
    /// duplication (when enabled) removes outright; otherwise a short atom
    /// is removed when it is both shallow and context-promiscuous.
    pub fn should_remove(&self, stats: &SegmentStats) -> bool {
        if self.remove_dup && stats.duplicated {
            return true;
        }
        stats.length <= self.max_length
            && stats.depth < self.min_depth
            && stats.unique_context > self.max_unique
    }

    /// Atoms to remove in this pass, in first-seen order. Atoms already
    /// absent from the orderings (depth zero) are never reconsidered.
    pub fn select_removals(&self, all: &[SegmentStats]) -> IndexSet<AtomId> {
        let mut removals = IndexSet::new();
        for (atom_idx, stats) in all.iter().enumerate() {
            if stats.depth == 0 {
                continue;
            }
            if self.should_remove(stats) {
                removals.insert(atom_idx as AtomId);
            }
        }
        removals
    }
}
