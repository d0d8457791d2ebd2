//! Orchestration of the full filtering pipeline.
//!
//! The global filter runs as an explicit loop: each pass rebuilds the
//! statistics from the current orderings, removes the atoms that fail the
//! thresholds, and stops early at the first pass that removes nothing.
//! The surviving orderings then feed the pair scan and the context
//! disambiguation, and the accumulated removal decisions are returned for
//! the final rewrite.

use indexmap::IndexSet;
use tracing::info;

use crate::adjacency::Adjacency;
use crate::context::{self, PerGenomeRemovals};
use crate::filter::FilterThresholds;
use crate::pairs::{self, PairScanConfig};
use crate::record::{AtomId, AtomWorld};
use crate::sequence::SequenceStore;
use crate::stats::{self, SegmentStats};

/// All scalar parameters of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub min_depth: usize,
    pub max_length: i64,
    pub remove_dup: bool,
    pub max_unique: usize,
    pub pair_min_in: usize,
    pub pair_min_out: usize,
    pub pair_max_span: i64,
    /// Upper bound on global-filter passes; at least one pass always runs.
    pub iterations: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_depth: 10,
            max_length: 10_000,
            remove_dup: false,
            max_unique: 1,
            pair_min_in: 2,
            pair_min_out: 2,
            pair_max_span: 70_000,
            iterations: 1,
        }
    }
}

impl PipelineConfig {
    fn thresholds(&self) -> FilterThresholds {
        FilterThresholds {
            min_depth: self.min_depth,
            max_length: self.max_length,
            remove_dup: self.remove_dup,
            max_unique: self.max_unique,
        }
    }

    fn pair_config(&self) -> PairScanConfig {
        PairScanConfig {
            min_in: self.pair_min_in,
            min_out: self.pair_min_out,
            max_span: self.pair_max_span,
        }
    }
}

/// Accumulated removal decisions, ready for the rewriter.
#[derive(Debug)]
pub struct FilterOutcome {
    /// Atoms removed from every genome, in removal order.
    pub global_removed: IndexSet<AtomId>,
    /// Atoms removed only in specific genomes by context disambiguation.
    pub per_genome_removed: PerGenomeRemovals,
    /// Number of global-filter passes actually run.
    pub passes_run: usize,
}

/// The iterative filtering and disambiguation pipeline.
pub struct FilterPipeline {
    config: PipelineConfig,
}

impl FilterPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline, mutating the world's orderings in place.
    ///
    /// Never fails: degenerate inputs (no genomes, no atoms, nothing to
    /// remove) flow through and produce empty removal sets.
    pub fn run(&self, world: &mut AtomWorld, sequences: &SequenceStore) -> FilterOutcome {
        let thresholds = self.config.thresholds();

        // Representative lengths come from the parse-time coordinates; the
        // zero-filled rebuilds of later passes must not feed the span scan.
        let lengths: Vec<i64> = world
            .occurrences
            .iter()
            .map(|placements| placements.first().map(|p| p.end - p.start).unwrap_or(0))
            .collect();

        let mut global_removed: IndexSet<AtomId> = IndexSet::new();
        let mut occurrences = world.occurrences.clone();
        let mut passes_run = 0;

        for pass in 0..self.config.iterations.max(1) {
            info!("=== iteration {} ===", pass + 1);
            passes_run = pass + 1;

            let sequence_source = (pass == 0).then_some(sequences);
            let all_stats = SegmentStats::build_all(world, &occurrences, sequence_source);
            stats::log_depth_histogram(&all_stats);

            let removals = thresholds.select_removals(&all_stats);
            if removals.is_empty() {
                info!("no more atoms to remove globally; stopping iterations");
                break;
            }
            info!("globally removing {} atoms", removals.len());

            world.remove_globally(&removals);
            global_removed.extend(removals);
            occurrences = world.rebuild_occurrences();
        }

        let adjacency = Adjacency::from_orders(&world.orders, world.num_atoms());
        let pair_contexts =
            pairs::scan(&world.orders, &lengths, &adjacency, &self.config.pair_config());
        info!("found {} candidate pairs", pair_contexts.num_pairs());

        let per_genome_removed = context::disambiguate(&pair_contexts, world);
        let scoped_total: usize = per_genome_removed.values().map(IndexSet::len).sum();
        info!("context-based removal: atoms removed in {} genomes", scoped_total);

        FilterOutcome { global_removed, per_genome_removed, passes_run }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_str(input: &str) -> AtomWorld {
        AtomWorld::parse(Cursor::new(input)).unwrap()
    }

    fn loose_config() -> PipelineConfig {
        PipelineConfig {
            min_depth: 0,
            max_length: 100,
            remove_dup: false,
            max_unique: 100,
            pair_min_in: 100,
            pair_min_out: 100,
            pair_max_span: 0,
            iterations: 1,
        }
    }

    #[test]
    fn test_degenerate_empty_input() {
        let mut world = parse_str("");
        let outcome = FilterPipeline::new(PipelineConfig::default())
            .run(&mut world, &SequenceStore::empty());
        assert!(outcome.global_removed.is_empty());
        assert!(outcome.per_genome_removed.is_empty());
        assert_eq!(outcome.passes_run, 1);
    }

    #[test]
    fn test_nothing_to_remove_converges_immediately() {
        let mut world = parse_str(
            "g1\t1\tA\t+\t0\t10\n\
             g1\t2\tB\t+\t10\t20\n",
        );
        let config = PipelineConfig { iterations: 5, ..loose_config() };
        let outcome = FilterPipeline::new(config).run(&mut world, &SequenceStore::empty());
        assert!(outcome.global_removed.is_empty());
        assert_eq!(outcome.passes_run, 1);
    }

    #[test]
    fn test_iterative_removal_cascades() {
        // B is shallow and promiscuous, so pass 1 removes it; with B gone,
        // C's contexts collapse around A and pass 2 can reconsider the
        // world without stale statistics.
        let mut world = parse_str(
            "g1\t1\tA\t+\t0\t10\n\
             g1\t2\tB\t+\t10\t20\n\
             g1\t3\tC\t+\t20\t30\n\
             g2\t1\tD\t+\t0\t10\n\
             g2\t2\tB\t+\t10\t20\n\
             g2\t3\tE\t+\t20\t30\n",
        );
        let config = PipelineConfig {
            min_depth: 3,
            max_length: 100,
            remove_dup: false,
            max_unique: 1,
            pair_min_in: 100,
            pair_min_out: 100,
            pair_max_span: 0,
            iterations: 4,
        };
        let outcome = FilterPipeline::new(config).run(&mut world, &SequenceStore::empty());
        let b = world.atom_id("B").unwrap();
        assert!(outcome.global_removed.contains(&b));
        // Orderings shrank in place.
        assert!(world.orders.iter().all(|order| order.iter().all(|e| e.atom != b)));
        // The loop stopped at the first pass that removed nothing.
        assert!(outcome.passes_run <= 4);
    }

    #[test]
    fn test_duplication_filter_applies() {
        let mut world = parse_str(
            "g1\t1\tA\t+\t0\t10\n\
             g1\t2\tA\t+\t10\t20\n\
             g1\t3\tB\t+\t20\t30\n",
        );
        let config = PipelineConfig { remove_dup: true, ..loose_config() };
        let outcome = FilterPipeline::new(config).run(&mut world, &SequenceStore::empty());
        let a = world.atom_id("A").unwrap();
        let b = world.atom_id("B").unwrap();
        assert!(outcome.global_removed.contains(&a));
        assert!(!outcome.global_removed.contains(&b));
    }
}
