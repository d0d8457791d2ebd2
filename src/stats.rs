//! Per-atom structural statistics derived from the current orderings.
//!
//! Depth, representative length, duplication, and the unique-context count
//! drive the global filter. Statistics are always rebuilt from the current
//! occurrence index and orderings; stale values never cross a filtering
//! pass.

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use tracing::debug;

use crate::record::{AtomId, AtomWorld, GenomeOrder, Placement, Strand};
use crate::sequence::SequenceStore;

/// Structural statistics for one atom class.
#[derive(Debug, Clone, Default)]
pub struct SegmentStats {
    /// Total occurrence count across all genomes.
    pub depth: usize,
    /// Span of the first recorded occurrence (`end - start`).
    pub length: i64,
    /// True when any single genome carries the atom more than once.
    pub duplicated: bool,
    /// Count of structurally distinct neighbor contexts.
    pub unique_context: usize,
    /// Representative sequence from the first occurrence; empty when no
    /// sequence source covers that genome.
    pub sequence: Vec<u8>,
}

impl SegmentStats {
    /// Build statistics for every atom from the given occurrence index and
    /// the world's current orderings. The sequence source is consulted only
    /// when provided; later filtering passes run without it because
    /// coordinates are zeroed by then.
    pub fn build_all(
        world: &AtomWorld,
        occurrences: &[Vec<Placement>],
        sequences: Option<&SequenceStore>,
    ) -> Vec<SegmentStats> {
        let unique = unique_contexts(&world.orders, world.num_atoms());
        let mut all = Vec::with_capacity(world.num_atoms());
        for (atom_idx, placements) in occurrences.iter().enumerate() {
            let mut stats = SegmentStats {
                depth: placements.len(),
                unique_context: unique[atom_idx],
                ..SegmentStats::default()
            };
            let mut per_genome: IndexMap<u32, usize> = IndexMap::new();
            for placement in placements {
                *per_genome.entry(placement.genome).or_insert(0) += 1;
            }
            stats.duplicated = per_genome.values().any(|&count| count > 1);
            if let Some(first) = placements.first() {
                stats.length = first.end - first.start;
                if let Some(store) = sequences {
                    stats.sequence = store.fragment(
                        world.genome_name(first.genome),
                        first.start,
                        first.end,
                        first.strand == Strand::Reverse,
                    );
                }
            }
            all.push(stats);
        }
        all
    }
}

/// Count, per atom, how many of its raw `(predecessor, successor)` neighbor
/// pairs are novel: scanning pairs in first-seen order, a pair counts only
/// when neither side has appeared in an already-counted pair. Contexts that
/// merely vary one side while repeating the other are discounted.
pub fn unique_contexts(orders: &[GenomeOrder], num_atoms: usize) -> Vec<usize> {
    type NeighborPair = (Option<AtomId>, Option<AtomId>);

    // Per-genome collection is independent; merge in genome order so the
    // pair sets keep a reproducible first-seen order.
    let per_genome: Vec<Vec<(AtomId, NeighborPair)>> = orders
        .par_iter()
        .map(|order| {
            let mut local = Vec::with_capacity(order.len());
            for (idx, entry) in order.iter().enumerate() {
                let prev = if idx > 0 { Some(order[idx - 1].atom) } else { None };
                let next = order.get(idx + 1).map(|following| following.atom);
                local.push((entry.atom, (prev, next)));
            }
            local
        })
        .collect();

    let mut pairs: Vec<IndexSet<NeighborPair>> = vec![IndexSet::new(); num_atoms];
    for genome_pairs in per_genome {
        for (atom, pair) in genome_pairs {
            pairs[atom as usize].insert(pair);
        }
    }

    pairs
        .into_iter()
        .map(|atom_pairs| {
            let mut seen_prev: IndexSet<Option<AtomId>> = IndexSet::new();
            let mut seen_next: IndexSet<Option<AtomId>> = IndexSet::new();
            let mut count = 0;
            for (prev, next) in atom_pairs {
                if !seen_prev.contains(&prev) && !seen_next.contains(&next) {
                    count += 1;
                    seen_prev.insert(prev);
                    seen_next.insert(next);
                }
            }
            count
        })
        .collect()
}

/// Log a `depth -> number of atoms` histogram at debug level.
pub fn log_depth_histogram(all: &[SegmentStats]) {
    let mut histogram: Vec<usize> = Vec::new();
    for stats in all {
        if stats.depth == 0 {
            continue;
        }
        if histogram.len() <= stats.depth {
            histogram.resize(stats.depth + 1, 0);
        }
        histogram[stats.depth] += 1;
    }
    debug!("atom count histogram by depth: {:?}", histogram);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AtomWorld;
    use std::io::Cursor;

    fn parse_str(input: &str) -> AtomWorld {
        AtomWorld::parse(Cursor::new(input)).unwrap()
    }

    #[test]
    fn test_depth_length_duplication() {
        let world = parse_str(
            "g1\t1\tA\t+\t0\t100\n\
             g1\t2\tB\t+\t100\t150\n\
             g1\t3\tA\t+\t150\t260\n\
             g2\t1\tB\t-\t0\t50\n",
        );
        let all = SegmentStats::build_all(&world, &world.occurrences, None);
        let a = world.atom_id("A").unwrap() as usize;
        let b = world.atom_id("B").unwrap() as usize;

        assert_eq!(all[a].depth, 2);
        assert_eq!(all[a].length, 100);
        assert!(all[a].duplicated);

        assert_eq!(all[b].depth, 2);
        assert_eq!(all[b].length, 50);
        assert!(!all[b].duplicated);
    }

    #[test]
    fn test_representative_sequence() {
        use std::io::Write;
        let mut fasta = tempfile::NamedTempFile::new().unwrap();
        fasta.write_all(b">g1\nAAACCCGGGTTT\n").unwrap();
        fasta.flush().unwrap();
        let store = SequenceStore::from_fasta(fasta.path()).unwrap();

        let world = parse_str(
            "g1\t1\tA\t+\t0\t3\n\
             g1\t2\tB\t-\t3\t6\n\
             g2\t1\tC\t+\t0\t5\n",
        );
        let all = SegmentStats::build_all(&world, &world.occurrences, Some(&store));
        let a = world.atom_id("A").unwrap() as usize;
        let b = world.atom_id("B").unwrap() as usize;
        let c = world.atom_id("C").unwrap() as usize;

        assert_eq!(all[a].sequence, b"AAA");
        assert_eq!(all[b].sequence, b"GGG"); // revcomp of CCC
        assert!(all[c].sequence.is_empty()); // g2 has no sequence
        assert_eq!(all[c].length, 5);
    }

    #[test]
    fn test_unique_contexts_discounts_shared_neighbors() {
        // B occurs with contexts (A, C) and (A, D): the second pair repeats
        // predecessor A, so only one context counts.
        let world = parse_str(
            "g1\t1\tA\t+\t0\t10\n\
             g1\t2\tB\t+\t10\t20\n\
             g1\t3\tC\t+\t20\t30\n\
             g2\t1\tA\t+\t0\t10\n\
             g2\t2\tB\t+\t10\t20\n\
             g2\t3\tD\t+\t20\t30\n",
        );
        let unique = unique_contexts(&world.orders, world.num_atoms());
        let b = world.atom_id("B").unwrap() as usize;
        assert_eq!(unique[b], 1);
    }

    #[test]
    fn test_unique_contexts_counts_disjoint_neighborhoods() {
        let world = parse_str(
            "g1\t1\tA\t+\t0\t10\n\
             g1\t2\tX\t+\t10\t20\n\
             g1\t3\tB\t+\t20\t30\n\
             g2\t1\tC\t+\t0\t10\n\
             g2\t2\tX\t+\t10\t20\n\
             g2\t3\tD\t+\t20\t30\n",
        );
        let unique = unique_contexts(&world.orders, world.num_atoms());
        let x = world.atom_id("X").unwrap() as usize;
        assert_eq!(unique[x], 2);
    }

    #[test]
    fn test_unique_contexts_endpoints_use_none() {
        let world = parse_str("g1\t1\tA\t+\t0\t10\n");
        let unique = unique_contexts(&world.orders, world.num_atoms());
        // Single placement: context (None, None) counts once.
        assert_eq!(unique[0], 1);
    }

    #[test]
    fn test_empty_world() {
        let world = parse_str("");
        let all = SegmentStats::build_all(&world, &world.occurrences, None);
        assert!(all.is_empty());
    }
}
