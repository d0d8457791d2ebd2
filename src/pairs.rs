//! Scanning genome orderings for well-connected atom pairs and the material
//! lying between them.
//!
//! For an ordered pair `(a, b)` co-occurring within one genome, the tuple of
//! atoms strictly between them is recorded together with every genome
//! exhibiting that exact arrangement. Only pairs whose endpoints carry
//! enough distinct-neighbor diversity, and whose cumulative span stays
//! within a budget, are considered.

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;

use crate::adjacency::Adjacency;
use crate::record::{AtomId, GenomeId, GenomeOrder};

/// Connectivity and span limits for the pair scan.
#[derive(Debug, Clone)]
pub struct PairScanConfig {
    /// Minimum distinct successor count of the left endpoint.
    pub min_in: usize,
    /// Minimum distinct predecessor count of the right endpoint.
    pub min_out: usize,
    /// Maximum cumulative atom length from the left endpoint through the
    /// right endpoint, inclusive of both.
    pub max_span: i64,
}

impl Default for PairScanConfig {
    fn default() -> Self {
        Self { min_in: 2, min_out: 2, max_span: 70_000 }
    }
}

/// The atoms strictly between a pair's endpoints in one genome.
pub type BetweenTuple = Vec<AtomId>;

/// Two-level accumulation: ordered pair -> between-tuple -> genomes
/// exhibiting that exact arrangement.
#[derive(Debug, Default)]
pub struct PairContexts {
    pub map: IndexMap<(AtomId, AtomId), IndexMap<BetweenTuple, IndexSet<GenomeId>>>,
}

impl PairContexts {
    pub fn num_pairs(&self) -> usize {
        self.map.len()
    }
}

/// Scan every genome ordering for qualifying pairs.
///
/// `lengths` maps each atom id to its representative length. Genomes are
/// scanned independently and merged in input order, so the accumulated maps
/// keep a reproducible first-seen order.
pub fn scan(
    orders: &[GenomeOrder],
    lengths: &[i64],
    adjacency: &Adjacency,
    config: &PairScanConfig,
) -> PairContexts {
    let per_genome: Vec<Vec<((AtomId, AtomId), BetweenTuple)>> = orders
        .par_iter()
        .map(|order| scan_genome(order, lengths, adjacency, config))
        .collect();

    let mut contexts = PairContexts::default();
    for (genome_idx, found) in per_genome.into_iter().enumerate() {
        for (pair, between) in found {
            contexts
                .map
                .entry(pair)
                .or_default()
                .entry(between)
                .or_default()
                .insert(genome_idx as GenomeId);
        }
    }
    contexts
}

fn scan_genome(
    order: &GenomeOrder,
    lengths: &[i64],
    adjacency: &Adjacency,
    config: &PairScanConfig,
) -> Vec<((AtomId, AtomId), BetweenTuple)> {
    let n = order.len();
    let mut prefix = vec![0i64; n + 1];
    for (idx, entry) in order.iter().enumerate() {
        prefix[idx + 1] = prefix[idx] + lengths.get(entry.atom as usize).copied().unwrap_or(0);
    }

    let mut found = Vec::new();
    for i in 0..n {
        let a = order[i].atom;
        if adjacency.fan_out(a) < config.min_in {
            continue;
        }
        for j in (i + 1)..n {
            // Orderings are position-sorted and lengths are non-negative in
            // practice, so the span never shrinks as j grows: once over
            // budget, no later j can qualify.
            let span = prefix[j + 1] - prefix[i];
            if span > config.max_span {
                break;
            }
            let b = order[j].atom;
            if adjacency.fan_in(b) < config.min_out {
                continue;
            }
            let between: BetweenTuple =
                order[i + 1..j].iter().map(|entry| entry.atom).collect();
            found.push(((a, b), between));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AtomWorld;
    use std::io::Cursor;

    fn parse_str(input: &str) -> AtomWorld {
        AtomWorld::parse(Cursor::new(input)).unwrap()
    }

    fn lengths_of(world: &AtomWorld) -> Vec<i64> {
        world
            .occurrences
            .iter()
            .map(|placements| placements.first().map(|p| p.end - p.start).unwrap_or(0))
            .collect()
    }

    // Two genomes sharing the A..D flanks so both endpoints accumulate the
    // neighbor diversity the scan demands.
    const TWO_GENOMES: &str = "g1\t1\tA\t+\t0\t10\n\
                               g1\t2\tB\t+\t10\t20\n\
                               g1\t3\tD\t+\t20\t30\n\
                               g2\t1\tA\t+\t0\t10\n\
                               g2\t2\tC\t+\t10\t20\n\
                               g2\t3\tD\t+\t20\t30\n";

    #[test]
    fn test_records_between_tuples_with_genomes() {
        let world = parse_str(TWO_GENOMES);
        let adjacency = Adjacency::from_orders(&world.orders, world.num_atoms());
        let lengths = lengths_of(&world);
        let config = PairScanConfig { min_in: 2, min_out: 2, max_span: 1000 };
        let contexts = scan(&world.orders, &lengths, &adjacency, &config);

        let a = world.atom_id("A").unwrap();
        let b = world.atom_id("B").unwrap();
        let c = world.atom_id("C").unwrap();
        let d = world.atom_id("D").unwrap();

        // Only A has fan-out 2 and only D has fan-in 2.
        assert_eq!(contexts.num_pairs(), 1);
        let tuples = contexts.map.get(&(a, d)).unwrap();
        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples.get(&vec![b]).unwrap().len(), 1);
        assert_eq!(tuples.get(&vec![c]).unwrap().len(), 1);
    }

    #[test]
    fn test_same_arrangement_collects_genomes() {
        let world = parse_str(
            "g1\t1\tA\t+\t0\t10\n\
             g1\t2\tB\t+\t10\t20\n\
             g1\t3\tD\t+\t20\t30\n\
             g2\t1\tA\t+\t0\t10\n\
             g2\t2\tB\t+\t10\t20\n\
             g2\t3\tD\t+\t20\t30\n\
             g3\t1\tA\t+\t0\t10\n\
             g3\t2\tC\t+\t10\t20\n\
             g3\t3\tD\t+\t20\t30\n",
        );
        let adjacency = Adjacency::from_orders(&world.orders, world.num_atoms());
        let lengths = lengths_of(&world);
        let config = PairScanConfig { min_in: 2, min_out: 2, max_span: 1000 };
        let contexts = scan(&world.orders, &lengths, &adjacency, &config);

        let a = world.atom_id("A").unwrap();
        let b = world.atom_id("B").unwrap();
        let d = world.atom_id("D").unwrap();
        let tuples = contexts.map.get(&(a, d)).unwrap();
        assert_eq!(tuples.get(&vec![b]).unwrap().len(), 2); // g1 and g2
    }

    #[test]
    fn test_span_budget_prunes_distant_pairs() {
        let world = parse_str(TWO_GENOMES);
        let adjacency = Adjacency::from_orders(&world.orders, world.num_atoms());
        let lengths = lengths_of(&world);
        // A(10) + B(10) + D(10) = 30 exceeds 25, so (A, D) is out of reach.
        let config = PairScanConfig { min_in: 2, min_out: 2, max_span: 25 };
        let contexts = scan(&world.orders, &lengths, &adjacency, &config);
        assert_eq!(contexts.num_pairs(), 0);
    }

    #[test]
    fn test_zero_span_never_reaches_past_adjacency() {
        // The span includes both endpoints, so with positive lengths a zero
        // budget can never record a non-adjacent pair: every recorded
        // between-tuple must be empty.
        let world = parse_str(TWO_GENOMES);
        let adjacency = Adjacency::from_orders(&world.orders, world.num_atoms());
        let lengths = lengths_of(&world);
        let config = PairScanConfig { min_in: 0, min_out: 0, max_span: 0 };
        let contexts = scan(&world.orders, &lengths, &adjacency, &config);
        assert!(contexts
            .map
            .values()
            .all(|tuples| tuples.keys().all(|between| between.is_empty())));
    }

    #[test]
    fn test_empty_orders_yield_no_pairs() {
        let world = parse_str("");
        let adjacency = Adjacency::from_orders(&world.orders, 0);
        let contexts = scan(&world.orders, &[], &adjacency, &PairScanConfig::default());
        assert_eq!(contexts.num_pairs(), 0);
    }
}
