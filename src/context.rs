//! Resolving per-atom ambiguity: each atom implicated in a between-tuple is
//! kept only in its dominant local context.
//!
//! An atom's context is its immediate neighbor pair, normalized to the
//! atom's own reading direction: a minus-strand occurrence swaps
//! predecessor and successor. The context supported by the most genomes is
//! canonical; the atom is scheduled for removal from every genome where it
//! appears in any other context. Removals are applied only after every pair
//! has been processed.

use indexmap::{IndexMap, IndexSet};

use crate::pairs::PairContexts;
use crate::record::{AtomId, AtomWorld, GenomeId, GenomeOrder, Strand};

/// Strand-normalized immediate neighbor pair. `None` marks an ordering
/// boundary.
pub type ContextKey = (Option<AtomId>, Option<AtomId>);

/// Per-genome removal schedule: genome -> atoms to drop there.
pub type PerGenomeRemovals = IndexMap<GenomeId, IndexSet<AtomId>>;

/// Resolve every atom appearing in any between-tuple to its canonical
/// context and apply the resulting per-genome removals to the orderings.
///
/// The canonical context is the one backed by the largest genome set; ties
/// keep the first context encountered. An atom touched through several
/// pairs resolves identically each time, so it is examined once.
pub fn disambiguate(contexts: &PairContexts, world: &mut AtomWorld) -> PerGenomeRemovals {
    let mut removals: PerGenomeRemovals = IndexMap::new();
    let mut examined: IndexSet<AtomId> = IndexSet::new();

    for tuples in contexts.map.values() {
        let mut implicated: IndexSet<AtomId> = IndexSet::new();
        for between in tuples.keys() {
            implicated.extend(between.iter().copied());
        }
        for atom in implicated {
            if !examined.insert(atom) {
                continue;
            }
            schedule_removals(atom, &world.orders, &mut removals);
        }
    }

    for (genome, atoms) in &removals {
        world.orders[*genome as usize].retain(|entry| !atoms.contains(&entry.atom));
    }
    removals
}

/// Group genomes by the context they exhibit for `atom`, pick the dominant
/// one, and schedule the atom's removal everywhere else.
fn schedule_removals(atom: AtomId, orders: &[GenomeOrder], removals: &mut PerGenomeRemovals) {
    let by_context = contexts_of(atom, orders);
    let Some(canonical) = dominant_context(&by_context) else {
        return;
    };
    for (context, genomes) in &by_context {
        if *context == canonical {
            continue;
        }
        for genome in genomes {
            removals.entry(*genome).or_default().insert(atom);
        }
    }
}

/// Every strand-normalized context `atom` exhibits, mapped to the genomes
/// showing it, in first-seen order.
pub fn contexts_of(atom: AtomId, orders: &[GenomeOrder]) -> IndexMap<ContextKey, IndexSet<GenomeId>> {
    let mut by_context: IndexMap<ContextKey, IndexSet<GenomeId>> = IndexMap::new();
    for (genome_idx, order) in orders.iter().enumerate() {
        for (idx, entry) in order.iter().enumerate() {
            if entry.atom != atom {
                continue;
            }
            let prev = if idx > 0 { Some(order[idx - 1].atom) } else { None };
            let next = order.get(idx + 1).map(|following| following.atom);
            let context = match entry.strand {
                Strand::Forward => (prev, next),
                Strand::Reverse => (next, prev),
            };
            by_context.entry(context).or_default().insert(genome_idx as GenomeId);
        }
    }
    by_context
}

/// The context with the largest genome support; ties keep the earliest.
pub fn dominant_context(
    by_context: &IndexMap<ContextKey, IndexSet<GenomeId>>,
) -> Option<ContextKey> {
    let mut best: Option<(ContextKey, usize)> = None;
    for (context, genomes) in by_context {
        let support = genomes.len();
        match best {
            Some((_, best_support)) if support <= best_support => {}
            _ => best = Some((*context, support)),
        }
    }
    best.map(|(context, _)| context)
}
