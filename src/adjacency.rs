//! Strand-aware predecessor/successor sets over all genome orderings.

use indexmap::IndexSet;
use itertools::Itertools;

use crate::record::{AtomId, GenomeOrder, Strand};

/// Distinct neighbor sets per atom, relative to each occurrence's own
/// reading direction: for a minus-strand occurrence the roles of the
/// coordinate-order neighbors are swapped.
#[derive(Debug)]
pub struct Adjacency {
    incoming: Vec<IndexSet<AtomId>>,
    outgoing: Vec<IndexSet<AtomId>>,
}

impl Adjacency {
    pub fn from_orders(orders: &[GenomeOrder], num_atoms: usize) -> Adjacency {
        let mut adjacency = Adjacency {
            incoming: vec![IndexSet::new(); num_atoms],
            outgoing: vec![IndexSet::new(); num_atoms],
        };
        for order in orders {
            for (left, right) in order.iter().tuple_windows() {
                // right follows left in coordinate order
                match left.strand {
                    Strand::Forward => adjacency.outgoing[left.atom as usize].insert(right.atom),
                    Strand::Reverse => adjacency.incoming[left.atom as usize].insert(right.atom),
                };
                match right.strand {
                    Strand::Forward => adjacency.incoming[right.atom as usize].insert(left.atom),
                    Strand::Reverse => adjacency.outgoing[right.atom as usize].insert(left.atom),
                };
            }
        }
        adjacency
    }

    /// Number of distinct atoms observed entering this atom.
    pub fn fan_in(&self, atom: AtomId) -> usize {
        self.incoming[atom as usize].len()
    }

    /// Number of distinct atoms observed leaving this atom.
    pub fn fan_out(&self, atom: AtomId) -> usize {
        self.outgoing[atom as usize].len()
    }

    pub fn incoming(&self, atom: AtomId) -> &IndexSet<AtomId> {
        &self.incoming[atom as usize]
    }

    pub fn outgoing(&self, atom: AtomId) -> &IndexSet<AtomId> {
        &self.outgoing[atom as usize]
    }
}
