//! Final rewrite of the annotation stream and the optional side reports.
//!
//! The rewrite is a single pass over the verbatim input lines: comments and
//! lines with fewer than three fields pass through unchanged; a record line
//! is dropped exactly when its atom was removed globally or in that
//! genome. Kept lines are emitted byte for byte, in input order.

use indexmap::{IndexMap, IndexSet};
use std::io::Write;

use crate::context::PerGenomeRemovals;
use crate::record::{AtomId, AtomWorld};
use crate::sequence::{SeqLocation, SequenceStore};

/// Write the filtered stream to `out`.
pub fn write_filtered<W: Write>(
    world: &AtomWorld,
    global_removed: &IndexSet<AtomId>,
    per_genome_removed: &PerGenomeRemovals,
    mut out: W,
) -> std::io::Result<()> {
    for line in &world.raw_lines {
        if line.is_comment() {
            writeln!(out, "{}", line.text())?;
            continue;
        }
        let text = line.text();
        if drop_line(world, global_removed, per_genome_removed, text) {
            continue;
        }
        writeln!(out, "{}", text)?;
    }
    Ok(())
}

/// The drop decision re-splits the raw text so that lines which failed full
/// parsing but still name a genome and an atom are filtered consistently.
fn drop_line(
    world: &AtomWorld,
    global_removed: &IndexSet<AtomId>,
    per_genome_removed: &PerGenomeRemovals,
    text: &str,
) -> bool {
    let fields: Vec<&str> = text.split('\t').collect();
    if fields.len() < 3 {
        return false;
    }
    let Some(atom) = world.atom_id(fields[2]) else {
        return false;
    };
    if global_removed.contains(&atom) {
        return true;
    }
    world
        .genome_id(fields[0])
        .and_then(|genome| per_genome_removed.get(&genome))
        .is_some_and(|atoms| atoms.contains(&atom))
}

/// Write the globally removed atom names, one per line, in removal order.
pub fn write_removed_atoms<W: Write>(
    world: &AtomWorld,
    global_removed: &IndexSet<AtomId>,
    mut out: W,
) -> std::io::Result<()> {
    for atom in global_removed {
        writeln!(out, "{}", world.atom_name(*atom))?;
    }
    Ok(())
}

/// Write the surviving atoms that occur in at least one chromosome genome
/// and at least one plasmid genome, one per line, in first-seen order.
pub fn write_dual_location_atoms<W: Write>(
    world: &AtomWorld,
    sequences: &SequenceStore,
    mut out: W,
) -> std::io::Result<()> {
    let mut seen: IndexMap<AtomId, (bool, bool)> = IndexMap::new();
    for (genome_idx, order) in world.orders.iter().enumerate() {
        let location = sequences.location(world.genome_name(genome_idx as u32));
        if location == SeqLocation::Unclassified {
            continue;
        }
        for entry in order {
            let flags = seen.entry(entry.atom).or_insert((false, false));
            match location {
                SeqLocation::Chromosome => flags.0 = true,
                SeqLocation::Plasmid => flags.1 = true,
                SeqLocation::Unclassified => {}
            }
        }
    }
    for (atom, (on_chromosome, on_plasmid)) in seen {
        if on_chromosome && on_plasmid {
            writeln!(out, "{}", world.atom_name(atom))?;
        }
    }
    Ok(())
}
