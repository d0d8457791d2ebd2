//! Parsing and in-memory representation of the `.geese` annotation stream.
//!
//! Each non-comment record line carries at least six tab-separated fields:
//! `genome  ordinal  atom_class  strand  start  end`. Lines are retained
//! verbatim alongside the structured view so the final rewrite can reproduce
//! kept lines byte for byte, including records that failed structured
//! parsing.

use indexmap::IndexSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Atom class identifier, assigned in first-seen order.
pub type AtomId = u32;

/// Genome identifier, assigned in first-seen order.
pub type GenomeId = u32;

/// Reading direction of one atom occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Parse the strand field. Anything other than `-` reads as forward,
    /// matching the permissive input convention.
    pub fn from_symbol(symbol: &str) -> Strand {
        if symbol == "-" {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// One occurrence of an atom within a genome.
#[derive(Debug, Clone)]
pub struct Placement {
    pub genome: GenomeId,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
}

/// One entry of a genome's ordering: the atom and its reading direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedAtom {
    pub atom: AtomId,
    pub strand: Strand,
}

/// The ordered sequence of atom occurrences along one genome.
pub type GenomeOrder = Vec<OrientedAtom>;

/// Structured view of one successfully parsed record line.
#[derive(Debug, Clone)]
pub struct GeeseRecord {
    pub genome: String,
    pub ordinal: String,
    pub atom: String,
    pub strand: Strand,
    pub start: i64,
    pub end: i64,
}

/// One input line, kept verbatim for the final rewrite.
#[derive(Debug, Clone)]
pub enum RawLine {
    /// `#`-prefixed line, always re-emitted unchanged.
    Comment(String),
    /// Line that parsed into a full record.
    Record { text: String, record: GeeseRecord },
    /// Line skipped by structured parsing (too few fields or non-numeric
    /// coordinates) but still eligible for pass-through.
    Malformed(String),
}

impl RawLine {
    /// The verbatim line text.
    pub fn text(&self) -> &str {
        match self {
            RawLine::Comment(text) => text,
            RawLine::Record { text, .. } => text,
            RawLine::Malformed(text) => text,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, RawLine::Comment(_))
    }
}

/// The parsed annotation stream: interned atom and genome names, per-genome
/// orderings, the parse-time occurrence index, and the verbatim input lines.
///
/// Orderings only ever shrink; they are never reordered. The occurrence
/// index reflects the stream as parsed and is re-derived (with zeroed
/// coordinates) after orderings change.
#[derive(Debug, Default)]
pub struct AtomWorld {
    atoms: IndexSet<String>,
    genomes: IndexSet<String>,
    pub orders: Vec<GenomeOrder>,
    pub occurrences: Vec<Vec<Placement>>,
    pub raw_lines: Vec<RawLine>,
}

impl AtomWorld {
    /// Parse the annotation stream from a reader.
    ///
    /// Records that fail to parse are kept as [`RawLine::Malformed`] and do
    /// not contribute to the structured view; they are never fatal.
    pub fn parse<R: BufRead>(reader: R) -> Result<AtomWorld> {
        let mut world = AtomWorld::default();
        for line in reader.lines() {
            let line = line?;
            world.push_line(line);
        }
        Ok(world)
    }

    /// Parse the annotation stream from a file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<AtomWorld> {
        let file = File::open(path)?;
        AtomWorld::parse(BufReader::new(file))
    }

    fn push_line(&mut self, line: String) {
        if line.starts_with('#') {
            self.raw_lines.push(RawLine::Comment(line));
            return;
        }
        match parse_record(&line) {
            Some(record) => {
                self.insert_record(&record);
                self.raw_lines.push(RawLine::Record { text: line, record });
            }
            None => self.raw_lines.push(RawLine::Malformed(line)),
        }
    }

    fn insert_record(&mut self, record: &GeeseRecord) {
        let (atom_idx, _) = self.atoms.insert_full(record.atom.clone());
        let atom = atom_idx as AtomId;
        let (genome_idx, _) = self.genomes.insert_full(record.genome.clone());
        let genome = genome_idx as GenomeId;

        if self.orders.len() <= genome_idx {
            self.orders.push(Vec::new());
        }
        if self.occurrences.len() <= atom_idx {
            self.occurrences.push(Vec::new());
        }
        self.orders[genome_idx].push(OrientedAtom { atom, strand: record.strand });
        self.occurrences[atom_idx].push(Placement {
            genome,
            start: record.start,
            end: record.end,
            strand: record.strand,
        });
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_genomes(&self) -> usize {
        self.genomes.len()
    }

    pub fn atom_name(&self, id: AtomId) -> &str {
        &self.atoms[id as usize]
    }

    pub fn genome_name(&self, id: GenomeId) -> &str {
        &self.genomes[id as usize]
    }

    pub fn atom_id(&self, name: &str) -> Option<AtomId> {
        self.atoms.get_index_of(name).map(|idx| idx as AtomId)
    }

    pub fn genome_id(&self, name: &str) -> Option<GenomeId> {
        self.genomes.get_index_of(name).map(|idx| idx as GenomeId)
    }

    /// Drop every occurrence of the given atoms from every genome ordering.
    pub fn remove_globally(&mut self, removed: &IndexSet<AtomId>) {
        for order in &mut self.orders {
            order.retain(|entry| !removed.contains(&entry.atom));
        }
    }

    /// Re-derive the occurrence index from the current orderings.
    ///
    /// Coordinates are zeroed: after the first filtering pass only depth and
    /// adjacency matter, so positions are no longer meaningful.
    pub fn rebuild_occurrences(&self) -> Vec<Vec<Placement>> {
        let mut occurrences = vec![Vec::new(); self.num_atoms()];
        for (genome_idx, order) in self.orders.iter().enumerate() {
            for entry in order {
                occurrences[entry.atom as usize].push(Placement {
                    genome: genome_idx as GenomeId,
                    start: 0,
                    end: 0,
                    strand: entry.strand,
                });
            }
        }
        occurrences
    }
}

/// Parse one record line, returning `None` when the line has fewer than six
/// tab-separated fields or non-integer coordinates.
fn parse_record(line: &str) -> Option<GeeseRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 6 {
        return None;
    }
    let start: i64 = fields[4].parse().ok()?;
    let end: i64 = fields[5].parse().ok()?;
    Some(GeeseRecord {
        genome: fields[0].to_string(),
        ordinal: fields[1].to_string(),
        atom: fields[2].to_string(),
        strand: Strand::from_symbol(fields[3]),
        start,
        end,
    })
}
