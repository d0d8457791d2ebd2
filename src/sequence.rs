//! FASTA sequence source for representative atom sequences.
//!
//! Genomes are classified as chromosome or plasmid from explicit
//! `chromosome=true` / `plasmid=true` tokens in their FASTA headers. A
//! genome with no sequence in the store simply yields an empty
//! representative sequence; that is never an error.

use indexmap::IndexMap;
use needletail::parse_fastx_file;
use std::path::Path;

use crate::error::Result;

/// Replication-unit classification derived from FASTA header metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqLocation {
    Chromosome,
    Plasmid,
    Unclassified,
}

/// Sequence and header-derived metadata for one genome.
#[derive(Debug, Clone)]
pub struct GenomeSequence {
    pub residues: Vec<u8>,
    pub location: SeqLocation,
}

/// Mapping from genome name to its nucleotide sequence and classification.
#[derive(Debug, Default)]
pub struct SequenceStore {
    sequences: IndexMap<String, GenomeSequence>,
}

impl SequenceStore {
    /// Load sequences from a FASTA file.
    ///
    /// The genome name is the first whitespace-delimited token of the
    /// header; the remaining tokens are scanned for location markers.
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut store = SequenceStore::default();
        let mut reader = parse_fastx_file(path.as_ref())?;
        while let Some(record) = reader.next() {
            let record = record?;
            let header = String::from_utf8_lossy(record.id()).into_owned();
            let name = match header.split_whitespace().next() {
                Some(token) => token.to_string(),
                None => continue,
            };
            let location = classify_header(&header);
            let residues = record.seq().into_owned();
            store.sequences.insert(name, GenomeSequence { residues, location });
        }
        Ok(store)
    }

    /// An empty store; every genome then has an empty representative.
    pub fn empty() -> Self {
        SequenceStore::default()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn location(&self, genome: &str) -> SeqLocation {
        self.sequences
            .get(genome)
            .map(|entry| entry.location)
            .unwrap_or(SeqLocation::Unclassified)
    }

    /// Extract `[start, end)` from a genome, reverse-complemented for minus
    /// strand occurrences. Out-of-range coordinates are clamped; a missing
    /// genome yields an empty sequence.
    pub fn fragment(&self, genome: &str, start: i64, end: i64, reverse: bool) -> Vec<u8> {
        let Some(entry) = self.sequences.get(genome) else {
            return Vec::new();
        };
        let len = entry.residues.len() as i64;
        let lo = start.clamp(0, len) as usize;
        let hi = end.clamp(0, len) as usize;
        if lo >= hi {
            return Vec::new();
        }
        let fragment = &entry.residues[lo..hi];
        if reverse {
            reverse_complement(fragment)
        } else {
            fragment.to_vec()
        }
    }
}

fn classify_header(header: &str) -> SeqLocation {
    if header.contains("chromosome=true") {
        SeqLocation::Chromosome
    } else if header.contains("plasmid=true") {
        SeqLocation::Plasmid
    } else {
        SeqLocation::Unclassified
    }
}

/// Complement one nucleotide, preserving case. Ambiguity codes pass through.
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        other => other,
    }
}

/// Reverse complement of a nucleotide sequence.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&base| complement(base)).collect()
}
