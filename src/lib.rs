//! Iterative atom filtering and context disambiguation for pangenome
//! annotation streams.
//!
//! A `.geese` file records, per genome, the ordered occurrences of repeated
//! structural units ("atoms"). This crate decides which atoms to drop
//! globally, and which to drop only in specific genomes, so that the
//! downstream sequence graph built from the surviving records stays simple:
//!
//! 1. parse the annotation stream into per-genome atom orderings,
//! 2. iteratively remove atoms failing global depth/length/duplication
//!    thresholds, rebuilding statistics between passes,
//! 3. find well-connected atom pairs and the material between them,
//! 4. keep each implicated atom only in its dominant local context,
//! 5. rewrite the original stream, preserving kept lines byte for byte.

pub mod adjacency;
pub mod context;
pub mod error;
pub mod filter;
pub mod pairs;
pub mod pipeline;
pub mod record;
pub mod rewrite;
pub mod sequence;
pub mod stats;

pub use crate::error::{FilterError, Result};
pub use crate::pipeline::{FilterOutcome, FilterPipeline, PipelineConfig};
pub use crate::record::{AtomId, AtomWorld, GenomeId, Strand};
pub use crate::sequence::SequenceStore;
