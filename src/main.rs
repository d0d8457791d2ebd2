use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geese_filter::error::Result;
use geese_filter::pipeline::{FilterPipeline, PipelineConfig};
use geese_filter::record::AtomWorld;
use geese_filter::rewrite;
use geese_filter::sequence::SequenceStore;

/// Command line arguments for geese-filter.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input atom annotation file (.geese)
    geese_in: PathBuf,

    /// FASTA file with the genome sequences
    fasta: PathBuf,

    /// Final filtered .geese output
    #[arg(short, long)]
    output: PathBuf,

    /// Atoms with fewer occurrences are removal candidates
    #[arg(long, default_value_t = 10)]
    min_depth: usize,

    /// Only atoms up to this length are eligible for depth-based removal
    #[arg(long, default_value_t = 10_000)]
    max_length: i64,

    /// Remove atoms duplicated within a single genome
    #[arg(long)]
    remove_dup: bool,

    /// Removal requires more unique contexts than this
    #[arg(long, default_value_t = 1)]
    max_unique: usize,

    /// Minimum distinct successor count of a pair's left endpoint
    #[arg(long, default_value_t = 2)]
    pair_min_in: usize,

    /// Minimum distinct predecessor count of a pair's right endpoint
    #[arg(long, default_value_t = 2)]
    pair_min_out: usize,

    /// Maximum cumulative atom span of a candidate pair
    #[arg(long, default_value_t = 70_000)]
    pair_max_span: i64,

    /// Repeat the global filter this many times, recomputing depths and
    /// contexts between passes
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    iterations: u32,

    /// Optional: write the plain list of globally removed atoms
    #[arg(long)]
    removed_out: Option<PathBuf>,

    /// Optional: write the atoms found on both chromosomes and plasmids
    #[arg(long)]
    both_locations_out: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let sequences = SequenceStore::from_fasta(&args.fasta)?;
    let mut world = AtomWorld::from_path(&args.geese_in)?;
    info!(
        "loaded {} atoms across {} genomes ({} sequences)",
        world.num_atoms(),
        world.num_genomes(),
        sequences.len()
    );

    let config = PipelineConfig {
        min_depth: args.min_depth,
        max_length: args.max_length,
        remove_dup: args.remove_dup,
        max_unique: args.max_unique,
        pair_min_in: args.pair_min_in,
        pair_min_out: args.pair_min_out,
        pair_max_span: args.pair_max_span,
        iterations: args.iterations as usize,
    };
    let outcome = FilterPipeline::new(config).run(&mut world, &sequences);

    let out = File::create(&args.output)?;
    rewrite::write_filtered(
        &world,
        &outcome.global_removed,
        &outcome.per_genome_removed,
        BufWriter::new(out),
    )?;
    info!("wrote filtered output to {}", args.output.display());

    if let Some(path) = &args.removed_out {
        let out = File::create(path)?;
        rewrite::write_removed_atoms(&world, &outcome.global_removed, BufWriter::new(out))?;
        info!("wrote {} removed atom names to {}", outcome.global_removed.len(), path.display());
    }
    if let Some(path) = &args.both_locations_out {
        let out = File::create(path)?;
        rewrite::write_dual_location_atoms(&world, &sequences, BufWriter::new(out))?;
        info!("wrote dual-location atom report to {}", path.display());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
