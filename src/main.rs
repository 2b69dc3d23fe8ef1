//! # gffkit
//!
//! Clean up and enrich GFF/GTF annotations in batch passes.
//!
//! ## Usage
//!
//! ```bash
//! gffkit -i <INPUT> -o <OUTPUT> [OPTIONS]
//!
//! Required arguments:
//!   -i, --input <GFF>          Path to GFF/GTF file (optionally gzipped)
//!   -o, --output <OUT>         Path to output GFF file
//!
//! Optional arguments:
//!   -d, --discards <DISCARDS>  Path to write discarded records
//!   -g, --group <TAG>          Attribute tag to group by [default: transcript_id]
//!       --by-type              Group by feature type instead
//!   -I, --include <TYPES>      Feature types to keep (comma-separated)
//!   -E, --exclude <TYPES>      Feature types to drop (comma-separated)
//!   -s, --sort                 Sort groups and features by position
//!       --remove-overlaps      Drop groups overlapping a better-scoring group
//!       --fix-start-stop       Include start codons and exclude stop codons in CDS
//!       --utrs                 Derive UTRs
//!       --introns              Derive introns
//!       --signals              Derive start/stop codons and splice sites
//!       --gene-id              Prefix attributes with gene_id "<group>"
//!       --flatten              Merge adjacent features
//!       --flatten-within-groups  Merge adjacent features of the same group
//!   -L, --level <LEVEL>        Log level [default: info]
//!   -h, --help                 Print help
//!   -V, --version              Print version
//! ```
//!
//! ## Examples
//!
//! ### Add UTRs and introns to a transcript annotation
//!
//! ```bash
//! gffkit -i annotations.gtf -o enriched.gff --sort --utrs --introns
//! ```
//!
//! ### Keep only coding records and resolve competing predictions
//!
//! ```bash
//! gffkit -i predictions.gff.gz -o clean.gff -I CDS,start_codon,stop_codon \
//!     --sort --remove-overlaps -d dropped.gff
//! ```

use clap::Parser;
use gffkit::{run, Args, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    simple_logger::init_with_level(args.level)?;
    log::debug!("{:?}", args);
    args.check()?;

    let config = Config::from_args(&args);
    let stats = run(&config)?;
    log::info!("Elapsed: {:.4?} secs", stats.elapsed.as_secs_f32());
    log::info!(
        "{} features in, {} out, {} discarded, {} merged",
        stats.features_in,
        stats.features_out,
        stats.discarded,
        stats.merged
    );

    Ok(())
}
