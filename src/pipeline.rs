use crate::config::Config;
use crate::detect::detect_input_kind;
use crate::error::Result;
use crate::gff::Feature;
use crate::group::GroupKey;
use crate::reader::read_path;
use crate::set::FeatureSet;
use crate::writer::{write_features, write_path};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Summary statistics for a pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    /// Wall clock time spent in the run.
    pub elapsed: Duration,
    /// Records read from the input.
    pub features_in: usize,
    /// Records written to the output.
    pub features_out: usize,
    /// Records dropped by type filtering or overlap resolution.
    pub discarded: usize,
    /// Merges done by flattening.
    pub merged: usize,
}

/// Runs every pass `config` asks for over the input file.
///
/// Passes run in a fixed order, each over the result of the previous one:
/// type filter, grouping, sort, overlap removal, start/stop fix, UTRs,
/// introns, signals, gene ids, a second sort when new records were added,
/// and flattening. Discarded records are written to `config.discards` when
/// set.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or if an output
/// cannot be written. Nothing is written when reading fails.
///
/// # Example
///
/// ```rust, ignore
/// use gffkit::{run, Config};
///
/// let mut config = Config::new("input.gtf", "output.gff");
/// config.sort = true;
/// config.utrs = true;
/// let stats = run(&config)?;
/// println!("wrote {} features in {:?}", stats.features_out, stats.elapsed);
/// ```
pub fn run(config: &Config) -> Result<RunStats> {
    let start = Instant::now();

    let kind = detect_input_kind(&config.input)?;
    log::debug!("input kind: {:?}", kind);

    let mut set = read_path(&config.input)?;
    let features_in = set.len();
    let mut discards: Vec<Feature> = Vec::new();

    if let Some(types) = &config.include {
        discards.extend(set.filter_by_type(types.as_slice(), false));
    }
    if let Some(types) = &config.exclude {
        discards.extend(set.filter_by_type(types.as_slice(), true));
    }
    if config.include.is_some() || config.exclude.is_some() {
        log::info!("type filter kept {} of {} features", set.len(), features_in);
    }

    match &config.group_key {
        GroupKey::Tag(tag) => set.group_by(tag),
        GroupKey::FeatureType => set.group_by_type(),
    }
    log::info!("{} groups", set.groups().len());

    if config.sort {
        set.sort();
    }

    if config.remove_overlaps {
        let removed = set.remove_overlaps()?;
        log::info!(
            "overlap removal discarded {} features, {} groups left",
            removed.len(),
            set.groups().len()
        );
        discards.extend(removed);
    }

    let before = set.len();
    derive(&mut set, config)?;
    if set.len() > before {
        log::info!("derived {} features", set.len() - before);
        if config.sort {
            set.sort();
        }
    }

    let mut merged = 0;
    if config.flatten {
        merged = set.flatten();
    } else if config.flatten_within_groups {
        merged = set.flatten_within_groups()?;
    }
    if merged > 0 {
        log::info!("flattening merged {merged} features");
    }

    write_path(&config.output, &set)?;
    log::info!("wrote {} features to {}", set.len(), config.output.display());
    if let Some(path) = &config.discards {
        write_discards(path, &discards)?;
    }

    Ok(RunStats {
        elapsed: start.elapsed(),
        features_in,
        features_out: set.len(),
        discarded: discards.len(),
        merged,
    })
}

fn derive(set: &mut FeatureSet, config: &Config) -> Result<()> {
    if config.fix_start_stop {
        set.fix_start_stop()?;
    }
    if config.utrs {
        set.create_utrs()?;
    }
    if config.introns {
        set.create_introns()?;
    }
    if config.signals {
        set.create_signals()?;
    }
    if config.gene_id {
        set.add_gene_id()?;
    }
    Ok(())
}

fn write_discards(path: &Path, discards: &[Feature]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_features(&mut writer, discards)?;
    writer.flush()?;
    log::info!("wrote {} discarded features to {}", discards.len(), path.display());
    Ok(())
}
