use crate::cli::Args;
use crate::group::GroupKey;
use std::path::PathBuf;

/// Attribute tag records are grouped by unless told otherwise.
pub const DEFAULT_GROUP_TAG: &str = "transcript_id";

/// Normalized configuration for a pipeline run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Input GFF/GTF path, optionally gzipped.
    pub input: PathBuf,
    /// Output GFF path.
    pub output: PathBuf,
    /// Where discarded records are written, if anywhere.
    pub discards: Option<PathBuf>,
    /// Key the grouping index is built with.
    pub group_key: GroupKey,
    /// Feature types to keep; everything else is discarded.
    pub include: Option<Vec<String>>,
    /// Feature types to discard.
    pub exclude: Option<Vec<String>>,
    pub sort: bool,
    pub remove_overlaps: bool,
    pub fix_start_stop: bool,
    pub utrs: bool,
    pub introns: bool,
    pub signals: bool,
    pub gene_id: bool,
    pub flatten: bool,
    pub flatten_within_groups: bool,
}

impl Config {
    /// Builds a pipeline config from CLI arguments.
    ///
    /// Empty type lists are treated as absent.
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// use gffkit::{Args, Config};
    /// use clap::Parser;
    ///
    /// let args = Args::parse_from(["gffkit", "-i", "in.gtf", "-o", "out.gff", "--sort"]);
    /// let config = Config::from_args(&args);
    /// assert!(config.sort);
    /// ```
    pub fn from_args(args: &Args) -> Self {
        let group_key = if args.by_type {
            GroupKey::FeatureType
        } else {
            GroupKey::Tag(args.group_tag.clone())
        };
        let non_empty = |types: &Option<Vec<String>>| {
            types
                .as_ref()
                .map(|t| {
                    t.iter()
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|t| !t.is_empty())
        };

        Self {
            input: args.input.clone(),
            output: args.output.clone(),
            discards: args.discards.clone(),
            group_key,
            include: non_empty(&args.include),
            exclude: non_empty(&args.exclude),
            sort: args.sort,
            remove_overlaps: args.remove_overlaps,
            fix_start_stop: args.fix_start_stop,
            utrs: args.utrs,
            introns: args.introns,
            signals: args.signals,
            gene_id: args.gene_id,
            flatten: args.flatten,
            flatten_within_groups: args.flatten_within_groups,
        }
    }

    /// Config that reads `input` and writes `output` unchanged apart from
    /// grouping by [`DEFAULT_GROUP_TAG`].
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            discards: None,
            group_key: GroupKey::Tag(DEFAULT_GROUP_TAG.to_string()),
            include: None,
            exclude: None,
            sort: false,
            remove_overlaps: false,
            fix_start_stop: false,
            utrs: false,
            introns: false,
            signals: false,
            gene_id: false,
            flatten: false,
            flatten_within_groups: false,
        }
    }
}
