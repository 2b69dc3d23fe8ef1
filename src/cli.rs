//! Clean up and enrich GFF/GTF annotations in batch passes
//! Alejandro Gonzales-Irribarren, 2025

use crate::config::DEFAULT_GROUP_TAG;
use crate::detect::detect_input_kind;
use clap::Parser;
use log::Level;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser, Debug)]
#[clap(
    name = "gffkit",
    version = env!("CARGO_PKG_VERSION"),
    author = "Alejandro Gonzales-Irribarren <alejandrxgzi@gmail.com>",
    about = "group, filter, resolve overlaps and derive features in GFF/GTF files"
)]
pub struct Args {
    /// Input GFF/GTF file, plain or gzipped.
    ///
    /// Records are read whole into memory, grouped by an attribute tag
    /// (or by feature type) and run through the requested passes in a
    /// fixed order: filter, sort, remove overlaps, fix start/stop, UTRs,
    /// introns, signals, gene ids, flatten.
    #[clap(
        short = 'i',
        long = "input",
        help = "Path to GFF/GTF file",
        value_name = "GFF",
        required = true
    )]
    pub input: PathBuf,

    /// Output filepath; always written as GFF.
    #[clap(
        short = 'o',
        long = "output",
        help = "Path to output GFF file",
        value_name = "OUT",
        required = true
    )]
    pub output: PathBuf,

    /// Records removed by filtering or overlap resolution are written here.
    #[clap(
        short = 'd',
        long = "discards",
        help = "Path to write discarded records",
        value_name = "DISCARDS"
    )]
    pub discards: Option<PathBuf>,

    #[clap(
        short = 'g',
        long = "group",
        help = "Attribute tag to group features by",
        value_name = "TAG",
        default_value = DEFAULT_GROUP_TAG
    )]
    pub group_tag: String,

    #[clap(
        long = "by-type",
        help = "Group features by feature type instead of a tag",
        conflicts_with = "group_tag"
    )]
    pub by_type: bool,

    #[clap(
        short = 'I',
        long = "include",
        help = "Feature types to keep (comma-separated)",
        value_name = "TYPES",
        value_delimiter = ','
    )]
    pub include: Option<Vec<String>>,

    #[clap(
        short = 'E',
        long = "exclude",
        help = "Feature types to drop (comma-separated)",
        value_name = "TYPES",
        value_delimiter = ','
    )]
    pub exclude: Option<Vec<String>>,

    #[clap(short = 's', long = "sort", help = "Sort groups and features by position")]
    pub sort: bool,

    #[clap(long = "remove-overlaps", help = "Drop groups overlapping a better-scoring group")]
    pub remove_overlaps: bool,

    #[clap(long = "fix-start-stop", help = "Include start codons and exclude stop codons in CDS")]
    pub fix_start_stop: bool,

    #[clap(long = "utrs", help = "Derive UTRs from exons and CDS")]
    pub utrs: bool,

    #[clap(long = "introns", help = "Derive introns between exons")]
    pub introns: bool,

    #[clap(long = "signals", help = "Derive start/stop codons and splice sites")]
    pub signals: bool,

    #[clap(long = "gene-id", help = "Prefix attributes with the group name as gene_id")]
    pub gene_id: bool,

    #[clap(long = "flatten", help = "Merge adjacent features of equal type and strand")]
    pub flatten: bool,

    #[clap(
        long = "flatten-within-groups",
        help = "Like --flatten, but never merge across groups"
    )]
    pub flatten_within_groups: bool,

    #[clap(
        short = 'L',
        long = "level",
        help = "Log level",
        value_name = "LEVEL",
        default_value = "info"
    )]
    pub level: Level,
}

impl Args {
    /// Checks all the arguments for validity using validate_args()
    pub fn check(&self) -> Result<(), ArgError> {
        self.validate_args()
    }

    /// The input must exist, be non-empty and carry a GFF/GTF extension.
    fn check_input(&self) -> Result<(), ArgError> {
        let metadata = std::fs::metadata(&self.input)
            .map_err(|_| ArgError::InvalidInput(format!("file {:?} does not exist", self.input)))?;
        if metadata.len() == 0 {
            let err = format!("file {:?} is empty", self.input);
            return Err(ArgError::InvalidInput(err));
        }
        detect_input_kind(&self.input)
            .map(|_| ())
            .map_err(|e| ArgError::InvalidInput(e.to_string()))
    }

    /// Checks the output file for validity. Output is never compressed.
    fn check_output(&self) -> Result<(), ArgError> {
        let ext = self
            .output
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("gff" | "gff2" | "gff3" | "gtf") => Ok(()),
            _ => {
                let err = format!("file {:?} is not a GFF file", self.output);
                Err(ArgError::InvalidOutput(err))
            }
        }
    }

    fn check_flags(&self) -> Result<(), ArgError> {
        if self.include.is_some() && self.exclude.is_some() {
            let err = "--include and --exclude are mutually exclusive".to_string();
            return Err(ArgError::InvalidFlags(err));
        }
        if self.flatten && self.flatten_within_groups {
            let err = "--flatten and --flatten-within-groups are mutually exclusive".to_string();
            return Err(ArgError::InvalidFlags(err));
        }
        if self.remove_overlaps && !self.sort {
            let err = "--remove-overlaps needs --sort".to_string();
            return Err(ArgError::InvalidFlags(err));
        }
        if self.group_tag.trim().is_empty() {
            let err = "group tag must not be empty".to_string();
            return Err(ArgError::InvalidFlags(err));
        }
        Ok(())
    }

    /// Validates all the arguments
    fn validate_args(&self) -> Result<(), ArgError> {
        self.check_input()?;
        self.check_output()?;
        self.check_flags()?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ArgError {
    /// The input file does not exist, is empty or is not a GFF/GTF file.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The output file is not a GFF file.
    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    /// Two switches cannot be combined.
    #[error("Invalid flags: {0}")]
    InvalidFlags(String),
}
