//! # gffkit
//!
//! In-memory GFF/GTF feature sets with the structural passes needed to turn
//! raw annotation dumps into clean transcript models.
//!
//! A [`FeatureSet`] owns its records in output order. An optional grouping
//! index (built with [`FeatureSet::group_by`] or
//! [`FeatureSet::group_by_type`]) refers to them by position and drives the
//! group-aware passes:
//!
//! - overlap resolution by group score ([`FeatureSet::remove_overlaps`])
//! - CDS boundary fixes ([`FeatureSet::fix_start_stop`],
//!   [`FeatureSet::absorb_helpers`])
//! - UTR, intron and signal derivation ([`FeatureSet::create_utrs`],
//!   [`FeatureSet::create_introns`], [`FeatureSet::create_signals`])
//! - merging of adjacent records ([`FeatureSet::flatten`],
//!   [`FeatureSet::flatten_within_groups`])
//!
//! ## Usage
//!
//! ```rust, ignore
//! use gffkit::reader::read_path;
//! use gffkit::writer::write_set;
//!
//! let mut set = read_path("annotations.gtf.gz")?;
//! set.group_by("transcript_id");
//! set.sort();
//! let discarded = set.remove_overlaps()?;
//! set.create_utrs()?;
//! set.sort();
//!
//! write_set(&mut std::io::stdout(), &set)?;
//! ```
//!
//! The `gffkit` binary runs the same passes over a file; see [`run`].

pub mod cli;
pub mod config;
pub mod derive;
pub mod detect;
pub mod error;
pub mod gff;
pub mod group;
pub mod merge;
pub mod overlap;
pub mod pipeline;
pub mod reader;
pub mod set;
pub mod writer;

pub use cli::Args;
pub use config::Config;
pub use error::{GffError, Result};
pub use gff::{Feature, Frame, Strand};
pub use group::{Group, GroupKey, Grouping};
pub use pipeline::{run, RunStats};
pub use set::{FeatureSet, Metadata};
