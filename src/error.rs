use thiserror::Error;

/// Error type for gffkit operations.
#[derive(Debug, Error)]
pub enum GffError {
    /// An operation that needs a grouping index was called on an ungrouped set.
    #[error("{0} requires grouped features")]
    NotGrouped(&'static str),
    /// A record claims group membership but no group holds it.
    #[error("feature #{0} could not be found in any group")]
    FeatureNotInGroup(usize),
    /// A feature line has fewer than the required number of columns.
    #[error("line {line}: minimum of {min} columns are required, found {found}")]
    MissingColumns {
        line: usize,
        found: usize,
        min: usize,
    },
    /// Non-numeric start coordinate.
    #[error("line {line}: non-numeric 'start' value ('{value}')")]
    InvalidStart { line: usize, value: String },
    /// Non-numeric end coordinate.
    #[error("line {line}: non-numeric 'end' value ('{value}')")]
    InvalidEnd { line: usize, value: String },
    /// Score that is neither `.` nor a float.
    #[error("line {line}: non-numeric and non-null 'score' value ('{value}')")]
    InvalidScore { line: usize, value: String },
    /// Strand other than `+`, `-` or `.`.
    #[error("line {line}: illegal 'strand' ('{value}')")]
    InvalidStrand { line: usize, value: String },
    /// Frame other than `.`, 0, 1 or 2.
    #[error("line {line}: illegal 'frame' ('{value}')")]
    InvalidFrame { line: usize, value: String },
    /// Input looks like one of the sibling tabular formats.
    #[error("line {line}: input looks like {layout}, not GFF")]
    ForeignLayout { line: usize, layout: &'static str },
    /// Input extension is missing or not supported.
    #[error("unsupported input extension: {0}")]
    UnsupportedExtension(String),
    /// Wraps standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for gffkit operations.
pub type Result<T> = std::result::Result<T, GffError>;
