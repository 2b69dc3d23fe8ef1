use crate::error::{GffError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Gtf,
    Gff,
}

/// Supported compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    /// Returns true when the input is compressed.
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// use gffkit::detect::Compression;
    ///
    /// assert!(Compression::Gzip.is_compressed());
    /// assert!(!Compression::None.is_compressed());
    /// ```
    pub fn is_compressed(self) -> bool {
        !matches!(self, Compression::None)
    }
}

/// Describes the detected input kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputKind {
    /// Input format (GTF or GFF).
    pub format: InputFormat,
    /// Compression format.
    pub compression: Compression,
}

/// Column layout of a record line, guessed from its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Gff,
    Bed,
    GenePred,
}

impl Layout {
    pub fn name(self) -> &'static str {
        match self {
            Layout::Gff => "GFF",
            Layout::Bed => "BED",
            Layout::GenePred => "genePred",
        }
    }
}

/// Detects input format and compression from the file extension(s).
///
/// Handles nested extensions like `.gtf.gz`: the outer extension decides
/// the compression and the inner one the format.
///
/// # Arguments
///
/// * `path` - Path to the input file
///
/// # Returns
///
/// Returns an `InputKind` holding the format and compression.
///
/// # Errors
///
/// Returns an error if the file extension is not supported.
///
/// # Example
///
/// ```rust, ignore
/// use gffkit::detect::detect_input_kind;
/// use std::path::Path;
///
/// let kind = detect_input_kind(Path::new("file.gff.gz"))?;
/// // Returns InputKind with Gff format and Gzip compression
/// ```
pub fn detect_input_kind(path: &Path) -> Result<InputKind> {
    let unsupported = || GffError::UnsupportedExtension(path.display().to_string());
    let ext = extension_lowercase(path).ok_or_else(unsupported)?;

    if let Some(compression) = compression_from_extension(&ext) {
        let inner_ext = nested_extension(path).ok_or_else(unsupported)?;
        let format = format_from_extension(&inner_ext).ok_or_else(unsupported)?;
        return Ok(InputKind {
            format,
            compression,
        });
    }

    let format = format_from_extension(&ext).ok_or_else(unsupported)?;
    Ok(InputKind {
        format,
        compression: Compression::None,
    })
}

/// Compression implied by the outermost extension; anything that is not
/// `.gz`/`.gzip` is read as plain text.
pub fn detect_compression(path: &Path) -> Compression {
    extension_lowercase(path)
        .and_then(|ext| compression_from_extension(&ext))
        .unwrap_or(Compression::None)
}

/// Opens `path` for line reading, decoding gzip when the extension says so.
///
/// Concatenated gzip members (as written by `bgzip`) are read through.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = match detect_compression(path) {
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::None => Box::new(BufReader::new(file)),
    };
    Ok(reader)
}

/// Guesses the layout of the first record line of a file.
///
/// 3-8 or 12 whitespace-separated columns with integer columns 2 and 3 look
/// like BED; 10 or more columns with integer columns 4 to 7 look like
/// genePred. Everything else is taken as GFF.
pub fn sniff_layout(line: &str) -> Layout {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let is_int = |i: usize| fields.get(i).is_some_and(|f| f.parse::<i64>().is_ok());

    let ncols = fields.len();
    if ((3..=8).contains(&ncols) || ncols == 12) && is_int(1) && is_int(2) {
        Layout::Bed
    } else if ncols >= 10 && (3..=6).all(is_int) {
        Layout::GenePred
    } else {
        Layout::Gff
    }
}

/// Lowercase extension of `path`, so `.GTF` and `.gtf` compare equal.
///
/// # Arguments
///
/// * `path` - Path to take the extension from
///
/// # Returns
///
/// Returns the extension without the dot, or None if the path has none or it
/// is not valid UTF-8.
///
/// # Example
///
/// ```rust, ignore
/// use gffkit::detect::extension_lowercase;
/// use std::path::Path;
///
/// assert_eq!(extension_lowercase(Path::new("genes.GFF3")), Some("gff3".to_string()));
/// ```
fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Maps a lowercase extension to its input format.
///
/// `.gtf` is GTF; `.gff`, `.gff2` and `.gff3` are all read as GFF.
///
/// # Arguments
///
/// * `ext` - Extension without the dot
///
/// # Returns
///
/// Returns the matching `InputFormat`, or None for any other extension.
///
/// # Example
///
/// ```rust, ignore
/// use gffkit::detect::{format_from_extension, InputFormat};
///
/// assert_eq!(format_from_extension("gff2"), Some(InputFormat::Gff));
/// assert_eq!(format_from_extension("bed"), None);
/// ```
fn format_from_extension(ext: &str) -> Option<InputFormat> {
    match ext {
        "gtf" => Some(InputFormat::Gtf),
        "gff" | "gff2" | "gff3" => Some(InputFormat::Gff),
        _ => None,
    }
}

/// Maps a lowercase extension to a compression format. Only gzip is known.
///
/// # Arguments
///
/// * `ext` - Extension without the dot
///
/// # Returns
///
/// Returns `Compression::Gzip` for `gz` and `gzip`, None otherwise.
///
/// # Example
///
/// ```rust, ignore
/// use gffkit::detect::{compression_from_extension, Compression};
///
/// assert_eq!(compression_from_extension("gz"), Some(Compression::Gzip));
/// assert_eq!(compression_from_extension("zst"), None);
/// ```
fn compression_from_extension(ext: &str) -> Option<Compression> {
    match ext {
        "gz" | "gzip" => Some(Compression::Gzip),
        _ => None,
    }
}

/// Returns the inner extension for compressed files (e.g., `.gtf.gz` -> `gtf`).
///
/// # Arguments
///
/// * `path` - Path to the compressed file
///
/// # Returns
///
/// Returns the lowercase extension of the file stem, or None if the stem has
/// no extension.
///
/// # Example
///
/// ```rust, ignore
/// use gffkit::detect::nested_extension;
/// use std::path::Path;
///
/// assert_eq!(nested_extension(Path::new("genes.GTF.gz")), Some("gtf".to_string()));
/// ```
fn nested_extension(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    extension_lowercase(&PathBuf::from(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_gff() {
        let line = "chr1\tsrc\texon\t100\t200\t.\t+\t.\tgene_id \"g1\";";
        assert_eq!(sniff_layout(line), Layout::Gff);
        assert_eq!(sniff_layout("chr1\tsrc\texon\t100\t200"), Layout::Gff);
    }

    #[test]
    fn test_sniff_bed() {
        assert_eq!(sniff_layout("chr1\t100\t200"), Layout::Bed);
        assert_eq!(sniff_layout("chr1\t100\t200\tname\t0\t+"), Layout::Bed);
        let bed12 = "chr1\t99\t200\ttx1\t0\t+\t99\t200\t0\t2\t51,21,\t0,80,";
        assert_eq!(sniff_layout(bed12), Layout::Bed);
    }

    #[test]
    fn test_sniff_genepred() {
        let line = "tx1\tchr1\t+\t99\t200\t120\t180\t2\t99,179,\t150,200,";
        assert_eq!(sniff_layout(line), Layout::GenePred);
    }

    #[test]
    fn test_detect_compression() {
        assert_eq!(detect_compression(Path::new("a.gff.gz")), Compression::Gzip);
        assert_eq!(detect_compression(Path::new("a.GZIP")), Compression::Gzip);
        assert_eq!(detect_compression(Path::new("a.gff")), Compression::None);
        assert_eq!(detect_compression(Path::new("noext")), Compression::None);
    }
}
