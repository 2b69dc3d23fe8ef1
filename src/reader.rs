use crate::detect::{open_input, sniff_layout, Layout};
use crate::error::{GffError, Result};
use crate::gff::{Feature, Frame, Strand};
use crate::set::{FeatureSet, Metadata};
use std::io::BufRead;
use std::path::Path;

pub const MIN_COLUMNS: usize = 5;

const VERSION_TAG: &str = "gff-version";
const SOURCE_VERSION_TAG: &str = "source-version";
const DATE_TAG: &str = "date";

/// Reads a GFF file, decompressing it first when it is gzipped.
pub fn read_path<P: AsRef<Path>>(path: P) -> Result<FeatureSet> {
    let path = path.as_ref();
    log::info!("reading features from {}", path.display());
    read_set(open_input(path)?)
}

/// Reads a whole feature set from GFF text.
///
/// `##` lines seen before the first record fill in the metadata; any other
/// comment line is skipped. The first record is checked for a BED or
/// genePred shape, which is reported as [`GffError::ForeignLayout`].
pub fn read_set<R: BufRead>(reader: R) -> Result<FeatureSet> {
    let mut set = FeatureSet::new();
    let mut in_header = true;
    let mut inverted = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if in_header && line.starts_with("##") {
            if !parse_metadata(line, &mut set.metadata) {
                log::debug!("line {lineno}: ignoring unrecognized metadata '{line}'");
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        if in_header {
            in_header = false;
            match sniff_layout(line) {
                Layout::Gff => {}
                layout => {
                    return Err(GffError::ForeignLayout {
                        line: lineno,
                        layout: layout.name(),
                    })
                }
            }
        }

        let feat = parse_line(line, lineno)?;
        if feat.start > feat.end {
            inverted += 1;
            log::warn!(
                "line {lineno}: dropping record with start {} after end {}",
                feat.start,
                feat.end
            );
            continue;
        }
        set.features.push(feat);
    }

    log::info!(
        "read {} features ({} inverted intervals dropped)",
        set.len(),
        inverted
    );
    Ok(set)
}

/// Parses one `##tag value [value]` header line into `metadata`. Returns
/// false when the tag is not one of the known ones.
fn parse_metadata(line: &str, metadata: &mut Metadata) -> bool {
    let mut words = line.trim_start_matches('#').split_whitespace();
    let (Some(tag), Some(value)) = (words.next(), words.next()) else {
        return false;
    };
    let extra = words.next();

    if tag.eq_ignore_ascii_case(VERSION_TAG) {
        metadata.gff_version = value.to_string();
    } else if tag.eq_ignore_ascii_case(SOURCE_VERSION_TAG) {
        let Some(version) = extra else {
            return false;
        };
        metadata.source = value.to_string();
        metadata.source_version = version.to_string();
    } else if tag.eq_ignore_ascii_case(DATE_TAG) {
        metadata.date = value.to_string();
    } else {
        return false;
    }
    true
}

/// Parses a tab-separated record. Columns past the fifth are optional and
/// default to null; the attribute keeps any tabs it contains.
pub fn parse_line(line: &str, lineno: usize) -> Result<Feature> {
    let fields: Vec<&str> = line.splitn(9, '\t').collect();
    if fields.len() < MIN_COLUMNS {
        return Err(GffError::MissingColumns {
            line: lineno,
            found: fields.len(),
            min: MIN_COLUMNS,
        });
    }

    let start = fields[3]
        .trim()
        .parse::<i64>()
        .map_err(|_| GffError::InvalidStart {
            line: lineno,
            value: fields[3].to_string(),
        })?;
    let end = fields[4]
        .trim()
        .parse::<i64>()
        .map_err(|_| GffError::InvalidEnd {
            line: lineno,
            value: fields[4].to_string(),
        })?;

    let score = match fields.get(5).map(|s| s.trim()) {
        None | Some(".") => None,
        Some(value) => Some(value.parse::<f64>().map_err(|_| GffError::InvalidScore {
            line: lineno,
            value: value.to_string(),
        })?),
    };

    let strand = match fields.get(6) {
        None => Strand::Unknown,
        Some(value) => Strand::from_symbol(value).ok_or_else(|| GffError::InvalidStrand {
            line: lineno,
            value: value.to_string(),
        })?,
    };

    let frame = match fields.get(7).map(|s| s.trim()) {
        None | Some(".") => None,
        Some(value) => {
            let frame = value
                .parse::<u8>()
                .ok()
                .and_then(Frame::from_external)
                .ok_or_else(|| GffError::InvalidFrame {
                    line: lineno,
                    value: value.to_string(),
                })?;
            Some(frame)
        }
    };

    let attribute = fields.get(8).copied().unwrap_or("");

    Ok(Feature::new(
        fields[0], fields[1], fields[2], start, end, score, strand, frame, attribute,
    ))
}
