mod attr;
pub use attr::*;

use std::cmp::Ordering;
use std::fmt;

pub const CDS_TYPE: &str = "CDS";
pub const EXON_TYPE: &str = "exon";
pub const START_TYPE: &str = "start_codon";
pub const STOP_TYPE: &str = "stop_codon";
pub const UTR5_TYPE: &str = "5'UTR";
pub const UTR3_TYPE: &str = "3'UTR";
pub const INTRON_TYPE: &str = "intron";
pub const SPLICE5_TYPE: &str = "5'splice";
pub const SPLICE3_TYPE: &str = "3'splice";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl Strand {
    /// Parses a single strand symbol (`+`, `-` or `.`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            "." => Some(Strand::Unknown),
            _ => None,
        }
    }

    pub fn complement(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
            Strand::Unknown => Strand::Unknown,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// Reading frame in the internal convention.
///
/// A frame `f` read from a file is stored as `(3 - f) % 3`, i.e. the number
/// of bases that precede the first complete codon counted from the other
/// side. The external value is recovered with the same transform.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Frame(u8);

impl Frame {
    /// Builds a frame from the on-disk value; `None` outside 0..=2.
    pub fn from_external(frame: u8) -> Option<Self> {
        (frame <= 2).then(|| Frame((3 - frame) % 3))
    }

    pub fn from_internal(frame: u8) -> Option<Self> {
        (frame <= 2).then_some(Frame(frame))
    }

    pub fn internal(self) -> u8 {
        self.0
    }

    pub fn external(self) -> u8 {
        (3 - self.0) % 3
    }

    /// Frame after `len` bases are prepended to the reading direction.
    ///
    /// Subtracting in mod-3 space is adding twice the amount.
    pub fn absorb(self, len: i64) -> Self {
        Frame((self.0 as i64 + 2 * len).rem_euclid(3) as u8)
    }

    /// Frame of a record starting `len` bases downstream.
    pub fn advance(self, len: i64) -> Self {
        Frame((self.0 as i64 + len).rem_euclid(3) as u8)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Feature {
    pub seqname: String,
    pub source: String,
    pub feature: String,
    pub start: i64,
    pub end: i64,
    pub score: Option<f64>,
    pub strand: Strand,
    pub frame: Option<Frame>,
    pub attribute: String,
}

impl Feature {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seqname: impl Into<String>,
        source: impl Into<String>,
        feature: impl Into<String>,
        start: i64,
        end: i64,
        score: Option<f64>,
        strand: Strand,
        frame: Option<Frame>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            seqname: seqname.into(),
            source: source.into(),
            feature: feature.into(),
            start,
            end,
            score,
            strand,
            frame,
            attribute: attribute.into(),
        }
    }

    /// Builds a feature from a genome browser position such as
    /// `chr10:102553847-102554897+`. A trailing `+` or `-` sets the strand.
    /// Text before the first `chr` that starts a complete position is ignored.
    pub fn from_position(
        position: &str,
        source: impl Into<String>,
        feature: impl Into<String>,
        score: Option<f64>,
        frame: Option<Frame>,
        attribute: impl Into<String>,
    ) -> Option<Self> {
        let (seqname, start, end, strand) = position
            .match_indices("chr")
            .find_map(|(at, _)| parse_position(&position[at..]))?;

        Some(Self::new(
            seqname, source, feature, start, end, score, strand, frame, attribute,
        ))
    }

    /// Length of the closed interval.
    pub fn len(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn is_type(&self, label: &str) -> bool {
        self.feature == label
    }

    /// Ordering used everywhere a set is sorted: start, then end.
    pub fn cmp_coords(&self, other: &Feature) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t",
            self.seqname, self.source, self.feature, self.start, self.end
        )?;
        match self.score {
            Some(score) => write!(f, "{score:.3}")?,
            None => write!(f, ".")?,
        }
        write!(f, "\t{}\t", self.strand)?;
        match self.frame {
            Some(frame) => write!(f, "{}", frame.external())?,
            None => write!(f, ".")?,
        }
        write!(f, "\t{}", self.attribute)
    }
}

/// Parses `chrN:start-end` with an optional trailing strand from the start of
/// `rest`.
fn parse_position(rest: &str) -> Option<(&str, i64, i64, Strand)> {
    let name_len = 3 + rest[3..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if name_len == 3 {
        return None;
    }
    let seqname = &rest[..name_len];
    let rest = rest[name_len..].strip_prefix(':')?;

    let (start, rest) = split_digits(rest)?;
    let rest = rest.strip_prefix('-')?;
    let (end, rest) = split_digits(rest)?;

    let strand = match rest.chars().next() {
        Some('+') => Strand::Forward,
        Some('-') => Strand::Reverse,
        _ => Strand::Unknown,
    };
    Some((seqname, start, end, strand))
}

fn split_digits(s: &str) -> Option<(i64, &str)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    let value = s[..len].parse().ok()?;
    Some((value, &s[len..]))
}

/// True when no feature is on `+` and at least one is on `-`.
pub fn reverse_strand_only(features: &[Feature]) -> bool {
    let mut possible = false;
    for feat in features {
        match feat.strand {
            Strand::Forward => return false,
            Strand::Reverse => possible = true,
            Strand::Unknown => {}
        }
    }
    possible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exon(start: i64, end: i64, strand: Strand) -> Feature {
        Feature::new("chr1", "src", "exon", start, end, None, strand, None, "")
    }

    #[test]
    fn test_frame_round_trip() {
        for f in 0..3 {
            let frame = Frame::from_external(f).unwrap();
            assert_eq!(frame.external(), f);
        }
        assert_eq!(Frame::from_external(1).unwrap().internal(), 2);
        assert_eq!(Frame::from_external(0).unwrap().internal(), 0);
        assert!(Frame::from_external(3).is_none());
    }

    #[test]
    fn test_frame_arithmetic() {
        let frame = Frame::from_internal(1).unwrap();
        assert_eq!(frame.absorb(3), frame);
        assert_eq!(frame.absorb(1).internal(), 0);
        assert_eq!(frame.advance(4).internal(), 2);
    }

    #[test]
    fn test_display_feature() {
        let feat = Feature::new(
            "chr1",
            "src",
            "CDS",
            10,
            20,
            Some(1.5),
            Strand::Reverse,
            Frame::from_external(2),
            "transcript_id \"t1\";",
        );
        assert_eq!(
            feat.to_string(),
            "chr1\tsrc\tCDS\t10\t20\t1.500\t-\t2\ttranscript_id \"t1\";"
        );
    }

    #[test]
    fn test_display_null_fields() {
        let feat = exon(1, 5, Strand::Unknown);
        assert_eq!(feat.to_string(), "chr1\tsrc\texon\t1\t5\t.\t.\t.\t");
    }

    #[test]
    fn test_from_position() {
        let feat =
            Feature::from_position("chr10:102553847-102554897+", "src", "exon", None, None, "")
                .unwrap();
        assert_eq!(feat.seqname, "chr10");
        assert_eq!(feat.start, 102553847);
        assert_eq!(feat.end, 102554897);
        assert_eq!(feat.strand, Strand::Forward);

        let feat = Feature::from_position("chrX_random:5-9", "src", "exon", None, None, "").unwrap();
        assert_eq!(feat.seqname, "chrX_random");
        assert_eq!(feat.strand, Strand::Unknown);

        let feat = Feature::from_position("xchr:1 chr1:5-9", "src", "exon", None, None, "").unwrap();
        assert_eq!(feat.seqname, "chr1");
        assert_eq!((feat.start, feat.end), (5, 9));

        assert!(Feature::from_position("scaffold:1-2", "src", "exon", None, None, "").is_none());
        assert!(Feature::from_position("chr1:12", "src", "exon", None, None, "").is_none());
    }

    #[test]
    fn test_reverse_strand_only() {
        assert!(reverse_strand_only(&[
            exon(1, 2, Strand::Reverse),
            exon(3, 4, Strand::Unknown)
        ]));
        assert!(!reverse_strand_only(&[
            exon(1, 2, Strand::Reverse),
            exon(3, 4, Strand::Forward)
        ]));
        assert!(!reverse_strand_only(&[exon(1, 2, Strand::Unknown)]));
        assert!(!reverse_strand_only(&[]));
    }
}
