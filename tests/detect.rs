use gffkit::detect::{detect_input_kind, Compression, InputFormat};
use std::path::Path;

/// Ensures plain GTF input is detected correctly.
#[test]
fn detect_plain_gtf() {
    let kind = detect_input_kind(Path::new("sample.gtf")).unwrap();
    assert_eq!(kind.format, InputFormat::Gtf);
    assert_eq!(kind.compression, Compression::None);
}

/// Ensures GFF3 input with gzip compression is detected correctly.
#[test]
fn detect_gff3_gz() {
    let kind = detect_input_kind(Path::new("sample.gff3.gz")).unwrap();
    assert_eq!(kind.format, InputFormat::Gff);
    assert_eq!(kind.compression, Compression::Gzip);
    assert!(kind.compression.is_compressed());
}

/// Extensions are matched case-insensitively.
#[test]
fn detect_uppercase_gff() {
    let kind = detect_input_kind(Path::new("SAMPLE.GFF")).unwrap();
    assert_eq!(kind.format, InputFormat::Gff);
}

/// Rejects unsupported extensions.
#[test]
fn detect_rejects_unknown() {
    assert!(detect_input_kind(Path::new("sample.txt")).is_err());
    assert!(detect_input_kind(Path::new("sample.bed.gz")).is_err());
    assert!(detect_input_kind(Path::new("sample")).is_err());
}

/// Zstandard is not among the supported compressions.
#[test]
fn detect_rejects_zstd() {
    assert!(detect_input_kind(Path::new("sample.gtf.zst")).is_err());
}
