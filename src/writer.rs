use crate::error::Result;
use crate::gff::Feature;
use crate::set::FeatureSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the header lines that have a value, then every record.
pub fn write_set<W: Write>(writer: &mut W, set: &FeatureSet) -> Result<()> {
    let meta = &set.metadata;
    if !meta.gff_version.is_empty() {
        writeln!(writer, "##gff-version {}", meta.gff_version)?;
    }
    if !meta.source_version.is_empty() {
        writeln!(
            writer,
            "##source-version {} {}",
            meta.source, meta.source_version
        )?;
    }
    if !meta.date.is_empty() {
        writeln!(writer, "##date {}", meta.date)?;
    }

    write_features(writer, set.features())
}

/// Writes one record line.
pub fn write_feature<W: Write>(writer: &mut W, feat: &Feature) -> Result<()> {
    writeln!(writer, "{feat}")?;
    Ok(())
}

/// Writes bare record lines, without any header.
pub fn write_features<W: Write>(writer: &mut W, features: &[Feature]) -> Result<()> {
    for feat in features {
        write_feature(writer, feat)?;
    }
    Ok(())
}

/// Writes `set` to a new file at `path`.
pub fn write_path<P: AsRef<Path>>(path: P, set: &FeatureSet) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_set(&mut writer, set)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gff::{Frame, Strand};

    #[test]
    fn test_write_set() {
        let mut set = FeatureSet::new();
        set.metadata.gff_version = "2".into();
        set.metadata.source = "phast".into();
        set.metadata.source_version = "1.5".into();
        set.push(Feature::new(
            "chr1",
            "src",
            "CDS",
            1,
            9,
            Some(2.0),
            Strand::Forward,
            Frame::from_internal(2),
            "transcript_id \"t1\";",
        ));

        let mut out = Vec::new();
        write_set(&mut out, &set).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "##gff-version 2\n\
             ##source-version phast 1.5\n\
             chr1\tsrc\tCDS\t1\t9\t2.000\t+\t1\ttranscript_id \"t1\";\n"
        );
    }

    #[test]
    fn test_write_empty_header() {
        let mut out = Vec::new();
        write_set(&mut out, &FeatureSet::new()).unwrap();
        assert!(out.is_empty());
    }
}
