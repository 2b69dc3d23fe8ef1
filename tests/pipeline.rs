use gffkit::{run, Config, GffError, GroupKey};
use indoc::indoc;
use std::path::{Path, PathBuf};

/// Writes contents to a file in the temp dir and returns its path.
fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn columns(line: &str) -> Vec<&str> {
    line.split('\t').collect()
}

/// Derives UTRs and introns for a two-exon transcript and sorts the result.
#[test]
fn derive_utrs_and_introns() {
    let dir = tempfile::tempdir().unwrap();
    let gtf = indoc! {"
        ##gff-version 2
        chr1\tsrc\texon\t1\t100\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
        chr1\tsrc\tCDS\t20\t80\t.\t+\t0\tgene_id \"g1\"; transcript_id \"t1\";
        chr1\tsrc\texon\t200\t300\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
    "};
    let input = write_file(dir.path(), "input.gtf", gtf);
    let output = dir.path().join("output.gff");

    let mut config = Config::new(input, output.clone());
    config.sort = true;
    config.utrs = true;
    config.introns = true;
    let stats = run(&config).unwrap();

    assert_eq!(stats.features_in, 3);
    assert_eq!(stats.features_out, 7);
    assert_eq!(stats.discarded, 0);

    let text = std::fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("##gff-version 2"));

    let records: Vec<(String, String, String)> = lines
        .map(|l| {
            let cols = columns(l);
            (cols[2].to_string(), cols[3].to_string(), cols[4].to_string())
        })
        .collect();
    let expected = [
        ("5'UTR", "1", "19"),
        ("exon", "1", "100"),
        ("CDS", "20", "80"),
        ("3'UTR", "81", "100"),
        ("intron", "101", "199"),
        ("exon", "200", "300"),
        ("3'UTR", "200", "300"),
    ];
    assert_eq!(records.len(), expected.len());
    for (got, want) in records.iter().zip(expected.iter()) {
        assert_eq!((got.0.as_str(), got.1.as_str(), got.2.as_str()), *want);
    }
}

/// Keeps the best-scoring of two overlapping transcripts and writes the
/// loser to the discards file.
#[test]
fn remove_overlaps_writes_discards() {
    let dir = tempfile::tempdir().unwrap();
    let gff = indoc! {"
        chr1\tsrc\tCDS\t1\t10\t5\t+\t.\ttranscript_id \"A\";
        chr1\tsrc\tCDS\t5\t15\t3\t+\t.\ttranscript_id \"B\";
        chr1\tsrc\tCDS\t20\t25\t1\t+\t.\ttranscript_id \"C\";
    "};
    let input = write_file(dir.path(), "input.gff", gff);
    let output = dir.path().join("output.gff");
    let discards = dir.path().join("discards.gff");

    let mut config = Config::new(input, output.clone());
    config.discards = Some(discards.clone());
    config.sort = true;
    config.remove_overlaps = true;
    let stats = run(&config).unwrap();
    assert_eq!(stats.features_out, 2);
    assert_eq!(stats.discarded, 1);

    let kept = std::fs::read_to_string(&output).unwrap();
    let kept: Vec<_> = kept.lines().collect();
    assert_eq!(kept.len(), 2);
    assert!(kept[0].ends_with("transcript_id \"A\";"));
    assert!(kept[1].ends_with("transcript_id \"C\";"));
    assert_eq!(columns(kept[0])[5], "5.000");

    let dropped = std::fs::read_to_string(&discards).unwrap();
    assert_eq!(
        dropped.trim_end(),
        "chr1\tsrc\tCDS\t5\t15\t3.000\t+\t.\ttranscript_id \"B\";"
    );
}

/// Type filtering happens before flattening; the filtered records count as
/// discarded.
#[test]
fn include_then_flatten() {
    let dir = tempfile::tempdir().unwrap();
    let gtf = indoc! {"
        chr1\tsrc\texon\t1\t10\t.\t-\t.\ttranscript_id \"t1\";
        chr1\tsrc\tCDS\t3\t10\t.\t-\t0\ttranscript_id \"t1\";
        chr1\tsrc\texon\t11\t20\t.\t-\t.\ttranscript_id \"t1\";
    "};
    let input = write_file(dir.path(), "input.gtf", gtf);
    let output = dir.path().join("output.gtf");

    let mut config = Config::new(input, output.clone());
    config.include = Some(vec!["exon".to_string()]);
    config.flatten_within_groups = true;
    let stats = run(&config).unwrap();
    assert_eq!(stats.discarded, 1);
    assert_eq!(stats.merged, 1);

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        text,
        "chr1\tsrc\texon\t1\t20\t.\t-\t.\ttranscript_id \"t1\";\n"
    );
}

/// Grouping by type feeds the type name into the gene id prefix.
#[test]
fn group_by_type_gene_id() {
    let dir = tempfile::tempdir().unwrap();
    let gff = indoc! {"
        chr2\tsrc\texon\t5\t9\t.\t+\t.\tID=e1
        chr2\tsrc\tCDS\t6\t9\t.\t+\t0\tID=c1
    "};
    let input = write_file(dir.path(), "input.gff3", gff);
    let output = dir.path().join("output.gff3");

    let mut config = Config::new(input, output.clone());
    config.group_key = GroupKey::FeatureType;
    config.gene_id = true;
    run(&config).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    let attrs: Vec<_> = text.lines().map(|l| columns(l)[8].to_string()).collect();
    assert_eq!(attrs, vec!["gene_id \"exon\" ; ID=e1", "gene_id \"CDS\" ; ID=c1"]);
}

/// BED content is refused before any output is written.
#[test]
fn bed_content_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bed = indoc! {"
        chr1\t99\t200\ttx1\t0\t+
    "};
    let input = write_file(dir.path(), "input.gff", bed);
    let output = dir.path().join("output.gff");

    let config = Config::new(input, output.clone());
    let err = run(&config).unwrap_err();
    assert!(matches!(err, GffError::ForeignLayout { layout: "BED", .. }));
    assert!(!output.exists());
}

/// Unknown input extensions are refused.
#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "input.txt", "chr1\tsrc\texon\t1\t2\n");
    let config = Config::new(input, dir.path().join("output.gff"));
    assert!(matches!(
        run(&config),
        Err(GffError::UnsupportedExtension(_))
    ));
}
