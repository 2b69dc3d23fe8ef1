use gffkit::reader::{read_path, read_set};
use gffkit::writer::{write_path, write_set};
use gffkit::FeatureSet;
use indoc::indoc;
use std::io::Cursor;

const GFF: &str = indoc! {"
    ##gff-version 2
    ##source-version phast 1.5
    ##date 2024-3-7
    chr1\tsrc\texon\t100\t200\t12.250\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";
    chr1\tsrc\tCDS\t120\t200\t.\t+\t2\tgene_id \"g1\"; transcript_id \"t1\";
    chr1\tsrc\tCDS\t300\t330\t.\t+\t1\tgene_id \"g1\"; transcript_id \"t1\";
    chr2\tother\tintron\t5\t50\t.\t-\t.\t
    chr2\tother\tsplice\t51\t52\t0.500\t.\t.\tnote \"a\ttab\"
"};

fn parse(text: &str) -> FeatureSet {
    read_set(Cursor::new(text.as_bytes())).unwrap()
}

/// Writing a read set reproduces its text exactly.
#[test]
fn write_reproduces_input() {
    let set = parse(GFF);
    let mut out = Vec::new();
    write_set(&mut out, &set).unwrap();
    let text = String::from_utf8(out).unwrap();

    let expected: Vec<_> = GFF.lines().map(str::trim_end).collect();
    let got: Vec<_> = text.lines().map(str::trim_end).collect();
    assert_eq!(got, expected);
}

/// read -> write -> read keeps records, order and metadata.
#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("set.gff");

    let mut set = parse(GFF);
    set.group_by("transcript_id");
    set.sort();
    write_path(&path, &set).unwrap();

    let back = read_path(&path).unwrap();
    assert_eq!(back.metadata, set.metadata);
    assert_eq!(back.features(), set.features());
}

/// Flattening twice changes nothing the second time.
#[test]
fn flatten_is_idempotent() {
    let mut set = parse(indoc! {"
        chr1\tsrc\texon\t1\t10\t1\t+\t.\ta
        chr1\tsrc\texon\t8\t20\t2\t+\t.\tb
        chr1\tsrc\texon\t21\t25\t.\t+\t.\tc
        chr1\tsrc\texon\t40\t50\t.\t+\t.\td
    "});
    assert_eq!(set.flatten(), 2);
    let once = set.features().to_vec();
    assert_eq!(set.flatten(), 0);
    assert_eq!(set.features(), once.as_slice());
    assert_eq!(once[0].end, 25);
    assert_eq!(once[0].score, Some(3.0));
}
