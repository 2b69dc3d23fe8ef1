use crate::gff::Feature;
use crate::group::Grouping;
use chrono::{Datelike, Local};

pub const DEFAULT_VERSION: &str = "2";

/// Header fields carried by `##` comment lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub gff_version: String,
    pub source: String,
    pub source_version: String,
    pub date: String,
}

/// Ordered, owning collection of features.
///
/// The vector order is the canonical iteration and output order. An optional
/// grouping index refers to records by position; every method that removes
/// or reorders records either rebuilds it or drops it.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub metadata: Metadata,
    pub(crate) features: Vec<Feature>,
    pub(crate) groups: Option<Grouping>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(len: usize) -> Self {
        Self {
            features: Vec::with_capacity(len),
            ..Self::default()
        }
    }

    /// Empty set sharing `template`'s metadata.
    pub fn from_template(template: &FeatureSet) -> Self {
        Self {
            metadata: template.metadata.clone(),
            ..Self::default()
        }
    }

    /// Empty set with the default version, today's date and the given source.
    pub fn with_defaults(source: &str, source_version: &str) -> Self {
        Self {
            metadata: Metadata {
                gff_version: DEFAULT_VERSION.to_string(),
                source: source.to_string(),
                source_version: source_version.to_string(),
                date: today(),
            },
            ..Self::default()
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Mutable access to the records. The grouping is dropped since the
    /// caller may change membership.
    pub fn features_mut(&mut self) -> &mut Vec<Feature> {
        self.invalidate_groups();
        &mut self.features
    }

    pub fn into_features(self) -> Vec<Feature> {
        self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, feature: Feature) {
        self.invalidate_groups();
        self.features.push(feature);
    }

    /// Replaces every record.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.invalidate_groups();
        self.features = features;
    }

    pub fn clear(&mut self) {
        self.invalidate_groups();
        self.features.clear();
    }

    /// Copies of the features lying entirely inside `[start, end]`.
    ///
    /// With `reset_indices` the copies are rebased so that `start` becomes
    /// coordinate 1.
    pub fn subset_range(&self, start: i64, end: i64, reset_indices: bool) -> FeatureSet {
        let mut subset = FeatureSet::from_template(self);
        for feat in &self.features {
            if feat.start >= start && feat.end <= end {
                let mut copy = feat.clone();
                if reset_indices {
                    copy.start = copy.start - start + 1;
                    copy.end = copy.end - start + 1;
                }
                subset.features.push(copy);
            }
        }
        subset
    }

    /// Copies of the features overlapping `[start, end]`, even partially.
    pub fn subset_range_overlap(&self, start: i64, end: i64) -> FeatureSet {
        let mut subset = FeatureSet::from_template(self);
        subset.features.extend(
            self.features
                .iter()
                .filter(|feat| feat.start <= end && feat.end >= start)
                .cloned(),
        );
        subset
    }

    /// Like [`FeatureSet::subset_range_overlap`] for a set sorted by start.
    ///
    /// Scanning begins at `*cursor`, assuming nothing before it overlaps, and
    /// stops at the first feature starting past `end`. The cursor is moved to
    /// the first match so that successive windows over ascending ranges cost
    /// linear time overall. It is left alone when nothing matches.
    pub fn subset_range_overlap_sorted(
        &self,
        start: i64,
        end: i64,
        cursor: &mut usize,
    ) -> FeatureSet {
        let mut subset = FeatureSet::from_template(self);
        let mut first = None;
        for (idx, feat) in self.features.iter().enumerate().skip(*cursor) {
            if feat.start > end {
                break;
            }
            if feat.end >= start {
                first.get_or_insert(idx);
                subset.features.push(feat.clone());
            }
        }
        if let Some(idx) = first {
            *cursor = idx;
        }
        subset
    }

    /// Shifts every feature by `offset`.
    ///
    /// Features ending before 1, or starting after `max_coord`, are removed;
    /// the rest are clamped to `[1, max_coord]` (or `[1, inf)` without a
    /// bound).
    pub fn add_offset(&mut self, offset: i64, max_coord: Option<i64>) {
        let before = self.features.len();
        self.features.retain_mut(|feat| {
            feat.start += offset;
            feat.end += offset;
            if feat.end < 1 || max_coord.is_some_and(|max| feat.start > max) {
                return false;
            }
            feat.start = feat.start.max(1);
            if let Some(max) = max_coord {
                feat.end = feat.end.min(max);
            }
            true
        });
        log::debug!(
            "offset {offset}: dropped {} features out of bounds",
            before - self.features.len()
        );
        self.invalidate_groups();
    }

    /// Reverse complements every feature relative to `[start_range, end_range]`.
    /// See [`reverse_complement`].
    pub fn reverse_complement(&mut self, start_range: i64, end_range: i64) {
        reverse_complement(&mut self.features, start_range, end_range);
        self.invalidate_groups();
    }

    /// Keeps the features whose type is in `types` (or, with `exclude`, the
    /// ones whose type is not) and returns the discarded ones.
    pub fn filter_by_type<S: AsRef<str>>(&mut self, types: &[S], exclude: bool) -> Vec<Feature> {
        let (kept, discarded): (Vec<_>, Vec<_>) = std::mem::take(&mut self.features)
            .into_iter()
            .partition(|feat| types.iter().any(|t| t.as_ref() == feat.feature) != exclude);

        self.features = kept;
        if !discarded.is_empty() {
            self.invalidate_groups();
        }
        discarded
    }

    /// Feature indices partitioned by type, types in order of first
    /// appearance.
    pub fn partition_by_type(&self) -> Vec<(&str, Vec<usize>)> {
        let mut index: hashbrown::HashMap<&str, usize> = hashbrown::HashMap::new();
        let mut parts: Vec<(&str, Vec<usize>)> = Vec::new();
        for (idx, feat) in self.features.iter().enumerate() {
            let slot = *index.entry(feat.feature.as_str()).or_insert_with(|| {
                parts.push((feat.feature.as_str(), Vec::new()));
                parts.len() - 1
            });
            parts[slot].1.push(idx);
        }
        parts
    }

    pub(crate) fn invalidate_groups(&mut self) {
        if self.groups.take().is_some() {
            log::debug!("grouping dropped after structural edit");
        }
    }
}

/// Adjusts coordinates and strand of `features` to reflect reverse
/// complementation of `[start_range, end_range]` and reverses their order.
/// Features and range share one coordinate frame.
pub fn reverse_complement(features: &mut [Feature], start_range: i64, end_range: i64) {
    for feat in features.iter_mut() {
        let start = feat.start;
        feat.start = end_range - feat.end + start_range;
        feat.end = end_range - start + start_range;
        feat.strand = feat.strand.complement();
    }
    features.reverse();
}

/// Current local date as `Y-M-D` without zero padding.
fn today() -> String {
    let now = Local::now();
    format!("{}-{}-{}", now.year(), now.month(), now.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gff::Strand;

    fn feat(kind: &str, start: i64, end: i64, strand: Strand) -> Feature {
        Feature::new("chr1", "src", kind, start, end, None, strand, None, "")
    }

    fn coords(set: &FeatureSet) -> Vec<(i64, i64)> {
        set.features().iter().map(|f| (f.start, f.end)).collect()
    }

    fn sample() -> FeatureSet {
        let mut set = FeatureSet::with_defaults("gffkit", "0.1");
        set.set_features(vec![
            feat("exon", 1, 10, Strand::Forward),
            feat("CDS", 5, 20, Strand::Forward),
            feat("exon", 15, 30, Strand::Reverse),
            feat("intron", 40, 50, Strand::Unknown),
        ]);
        set
    }

    #[test]
    fn test_with_defaults() {
        let set = FeatureSet::with_defaults("phast", "1.0");
        assert_eq!(set.metadata.gff_version, "2");
        assert_eq!(set.metadata.source, "phast");
        assert_eq!(set.metadata.source_version, "1.0");
        let now = Local::now();
        assert_eq!(
            set.metadata.date,
            format!("{}-{}-{}", now.year(), now.month(), now.day())
        );
        assert!(!set.metadata.date.contains("-0"));
    }

    #[test]
    fn test_subset_range() {
        let set = sample();
        let sub = set.subset_range(5, 30, false);
        assert_eq!(coords(&sub), vec![(5, 20), (15, 30)]);
        assert_eq!(sub.metadata, set.metadata);

        let sub = set.subset_range(5, 30, true);
        assert_eq!(coords(&sub), vec![(1, 16), (11, 26)]);
    }

    #[test]
    fn test_subset_range_overlap() {
        let set = sample();
        let sub = set.subset_range_overlap(25, 45);
        assert_eq!(coords(&sub), vec![(15, 30), (40, 50)]);
        assert!(set.subset_range_overlap(100, 200).is_empty());
    }

    #[test]
    fn test_subset_range_overlap_sorted_cursor() {
        let set = sample();
        let mut cursor = 0;

        let sub = set.subset_range_overlap_sorted(12, 16, &mut cursor);
        assert_eq!(coords(&sub), vec![(5, 20), (15, 30)]);
        assert_eq!(cursor, 1);

        let sub = set.subset_range_overlap_sorted(35, 38, &mut cursor);
        assert!(sub.is_empty());
        assert_eq!(cursor, 1);

        let sub = set.subset_range_overlap_sorted(45, 60, &mut cursor);
        assert_eq!(coords(&sub), vec![(40, 50)]);
        assert_eq!(cursor, 3);
    }

    #[test]
    fn test_add_offset_drops_and_clamps() {
        let mut set = sample();
        set.add_offset(-12, Some(30));
        assert_eq!(coords(&set), vec![(1, 8), (3, 18), (28, 30)]);

        let mut set = sample();
        set.add_offset(100, None);
        assert_eq!(coords(&set)[0], (101, 110));
    }

    #[test]
    fn test_reverse_complement() {
        let mut set = sample();
        set.reverse_complement(1, 50);
        assert_eq!(coords(&set), vec![(1, 11), (21, 36), (31, 46), (41, 50)]);
        let strands: Vec<_> = set.features().iter().map(|f| f.strand).collect();
        assert_eq!(
            strands,
            vec![Strand::Unknown, Strand::Forward, Strand::Reverse, Strand::Reverse]
        );
    }

    #[test]
    fn test_filter_by_type() {
        let mut set = sample();
        let discarded = set.filter_by_type(&["exon"], false);
        assert_eq!(set.len(), 2);
        assert_eq!(discarded.len(), 2);
        assert!(set.features().iter().all(|f| f.feature == "exon"));

        let mut set = sample();
        let discarded = set.filter_by_type(&["exon"], true);
        assert_eq!(set.len(), 2);
        assert!(discarded.iter().all(|f| f.feature == "exon"));
    }

    #[test]
    fn test_partition_by_type() {
        let set = sample();
        let parts = set.partition_by_type();
        assert_eq!(
            parts,
            vec![("exon", vec![0, 2]), ("CDS", vec![1]), ("intron", vec![3])]
        );
    }
}
