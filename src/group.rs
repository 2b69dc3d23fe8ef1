use crate::error::{GffError, Result};
use crate::gff::{append_tag, find_tag, Feature, Strand};
use crate::set::FeatureSet;
use hashbrown::HashMap;

/// What a grouping index was keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// Value of an attribute tag, e.g. `transcript_id`.
    Tag(String),
    /// The feature type column.
    FeatureType,
}

/// Features sharing one key value.
///
/// `members` are positions in the owning set's record vector; the group
/// never owns the records.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub members: Vec<usize>,
    pub start: i64,
    pub end: i64,
}

impl Group {
    fn new(name: String, first: usize, feat: &Feature) -> Self {
        Self {
            name,
            members: vec![first],
            start: feat.start,
            end: feat.end,
        }
    }

    fn add(&mut self, idx: usize, feat: &Feature) {
        self.start = self.start.min(feat.start);
        self.end = self.end.max(feat.end);
        self.members.push(idx);
    }

    /// Recomputes the cached span from the current members.
    pub(crate) fn refresh_span(&mut self, features: &[Feature]) {
        let mut members = self.members.iter().map(|&i| &features[i]);
        if let Some(first) = members.next() {
            let (start, end) = members.fold((first.start, first.end), |(s, e), f| {
                (s.min(f.start), e.max(f.end))
            });
            self.start = start;
            self.end = end;
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Secondary index partitioning a set's records into groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub key: GroupKey,
    pub groups: Vec<Group>,
}

impl FeatureSet {
    /// Groups features by the value of attribute `tag`. Features without the
    /// tag share the group with the empty name.
    pub fn group_by(&mut self, tag: &str) {
        self.invalidate_groups();
        let features = &self.features;
        let grouping = build_grouping(GroupKey::Tag(tag.to_string()), features, |f| {
            find_tag(&f.attribute, tag).or_empty()
        });
        log::debug!(
            "grouped {} features into {} groups by {tag}",
            self.features.len(),
            grouping.groups.len()
        );
        self.groups = Some(grouping);
    }

    /// Groups features by their feature type.
    pub fn group_by_type(&mut self) {
        self.invalidate_groups();
        let grouping = build_grouping(GroupKey::FeatureType, &self.features, |f| {
            f.feature.as_str()
        });
        self.groups = Some(grouping);
    }

    /// Drops the grouping index, leaving every record in place.
    pub fn ungroup(&mut self) -> Option<Grouping> {
        self.groups.take()
    }

    pub fn is_grouped(&self) -> bool {
        self.groups.is_some()
    }

    pub fn grouping(&self) -> Option<&Grouping> {
        self.groups.as_ref()
    }

    pub fn groups(&self) -> &[Group] {
        match &self.groups {
            Some(grouping) => &grouping.groups,
            None => &[],
        }
    }

    /// Members of `group` as records, in group order.
    pub fn group_features<'a>(&'a self, group: &'a Group) -> impl Iterator<Item = &'a Feature> {
        group.members.iter().map(|&i| &self.features[i])
    }

    /// Sorts by start, then end.
    ///
    /// When grouped, members are sorted within each group, groups are
    /// ordered by their span, and the record order becomes the concatenation
    /// of the groups.
    pub fn sort(&mut self) {
        let Some(grouping) = self.groups.take() else {
            self.features.sort_by(Feature::cmp_coords);
            return;
        };

        let mut groups = grouping.groups;
        for group in groups.iter_mut() {
            let features = &self.features;
            group
                .members
                .sort_by(|&a, &b| features[a].cmp_coords(&features[b]));
        }
        groups.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.end.cmp(&b.end)));

        let leftover = self.rebuild_from_groups(grouping.key, groups);
        debug_assert!(leftover.is_empty());
    }

    /// Index of the group holding feature `idx` and its position there.
    ///
    /// This is a linear scan over all groups. Returns `Ok(None)` for an
    /// ungrouped set.
    pub fn group_of(&self, idx: usize) -> Result<Option<(usize, usize)>> {
        let Some(grouping) = &self.groups else {
            return Ok(None);
        };
        for (g, group) in grouping.groups.iter().enumerate() {
            if let Some(pos) = group.members.iter().position(|&m| m == idx) {
                return Ok(Some((g, pos)));
            }
        }
        Err(GffError::FeatureNotInGroup(idx))
    }

    /// Name of the group holding feature `idx`.
    pub fn group_name(&self, idx: usize) -> Result<Option<&str>> {
        Ok(self
            .group_of(idx)?
            .map(|(g, _)| self.groups()[g].name.as_str()))
    }

    /// Tags runs of contiguous, same-strand features (e.g. an exon and its
    /// splice sites) and regroups by `tag`.
    ///
    /// Within an existing group named `tx` runs are tagged `tag "tx.1"`,
    /// `tag "tx.2"`, ...; without a grouping the whole set is one unnamed
    /// group and runs are tagged `tag "1"`, `tag "2"`, ... . The set is
    /// sorted as a side effect, following the existing grouping.
    pub fn exon_group(&mut self, tag: &str) {
        self.sort();

        let runs: Vec<(String, Vec<usize>)> = match &self.groups {
            Some(grouping) => grouping
                .groups
                .iter()
                .map(|g| (g.name.clone(), g.members.clone()))
                .collect(),
            None => vec![(String::new(), (0..self.features.len()).collect())],
        };

        for (name, members) in runs {
            let mut run = 0;
            let mut last: Option<(i64, Strand)> = None;
            for idx in members {
                let feat = &mut self.features[idx];
                match last {
                    Some((end, strand)) if feat.start <= end + 1 && feat.strand == strand => {}
                    _ => run += 1,
                }

                let value = if name.is_empty() {
                    run.to_string()
                } else {
                    format!("{name}.{run}")
                };
                append_tag(&mut feat.attribute, tag, &value);

                if last.map_or(true, |(end, _)| feat.end > end) {
                    last = Some((feat.end, feat.strand));
                }
            }
        }

        self.group_by(tag);
    }

    /// Replaces the record order with the concatenation of `groups`,
    /// rewriting member positions. Records not held by any group are
    /// returned in their previous order.
    pub(crate) fn rebuild_from_groups(
        &mut self,
        key: GroupKey,
        mut groups: Vec<Group>,
    ) -> Vec<Feature> {
        let mut slots: Vec<Option<Feature>> = std::mem::take(&mut self.features)
            .into_iter()
            .map(Some)
            .collect();

        let mut features = Vec::with_capacity(slots.len());
        for group in groups.iter_mut() {
            let members = std::mem::take(&mut group.members);
            for old in members {
                if let Some(feat) = slots.get_mut(old).and_then(Option::take) {
                    group.members.push(features.len());
                    features.push(feat);
                }
            }
        }

        self.features = features;
        for group in groups.iter_mut() {
            group.refresh_span(&self.features);
        }
        self.groups = Some(Grouping { key, groups });

        slots.into_iter().flatten().collect()
    }

    /// Drops the records whose `keep` flag is false, compacting member
    /// positions in every group and refreshing spans.
    pub(crate) fn retain_flagged(&mut self, keep: &[bool]) {
        let mut remap = vec![usize::MAX; keep.len()];
        let mut next = 0;
        for (old, &kept) in keep.iter().enumerate() {
            if kept {
                remap[old] = next;
                next += 1;
            }
        }

        let mut flags = keep.iter();
        self.features.retain(|_| flags.next().copied().unwrap_or(true));

        if let Some(grouping) = self.groups.as_mut() {
            for group in grouping.groups.iter_mut() {
                group.members.retain(|&m| keep.get(m).copied().unwrap_or(false));
                for m in group.members.iter_mut() {
                    *m = remap[*m];
                }
                group.refresh_span(&self.features);
            }
        }
    }

    /// Appends a derived record to the flat list and to group `g`.
    pub(crate) fn push_to_group(&mut self, g: usize, feat: Feature) {
        let idx = self.features.len();
        self.features.push(feat);
        if let Some(grouping) = self.groups.as_mut() {
            let group = &mut grouping.groups[g];
            group.start = group.start.min(self.features[idx].start);
            group.end = group.end.max(self.features[idx].end);
            group.members.push(idx);
        }
    }

    pub(crate) fn refresh_spans(&mut self) {
        if let Some(grouping) = self.groups.as_mut() {
            for group in grouping.groups.iter_mut() {
                group.refresh_span(&self.features);
            }
        }
    }

    pub(crate) fn require_groups(&self, op: &'static str) -> Result<usize> {
        self.groups
            .as_ref()
            .map(|g| g.groups.len())
            .ok_or(GffError::NotGrouped(op))
    }
}

fn build_grouping<'a, F>(key: GroupKey, features: &'a [Feature], value_of: F) -> Grouping
where
    F: Fn(&'a Feature) -> &'a str,
{
    let mut index: HashMap<&str, usize> = HashMap::with_capacity((features.len() / 10).max(1));
    let mut groups: Vec<Group> = Vec::new();

    for (idx, feat) in features.iter().enumerate() {
        let value = value_of(feat);
        match index.get(value) {
            Some(&g) => groups[g].add(idx, feat),
            None => {
                index.insert(value, groups.len());
                groups.push(Group::new(value.to_string(), idx, feat));
            }
        }
    }

    Grouping { key, groups }
}
