use crate::error::Result;
use crate::gff::Feature;
use crate::group::Group;
use crate::set::FeatureSet;

/// Rough weight of a group when competing with overlapping ones: the sum of
/// its defined feature scores, or its span when no feature is scored.
fn group_score(group: &Group, features: &[Feature]) -> f64 {
    let mut scores = group
        .members
        .iter()
        .filter_map(|&i| features[i].score)
        .peekable();
    if scores.peek().is_none() {
        return (group.end - group.start + 1) as f64;
    }
    scores.sum()
}

/// Retained groups, kept in ascending order of start.
#[derive(Default)]
struct Keepers {
    starts: Vec<i64>,
    ends: Vec<i64>,
    scores: Vec<f64>,
    groups: Vec<usize>,
}

impl Keepers {
    fn insert(&mut self, at: usize, start: i64, end: i64, score: f64, group: usize) {
        self.starts.insert(at, start);
        self.ends.insert(at, end);
        self.scores.insert(at, score);
        self.groups.insert(at, group);
    }

    fn push(&mut self, start: i64, end: i64, score: f64, group: usize) {
        self.insert(self.starts.len(), start, end, score, group);
    }

    fn evict(&mut self, lo: usize, hi: usize) -> impl Iterator<Item = usize> + '_ {
        self.starts.drain(lo..hi);
        self.ends.drain(lo..hi);
        self.scores.drain(lo..hi);
        self.groups.drain(lo..hi)
    }
}

impl FeatureSet {
    /// Removes groups that overlap a better-scoring group.
    ///
    /// Groups are visited in their current order, which must be ascending by
    /// start (call [`FeatureSet::sort`] first). A group that does not
    /// intersect any retained group is kept. Otherwise its score is compared
    /// against the summed score of the retained groups it intersects: if it
    /// is strictly greater those are evicted and it takes their place,
    /// otherwise it is dropped. The choice is greedy and local, so chains of
    /// three or more overlapping groups are not resolved optimally.
    ///
    /// Returns the features of every discarded group.
    pub fn remove_overlaps(&mut self) -> Result<Vec<Feature>> {
        self.require_groups("remove_overlaps")?;
        let Some(grouping) = self.groups.take() else {
            return Ok(Vec::new());
        };

        let mut keepers = Keepers::default();
        let mut discarded: Vec<usize> = Vec::new();
        let mut last_end = i64::MIN;

        for (g, group) in grouping.groups.iter().enumerate() {
            let score = group_score(group, &self.features);

            if group.start > last_end {
                keepers.push(group.start, group.end, score, g);
                last_end = group.end;
                continue;
            }

            // position after the last retained group starting at or before
            // this one
            let mut at = keepers.starts.partition_point(|&s| s <= group.start);
            let prev_end = at.checked_sub(1).map_or(i64::MIN, |i| keepers.ends[i]);
            let next_start = keepers.starts.get(at).copied().unwrap_or(i64::MAX);

            if prev_end >= group.start || next_start <= group.end {
                let mut alt_score = 0.0;
                let mut lo = at;
                while lo > 0 && keepers.ends[lo - 1] >= group.start {
                    alt_score += keepers.scores[lo - 1];
                    lo -= 1;
                }
                let mut hi = at;
                while hi < keepers.starts.len() && keepers.starts[hi] <= group.end {
                    alt_score += keepers.scores[hi];
                    hi += 1;
                }

                if score > alt_score {
                    discarded.extend(keepers.evict(lo, hi));
                    at = lo;
                } else {
                    discarded.push(g);
                    continue;
                }
            }

            keepers.insert(at, group.start, group.end, score, g);
            last_end = last_end.max(group.end);
        }

        log::debug!(
            "remove_overlaps: kept {} of {} groups",
            keepers.groups.len(),
            grouping.groups.len()
        );

        let mut groups: Vec<Option<Group>> = grouping.groups.into_iter().map(Some).collect();
        let kept: Vec<Group> = keepers
            .groups
            .iter()
            .filter_map(|&g| groups[g].take())
            .collect();

        let discards = self.rebuild_from_groups(grouping.key, kept);
        debug_assert_eq!(
            discards.len(),
            discarded
                .iter()
                .filter_map(|&g| groups[g].as_ref())
                .map(Group::len)
                .sum::<usize>()
        );

        Ok(discards)
    }
}
