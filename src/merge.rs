use crate::error::{GffError, Result};
use crate::gff::Feature;
use crate::set::FeatureSet;

#[inline(always)]
fn mergeable(last: &Feature, next: &Feature) -> bool {
    next.start <= last.end + 1
        && last.strand == next.strand
        && last.feature == next.feature
        && last.frame.is_none()
        && next.frame.is_none()
}

impl FeatureSet {
    /// Merges runs of overlapping or abutting records with equal type and
    /// strand and no frame, in the current record order.
    ///
    /// The first record of a run absorbs the others: its end becomes the
    /// largest end, scores are summed when both are defined, and the other
    /// attributes are lost. Group boundaries are ignored, so the grouping is
    /// dropped when anything merged. Returns the number of merges.
    pub fn flatten(&mut self) -> usize {
        let merged = self.flatten_sub(None);
        if merged > 0 {
            self.invalidate_groups();
        }
        merged
    }

    /// Like [`FeatureSet::flatten`], but records only merge with records of
    /// the same group and the grouping is kept. Ungrouped sets are flattened
    /// as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`GffError::FeatureNotInGroup`] when a grouped set holds a
    /// record that no group lists. Nothing is merged in that case.
    pub fn flatten_within_groups(&mut self) -> Result<usize> {
        let Some(grouping) = self.groups.as_ref() else {
            return Ok(self.flatten());
        };

        let mut owner = vec![usize::MAX; self.features.len()];
        for (g, group) in grouping.groups.iter().enumerate() {
            for &m in &group.members {
                owner[m] = g;
            }
        }
        if let Some(i) = owner.iter().position(|&g| g == usize::MAX) {
            return Err(GffError::FeatureNotInGroup(i));
        }
        Ok(self.flatten_sub(Some(&owner)))
    }

    fn flatten_sub(&mut self, owner: Option<&[usize]>) -> usize {
        if self.features.len() < 2 {
            return 0;
        }

        let mut keep = vec![true; self.features.len()];
        let mut merged = 0;
        let mut last = 0;
        for i in 1..self.features.len() {
            let (head, tail) = self.features.split_at_mut(i);
            let (prev, next) = (&mut head[last], &tail[0]);

            if !mergeable(prev, next) {
                last = i;
                continue;
            }
            if owner.is_some_and(|owner| owner[last] != owner[i]) {
                last = i;
                continue;
            }

            prev.end = prev.end.max(next.end);
            if let (Some(a), Some(b)) = (prev.score, next.score) {
                prev.score = Some(a + b);
            }
            keep[i] = false;
            merged += 1;
        }

        if merged > 0 {
            self.retain_flagged(&keep);
        }
        log::debug!("flatten: {merged} merges");
        merged
    }
}
