use crate::error::Result;
use crate::gff::{
    Feature, Strand, CDS_TYPE, EXON_TYPE, INTRON_TYPE, SPLICE3_TYPE, SPLICE5_TYPE, START_TYPE,
    STOP_TYPE, UTR3_TYPE, UTR5_TYPE,
};
use crate::group::Group;
use crate::set::FeatureSet;
use hashbrown::HashSet;

#[inline(always)]
fn is_utr(feat: &Feature) -> bool {
    feat.is_type(UTR5_TYPE) || feat.is_type(UTR3_TYPE)
}

/// Copy of `source` retyped to `kind` over `[start, end]`, without a frame.
fn derived(source: &Feature, kind: &str, start: i64, end: i64) -> Feature {
    let mut feat = source.clone();
    feat.feature = kind.to_string();
    feat.start = start;
    feat.end = end;
    feat.frame = None;
    feat
}

/// Min start and max end over the members accepted by `pred`.
fn span_of<'a, P>(members: impl Iterator<Item = &'a Feature>, pred: P) -> Option<(i64, i64)>
where
    P: Fn(&Feature) -> bool,
{
    members
        .filter(|f| pred(f))
        .fold(None, |acc, f| match acc {
            None => Some((f.start, f.end)),
            Some((s, e)) => Some((s.min(f.start), e.max(f.end))),
        })
}

fn group_strand(group: &Group, features: &[Feature]) -> Strand {
    group
        .members
        .first()
        .map_or(Strand::Unknown, |&i| features[i].strand)
}

impl FeatureSet {
    /// Member lists of every group, copied so records can be appended while
    /// walking them.
    fn member_snapshot(&self) -> Vec<Vec<usize>> {
        self.groups().iter().map(|g| g.members.clone()).collect()
    }

    /// Makes CDS records exclude the stop codon and include the start codon.
    ///
    /// Only CDS records directly adjacent to (or sharing the end with) the
    /// codon of their own group are touched. When a group holds several
    /// codons of one kind the last one wins.
    pub fn fix_start_stop(&mut self) -> Result<()> {
        self.require_groups("fix_start_stop")?;

        let mut fixed = 0usize;
        for members in self.member_snapshot() {
            let mut start_codon: Option<(i64, i64)> = None;
            let mut stop_codon: Option<(i64, i64)> = None;
            for &m in &members {
                let feat = &self.features[m];
                if feat.is_type(START_TYPE) {
                    start_codon = Some((feat.start, feat.end));
                } else if feat.is_type(STOP_TYPE) {
                    stop_codon = Some((feat.start, feat.end));
                }
            }
            if start_codon.is_none() && stop_codon.is_none() {
                continue;
            }

            for &m in &members {
                let feat = &mut self.features[m];
                if !feat.is_type(CDS_TYPE) {
                    continue;
                }

                if let Some((s, e)) = start_codon {
                    match feat.strand {
                        Strand::Forward if feat.start == e + 1 => {
                            feat.start = s;
                            fixed += 1;
                        }
                        Strand::Reverse if feat.end == s - 1 => {
                            feat.end = e;
                            fixed += 1;
                        }
                        _ => {}
                    }
                }

                if let Some((s, e)) = stop_codon {
                    match feat.strand {
                        Strand::Forward if feat.end == e && s - 1 >= feat.start => {
                            feat.end = s - 1;
                            fixed += 1;
                        }
                        Strand::Reverse if feat.start == s && e + 1 <= feat.end => {
                            feat.start = e + 1;
                            fixed += 1;
                        }
                        _ => {}
                    }
                }
            }
        }

        self.refresh_spans();
        log::debug!("fix_start_stop: adjusted {fixed} CDS boundaries");
        Ok(())
    }

    /// Extends every `primary` record through the contiguous `helper` records
    /// next to it in group order.
    ///
    /// On the `+` strand a frame is re-derived when absorbing on the left, on
    /// the `-` strand when absorbing on the right. The helpers themselves are
    /// left in place.
    pub fn absorb_helpers<P, H>(&mut self, primary: &[P], helper: &[H]) -> Result<()>
    where
        P: AsRef<str>,
        H: AsRef<str>,
    {
        self.require_groups("absorb_helpers")?;
        let is_primary = |f: &Feature| primary.iter().any(|t| f.is_type(t.as_ref()));
        let is_helper = |f: &Feature| helper.iter().any(|t| f.is_type(t.as_ref()));

        for members in self.member_snapshot() {
            for (j, &m) in members.iter().enumerate() {
                if !is_primary(&self.features[m]) {
                    continue;
                }
                let mut feat = self.features[m].clone();

                for &k in members[..j].iter().rev() {
                    let prev = &self.features[k];
                    if !is_helper(prev) || prev.end != feat.start - 1 {
                        break;
                    }
                    feat.start = prev.start;
                    if feat.strand == Strand::Forward {
                        feat.frame = feat.frame.map(|fr| fr.absorb(prev.len()));
                    }
                }

                for &k in &members[j + 1..] {
                    let next = &self.features[k];
                    if !is_helper(next) || next.start != feat.end + 1 {
                        break;
                    }
                    feat.end = next.end;
                    if feat.strand == Strand::Reverse {
                        feat.frame = feat.frame.map(|fr| fr.absorb(next.len()));
                    }
                }

                self.features[m] = feat;
            }
        }

        self.refresh_spans();
        Ok(())
    }

    /// Adds `5'UTR`/`3'UTR` records for the parts of each exon lying outside
    /// the CDS span of its group. Groups without a CDS are skipped.
    pub fn create_utrs(&mut self) -> Result<usize> {
        let ngroups = self.require_groups("create_utrs")?;

        let mut created = 0;
        for g in 0..ngroups {
            let new = {
                let group = &self.groups()[g];
                let Some((cds_start, cds_end)) =
                    span_of(self.group_features(group), |f| f.is_type(CDS_TYPE))
                else {
                    continue;
                };
                let reverse = group_strand(group, &self.features) == Strand::Reverse;
                let (before, after) = if reverse {
                    (UTR3_TYPE, UTR5_TYPE)
                } else {
                    (UTR5_TYPE, UTR3_TYPE)
                };

                let mut new = Vec::new();
                for exon in self.group_features(group).filter(|f| f.is_type(EXON_TYPE)) {
                    if exon.start < cds_start {
                        new.push(derived(
                            exon,
                            before,
                            exon.start,
                            exon.end.min(cds_start - 1),
                        ));
                    }
                    if exon.end > cds_end {
                        new.push(derived(
                            exon,
                            after,
                            exon.start.max(cds_end + 1),
                            exon.end,
                        ));
                    }
                }
                new
            };

            created += new.len();
            for feat in new {
                self.push_to_group(g, feat);
            }
        }

        log::debug!("create_utrs: added {created} records");
        Ok(created)
    }

    /// Adds an `intron` between each pair of consecutive exons of a group.
    /// Abutting or overlapping exons yield nothing.
    pub fn create_introns(&mut self) -> Result<usize> {
        let ngroups = self.require_groups("create_introns")?;

        let mut created = 0;
        for g in 0..ngroups {
            let new: Vec<Feature> = {
                let group = &self.groups()[g];
                let mut exons: Vec<&Feature> = self
                    .group_features(group)
                    .filter(|f| f.is_type(EXON_TYPE))
                    .collect();
                exons.sort_by(|a, b| a.cmp_coords(b));

                exons
                    .windows(2)
                    .filter(|pair| pair[1].start - 1 >= pair[0].end + 1)
                    .map(|pair| derived(pair[0], INTRON_TYPE, pair[0].end + 1, pair[1].start - 1))
                    .collect()
            };

            created += new.len();
            for feat in new {
                self.push_to_group(g, feat);
            }
        }

        log::debug!("create_introns: added {created} records");
        Ok(created)
    }

    /// Adds start/stop codons and splice sites implied by the CDS and UTR
    /// records of each group.
    ///
    /// Codons are carved from the terminal CDS records (at least 3 bp long).
    /// Stop codons lie inside the annotated CDS, which is trimmed by 3 bp to
    /// exclude them; the codon's frame continues from the trimmed CDS.
    /// Two-base splice sites are added on each side of a CDS or UTR record
    /// unless that side is a transcript end or a CDS end.
    pub fn create_signals(&mut self) -> Result<usize> {
        let ngroups = self.require_groups("create_signals")?;

        let mut created = 0;
        for g in 0..ngroups {
            let (members, reverse, cds_span, trans_span) = {
                let group = &self.groups()[g];
                let cds = span_of(self.group_features(group), |f| f.is_type(CDS_TYPE));
                let trans = span_of(self.group_features(group), |f| {
                    f.is_type(CDS_TYPE) || is_utr(f)
                });
                (
                    group.members.clone(),
                    group_strand(group, &self.features) == Strand::Reverse,
                    cds,
                    trans,
                )
            };
            let (Some((cds_start, cds_end)), Some((trans_start, trans_end))) =
                (cds_span, trans_span)
            else {
                continue;
            };

            let mut new = Vec::new();
            for m in members {
                let feat = &mut self.features[m];
                let is_cds = feat.is_type(CDS_TYPE);
                if !is_cds && !is_utr(feat) {
                    continue;
                }

                if is_cds && feat.start == cds_start && feat.len() >= 3 {
                    let mut codon = feat.clone();
                    codon.end = codon.start + 2;
                    if reverse {
                        codon.feature = STOP_TYPE.to_string();
                        feat.start += 3;
                        codon.frame = feat.frame.map(|fr| fr.advance(feat.len()));
                    } else {
                        codon.feature = START_TYPE.to_string();
                    }
                    new.push(codon);
                }

                if is_cds && feat.end == cds_end && feat.len() >= 3 {
                    let mut codon = feat.clone();
                    codon.start = codon.end - 2;
                    if reverse {
                        codon.feature = START_TYPE.to_string();
                    } else {
                        codon.feature = STOP_TYPE.to_string();
                        feat.end -= 3;
                        codon.frame = feat.frame.map(|fr| fr.advance(feat.len()));
                    }
                    new.push(codon);
                }

                let splice_before = if is_cds {
                    feat.start != cds_start && feat.start != cds_start + 3
                } else {
                    feat.start != trans_start && feat.start != cds_end + 1
                };
                if splice_before {
                    let kind = if reverse { SPLICE5_TYPE } else { SPLICE3_TYPE };
                    new.push(derived(feat, kind, feat.start - 2, feat.start - 1));
                }

                let splice_after = if is_cds {
                    feat.end != cds_end && feat.end != cds_end - 3
                } else {
                    feat.end != cds_start - 1 && feat.end != trans_end
                };
                if splice_after {
                    let kind = if reverse { SPLICE3_TYPE } else { SPLICE5_TYPE };
                    new.push(derived(feat, kind, feat.end + 1, feat.end + 2));
                }
            }

            created += new.len();
            for feat in new {
                self.push_to_group(g, feat);
            }
        }

        self.refresh_spans();
        log::debug!("create_signals: added {created} records");
        Ok(created)
    }

    /// Prefixes every member attribute with `gene_id "<group name>" ; `.
    pub fn add_gene_id(&mut self) -> Result<()> {
        self.require_groups("add_gene_id")?;
        let Some(grouping) = self.groups.as_ref() else {
            return Ok(());
        };

        for group in &grouping.groups {
            for &m in &group.members {
                let feat = &mut self.features[m];
                feat.attribute = format!("gene_id \"{}\" ; {}", group.name, feat.attribute);
            }
        }
        Ok(())
    }

    /// Keeps the groups named in `names` (or, with `exclude`, the others) and
    /// returns the records of the dropped groups.
    pub fn filter_by_group<S: AsRef<str>>(
        &mut self,
        names: &[S],
        exclude: bool,
    ) -> Result<Vec<Feature>> {
        self.require_groups("filter_by_group")?;
        let Some(grouping) = self.groups.take() else {
            return Ok(Vec::new());
        };

        let wanted: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        let kept: Vec<Group> = grouping
            .groups
            .into_iter()
            .filter(|g| wanted.contains(g.name.as_str()) != exclude)
            .collect();

        let discarded = self.rebuild_from_groups(grouping.key, kept);
        log::debug!("filter_by_group: discarded {} records", discarded.len());
        Ok(discarded)
    }
}
