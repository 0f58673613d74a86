//! Gap candidates and the candidate reducer. Candidates are produced
//! by the gap collector and weak-region scanner, then quantized,
//! merged and filtered here before patch assembly.

use crate::config::{
    RepairConfig, EXACT_MERGE_TOLERANCE, MAX_SPANNERS, MIN_SUPPORT, SPAN_RECOMPUTE_MARGIN,
};
use crate::overlap::{spanners, spanners_margin, Overlap};
use crate::read::ReadId;
use crate::span::segment_floor;
use crate::tracks::is_bad_quality;

/// Withdrawn sentinel for `Gap::support`: marks a candidate retired
/// during reduction without removing it from the working list.
pub const WITHDRAWN: i64 = -1;

/// One candidate repair: an A-interval to replace with a donor window
/// from read `b`.
#[derive(Debug, Clone)]
pub struct Gap {
    pub ab: u32,
    pub ae: u32,
    pub bb: u32,
    pub be: u32,
    pub b: ReadId,
    pub comp: bool,
    /// Average donor quality; lower is better.
    pub diff: f64,
    /// Independent evidence count, or `WITHDRAWN` once retired.
    pub support: i64,
    /// Count of overlaps strictly spanning the candidate with margin.
    pub span: u32,
}

impl Gap {
    #[inline]
    pub fn is_withdrawn(&self) -> bool {
        self.support == WITHDRAWN
    }

    #[inline]
    fn donor_len(&self) -> u32 {
        self.be.saturating_sub(self.bb)
    }
}

/// Sort key: `(ab, ae, diff)` ascending.
fn sort_key(g: &Gap) -> (u32, u32, u64) {
    (g.ab, g.ae, g.diff.to_bits())
}

/// Run the full reduction pipeline (size filter, exact-equal merge,
/// overlap merge, excess-span rejection, quality corroboration) and
/// return the surviving candidates, pairwise non-overlapping and
/// resorted by `(ab, ae, diff)`.
pub fn reduce_candidates(
    mut cands: Vec<Gap>,
    overlaps: &[Overlap],
    cfg: &RepairConfig,
    a_quality: &[u8],
) -> Vec<Gap> {
    cands.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    size_filter(&mut cands, cfg.maxgap);
    exact_equal_merge(&mut cands);
    overlap_merge(&mut cands);
    excess_span_rejection(&mut cands, overlaps);
    quality_corroboration_filter(&mut cands, cfg, a_quality);

    let mut survivors: Vec<Gap> = cands.into_iter().filter(|g| !g.is_withdrawn()).collect();
    survivors.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    for g in &mut survivors {
        g.span = spanners_margin(overlaps, g.ab, g.ae, SPAN_RECOMPUTE_MARGIN) as u32;
    }

    survivors
}

/// Rule 1: drop any candidate whose A- or donor-length reaches `maxgap`.
fn size_filter(cands: &mut [Gap], maxgap: u32) {
    for g in cands.iter_mut() {
        let a_len = g.ae.saturating_sub(g.ab);
        let b_len = g.donor_len();
        if a_len >= maxgap || b_len >= maxgap {
            g.support = WITHDRAWN;
        }
    }
}

/// Rule 2: merge later candidates with an identical `(ab, ae)` and a
/// donor length within `EXACT_MERGE_TOLERANCE` bases into the earlier
/// (lower-`diff`) survivor.
fn exact_equal_merge(cands: &mut [Gap]) {
    let n = cands.len();
    for i in 0..n {
        if cands[i].is_withdrawn() {
            continue;
        }
        let (ab, ae, len_i) = (cands[i].ab, cands[i].ae, cands[i].donor_len());
        for j in (i + 1)..n {
            if cands[j].is_withdrawn() {
                continue;
            }
            if cands[j].ab != ab || cands[j].ae != ae {
                continue;
            }
            let len_j = cands[j].donor_len();
            let delta = len_i.abs_diff(len_j);
            if delta < EXACT_MERGE_TOLERANCE {
                cands[i].support += cands[j].support;
                cands[j].support = WITHDRAWN;
            }
        }
    }
}

/// Rule 3: sweep the (ab-sorted) survivors, merging any pair whose
/// A-intervals overlap. The candidate with greater support wins
/// (ties favor the later candidate in sort order); the loser's
/// support is folded into the winner and the loser withdrawn.
fn overlap_merge(cands: &mut [Gap]) {
    let n = cands.len();
    let mut cur = match (0..n).find(|&i| !cands[i].is_withdrawn()) {
        Some(i) => i,
        None => return,
    };
    for j in (cur + 1)..n {
        if cands[j].is_withdrawn() {
            continue;
        }
        let overlaps = cands[j].ab < cands[cur].ae && cands[cur].ab < cands[j].ae;
        if overlaps {
            let winner = if cands[j].support >= cands[cur].support {
                j
            } else {
                cur
            };
            let loser = if winner == j { cur } else { j };
            let loser_support = cands[loser].support;
            cands[winner].support += loser_support;
            cands[loser].support = WITHDRAWN;
            cur = winner;
        } else {
            cur = j;
        }
    }
}

/// Rule 4: withdraw candidates with more than `MAX_SPANNERS` ordinary
/// overlaps spanning them with the flip-detector margin — the region
/// is adequately supported and is not actually broken.
fn excess_span_rejection(cands: &mut [Gap], overlaps: &[Overlap]) {
    for g in cands.iter_mut() {
        if g.is_withdrawn() {
            continue;
        }
        if spanners(overlaps, g.ab, g.ae) > MAX_SPANNERS {
            g.support = WITHDRAWN;
        }
    }
}

/// Rule 5: keep only candidates with `support >= MIN_SUPPORT` and at
/// least one W-segment inside `[ab/W, ae/W)` whose A-quality is the
/// sentinel or at/above `lowq`.
fn quality_corroboration_filter(cands: &mut [Gap], cfg: &RepairConfig, a_quality: &[u8]) {
    let w = cfg.segment_width;
    for g in cands.iter_mut() {
        if g.is_withdrawn() {
            continue;
        }
        if g.support < MIN_SUPPORT as i64 {
            g.support = WITHDRAWN;
            continue;
        }
        let seg_lo = (segment_floor(g.ab, w) / w) as usize;
        let seg_hi = g.ae.div_ceil(w) as usize;
        let corroborated = (seg_lo..seg_hi)
            .any(|i| a_quality.get(i).is_some_and(|&q| is_bad_quality(q, cfg.lowq)));
        if !corroborated {
            g.support = WITHDRAWN;
        }
    }
}
