//! Weak-region scanner: proposes a donor for every uncollected,
//! low-quality W-segment in the trim window.

use crate::candidate::Gap;
use crate::config::WEAK_REGION_MARGIN;
use crate::overlap::Overlap;
use crate::read::ReadId;
use crate::tracks::{is_bad_quality, QualityTrack};

/// Scan `[trim_b, trim_e)` for weak A-segments not already covered by
/// `existing` candidates, and propose a donor-backed candidate for
/// each one that has a qualifying overlap.
pub fn scan_weak_regions(
    overlaps: &[Overlap],
    quality: &dyn QualityTrack,
    a_quality: &[u8],
    existing: &[Gap],
    trim_b: u32,
    trim_e: u32,
    lowq: u8,
    w: u32,
) -> Vec<Gap> {
    let mut seg_first = trim_b / w;
    let mut seg_last = trim_e.div_ceil(w);

    while seg_first < seg_last && a_quality.get(seg_first as usize) == Some(&0) {
        seg_first += 1;
    }
    while seg_last > seg_first && a_quality.get((seg_last - 1) as usize) == Some(&0) {
        seg_last -= 1;
    }

    let mut out = Vec::new();

    for i in seg_first..seg_last {
        let q = match a_quality.get(i as usize) {
            Some(&q) => q,
            None => continue,
        };
        if !is_bad_quality(q, lowq) {
            continue;
        }

        let ab = i * w;
        let ae = ab + w;

        if existing.iter().any(|g| g.ab <= ab && ae <= g.ae) {
            continue;
        }

        if let Some(candidate) = best_donor(overlaps, quality, ab, ae, w) {
            out.push(candidate);
        }
    }

    out
}

fn best_donor(overlaps: &[Overlap], quality: &dyn QualityTrack, ab: u32, ae: u32, w: u32) -> Option<Gap> {
    let mut best: Option<(f64, ReadId, u32, u32, bool)> = None;
    let mut span = 0u32;

    for o in overlaps {
        let margin = WEAK_REGION_MARGIN as i64;
        if !(o.a_span.start as i64 <= ab as i64 - margin && o.a_span.end as i64 >= ae as i64 + margin) {
            continue;
        }
        span += 1;

        let bounds = o.slice_bounds(w);
        let lo_idx = match Overlap::slice_index_at(&bounds, ab) {
            Some(idx) => idx,
            None => continue,
        };
        let hi_idx = match Overlap::slice_index_at(&bounds, ae.saturating_sub(1)) {
            Some(idx) => idx + 1,
            None => bounds.len(),
        };
        let bw = o.b_window_for_slices(lo_idx, hi_idx);

        let b_quality = quality.segments(o.b);
        let seg_lo = (bw.start / w) as usize;
        let seg_hi = (bw.end / w) as usize;
        if (seg_lo..=seg_hi).any(|j| b_quality.get(j) == Some(&0)) {
            continue;
        }

        let sum: u32 = (seg_lo..=seg_hi).filter_map(|j| b_quality.get(j)).map(|&q| q as u32).sum();
        let mean = sum as f64 / (seg_hi - seg_lo + 1) as f64;

        let better = match &best {
            Some((m, ..)) => mean < *m,
            None => true,
        };
        if better {
            best = Some((mean, o.b, bw.start, bw.end, o.orientation.is_complement()));
        }
    }

    let (diff, b, bb, be, comp) = best?;

    let support = overlaps
        .iter()
        .filter(|o| {
            (o.a_span.start >= ab && o.a_span.start < ae) || (o.a_span.end >= ab && o.a_span.end < ae)
        })
        .count() as i64;

    Some(Gap { ab, ae, bb, be, b, comp, diff, support, span })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::TraceSlice;
    use crate::read::Orientation;
    use crate::span::Span;
    use crate::tracks::VecQualityTrack;

    fn ovl(a: Span, b: Span, blen: u32) -> Overlap {
        Overlap {
            a: ReadId(0),
            b: ReadId(1),
            orientation: Orientation::Normal,
            a_span: a,
            b_span: b,
            trace: vec![TraceSlice { diff: 0, blen }],
        }
    }

    #[test]
    fn proposes_donor_for_low_quality_segment() {
        let overlaps = vec![ovl(Span::new(0, 2000), Span::new(0, 2000), 2000)];
        let quality = VecQualityTrack(vec![vec![], vec![20, 20, 20, 20]]);
        let a_quality = [30u8, 28, 30, 30];
        let cands = scan_weak_regions(&overlaps, &quality, &a_quality, &[], 0, 2000, 28, 500);
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].ab, 500);
        assert_eq!(cands[0].ae, 1000);
    }

    #[test]
    fn already_collected_segment_is_skipped() {
        let overlaps = vec![ovl(Span::new(0, 2000), Span::new(0, 2000), 2000)];
        let quality = VecQualityTrack(vec![vec![], vec![20, 20, 20, 20]]);
        let a_quality = [30u8, 28, 30, 30];
        let existing = vec![Gap { ab: 500, ae: 1000, bb: 0, be: 1, b: ReadId(1), comp: false, diff: 0.0, support: 1, span: 0 }];
        let cands = scan_weak_regions(&overlaps, &quality, &a_quality, &existing, 0, 2000, 28, 500);
        assert!(cands.is_empty());
    }

    #[test]
    fn sentinel_edges_are_trimmed_from_scan_range() {
        let overlaps: Vec<Overlap> = Vec::new();
        let quality = VecQualityTrack(vec![]);
        let a_quality = [0u8, 30, 30, 0];
        let cands = scan_weak_regions(&overlaps, &quality, &a_quality, &[], 0, 2000, 28, 500);
        assert!(cands.is_empty());
    }
}
