//! Gap collector: finds A-gaps between consecutive same-B overlaps and
//! proposes a donor window to fill each one.

use crate::candidate::Gap;
use crate::overlap::Overlap;
use crate::read::ReadDb;
use crate::span::{segment_ceil, Span};
use crate::tracks::{MaskTrack, QualityTrack};

/// Walk `overlaps` (already grouped by B-read, sorted by A-start
/// within each group) and emit one candidate per true A-gap between
/// consecutive same-B, same-orientation overlaps.
pub fn collect_gaps(
    overlaps: &[Overlap],
    quality: &dyn QualityTrack,
    mask: &dyn MaskTrack,
    db: &dyn ReadDb,
    w: u32,
) -> Vec<Gap> {
    let mut out = Vec::new();

    for pair in overlaps.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);

        if prev.b != cur.b || prev.orientation != cur.orientation {
            continue;
        }
        if prev.a_span.end >= cur.a_span.start {
            continue; // not a true A-gap
        }

        // ab/ae land on the W-grid boundary closest to the kept side of
        // each flanking overlap: a read already aligned to the grid
        // (the common case) keeps its full kept span, and the gap only
        // swallows extra bases when an endpoint falls mid-segment.
        let ab = segment_ceil(prev.a_span.end, w);
        let ae = segment_ceil(cur.a_span.start, w);

        let last_b = prev.trace.last().map(|t| t.blen).unwrap_or(0);
        let first_b = cur.trace.first().map(|t| t.blen).unwrap_or(0);

        let raw_bb = prev.b_span.end.saturating_sub(last_b);
        let raw_be = cur.b_span.start + first_b;

        let (bb, be) = if prev.orientation.is_complement() {
            let l_b = db.read_len(prev.b);
            (l_b.saturating_sub(raw_be), l_b.saturating_sub(raw_bb))
        } else {
            (raw_bb, raw_be)
        };

        if bb >= be {
            continue;
        }

        let donor = Span::new(bb, be);
        if mask.intervals(prev.b).iter().any(|m| donor.contains(m)) {
            continue;
        }

        let seg_lo = (bb / w) as usize;
        let seg_hi = (be / w) as usize;
        let b_quality = quality.segments(prev.b);
        if (seg_lo..=seg_hi).any(|i| b_quality.get(i) == Some(&0)) {
            continue;
        }

        let sum_q: u32 = (seg_lo..=seg_hi)
            .filter_map(|i| b_quality.get(i))
            .map(|&q| q as u32)
            .sum();
        let diff = 100.0 * sum_q as f64 / (be - bb) as f64;

        out.push(Gap {
            ab,
            ae,
            bb,
            be,
            b: prev.b,
            comp: prev.orientation.is_complement(),
            diff,
            support: 1,
            span: 0,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::TraceSlice;
    use crate::read::{Orientation, ReadId};
    use crate::tracks::{VecMaskTrack, VecQualityTrack};

    struct FixedLenDb(u32);
    impl ReadDb for FixedLenDb {
        fn num_reads(&self) -> usize {
            1
        }
        fn read_len(&self, _r: ReadId) -> u32 {
            self.0
        }
        fn num_quality_streams(&self) -> usize {
            1
        }
        fn load_read(&self, _r: ReadId, _out: &mut Vec<u8>) -> std::io::Result<()> {
            Ok(())
        }
        fn load_quality(&self, _r: ReadId, _out: &mut Vec<Vec<u8>>) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn normal_overlap(a: Span, b: Span, last_or_first_blen: u32) -> Overlap {
        Overlap {
            a: ReadId(0),
            b: ReadId(7),
            orientation: Orientation::Normal,
            a_span: a,
            b_span: b,
            trace: vec![TraceSlice {
                diff: 0,
                blen: last_or_first_blen,
            }],
        }
    }

    #[test]
    fn single_gap_between_matching_overlaps() {
        let prev = normal_overlap(Span::new(0, 2000), Span::new(0, 1000), 0);
        let cur = normal_overlap(Span::new(2500, 5000), Span::new(1480, 3000), 0);
        let overlaps = vec![prev, cur];
        let quality = VecQualityTrack(vec![vec![30; 10], vec![30; 10]]);
        let mask = VecMaskTrack::default();
        let db = FixedLenDb(10_000);

        let gaps = collect_gaps(&overlaps, &quality, &mask, &db, 500);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].ab, 2000);
        assert_eq!(gaps[0].ae, 2500);
        assert_eq!(gaps[0].bb, 1000);
        assert_eq!(gaps[0].be, 1480);
        assert!(!gaps[0].comp);
        assert_eq!(gaps[0].support, 1);
    }

    #[test]
    fn non_gap_pairs_are_skipped() {
        let prev = normal_overlap(Span::new(0, 2000), Span::new(0, 1000), 0);
        let cur = normal_overlap(Span::new(1500, 5000), Span::new(700, 3000), 0);
        let overlaps = vec![prev, cur];
        let quality = VecQualityTrack(vec![vec![30; 10]]);
        let mask = VecMaskTrack::default();
        let db = FixedLenDb(10_000);

        assert!(collect_gaps(&overlaps, &quality, &mask, &db, 500).is_empty());
    }

    #[test]
    fn zero_b_quality_in_window_rejects_candidate() {
        let prev = normal_overlap(Span::new(0, 2000), Span::new(0, 1000), 0);
        let cur = normal_overlap(Span::new(2500, 5000), Span::new(1480, 3000), 0);
        let overlaps = vec![prev, cur];
        let mut quality = VecQualityTrack(vec![vec![30; 10]]);
        quality.0[0][2] = 0;
        let mask = VecMaskTrack::default();
        let db = FixedLenDb(10_000);

        assert!(collect_gaps(&overlaps, &quality, &mask, &db, 500).is_empty());
    }
}
