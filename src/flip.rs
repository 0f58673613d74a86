//! Flip detector: inspects self-overlaps for evidence of a chimeric
//! fold and narrows the trim window away from the smaller side of any
//! detected cut.

use crate::overlap::{spanners, Overlap};
use crate::span::Span;

/// Result of one flip-detection pass over a read's self-overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipResult {
    pub trim_b: u32,
    pub trim_e: u32,
    pub found: bool,
}

/// `overlaps` must be the full overlap list for one A-read, with
/// self-overlaps (`b == a`) forming a contiguous prefix. `a_len` is
/// the A-read's length, used to mirror coordinates across the fold
/// point.
pub fn detect_flip(overlaps: &[Overlap], a_len: u32, trim_b0: u32, trim_e0: u32, w: u32) -> FlipResult {
    let self_overlaps: Vec<&Overlap> = overlaps
        .iter()
        .take_while(|o| o.b == o.a)
        .filter(|o| o.orientation.is_complement())
        .collect();

    // Each region is a suspected fold zone: A-coordinates that align
    // against their own mirror image. The whole zone goes to whichever
    // side of the read is smaller, keeping the larger remaining side.
    let mut regions: Vec<(u32, u32)> = Vec::new();

    for o in &self_overlaps {
        let mirrored = mirror(o.b_span, a_len);
        if !o.a_span.overlaps(&mirrored) {
            continue;
        }
        let bounds = o.slice_bounds(w);
        for (i, slice) in bounds.iter().enumerate() {
            let bw = o.b_window_for_slices(i, i + 1);
            let mirrored_slice = mirror(bw, a_len);
            if slice.overlaps(&mirrored_slice) {
                regions.push((slice.start, slice.end));
            }
        }
    }

    for pair in self_overlaps.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        if prev.a_span.end >= cur.a_span.start {
            continue;
        }
        let gap = Span::new(prev.a_span.end, cur.a_span.start);
        let mirrored_gap = mirror(gap, a_len);
        if gap.overlaps(&mirrored_gap) && spanners(overlaps, gap.start, gap.end) <= 1 {
            regions.push((gap.start, gap.end));
        }
    }

    regions.sort_unstable();

    let mut trim_b = trim_b0;
    let mut trim_e = trim_e0;
    let mut found = false;
    for (lo, hi) in regions {
        let lo = lo.max(trim_b);
        let hi = hi.min(trim_e);
        if lo >= hi {
            continue;
        }
        let left = lo - trim_b;
        let right = trim_e - hi;
        // Ties favor advancing trim_b (spec worked example S5).
        if left > right {
            trim_e = lo;
        } else {
            trim_b = hi;
        }
        found = true;
        if trim_b >= trim_e {
            break;
        }
    }

    FlipResult { trim_b, trim_e, found }
}

/// Reflect a span across the read midpoint: `x -> a_len - x`.
fn mirror(s: Span, a_len: u32) -> Span {
    Span::new(a_len.saturating_sub(s.end), a_len.saturating_sub(s.start))
}
