//! Pairwise alignment records and the overlap-store collaborator
//! interface.

use crate::read::{Orientation, ReadId};
use crate::span::{segment_ceil, Span};

/// One W-aligned slice of a trace: the diff count and B-length
/// consumed while walking across that slice of the A-interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceSlice {
    pub diff: u32,
    pub blen: u32,
}

/// A directed alignment from `a` to `b`. `b_span` is always expressed
/// in B's forward-strand coordinates; the trace walks A in its
/// forward direction and consumes B bases in the alignment's walk
/// direction, which only coincides with B-forward order when
/// `orientation` is `Normal`.
#[derive(Debug, Clone)]
pub struct Overlap {
    pub a: ReadId,
    pub b: ReadId,
    pub orientation: Orientation,
    pub a_span: Span,
    pub b_span: Span,
    pub trace: Vec<TraceSlice>,
}

/// Margin (bases) an overlap must extend past a site on both sides to
/// count as a "spanner".
pub const MIN_SPAN: u32 = 400;

impl Overlap {
    /// The W-grid boundaries used by the trace: the W-grid intersected
    /// with `a_span`, with the first and last slice clipped to the
    /// interval's actual endpoints.
    pub fn slice_bounds(&self, w: u32) -> Vec<Span> {
        let n = self.trace.len();
        let mut bounds = Vec::with_capacity(n);
        if n == 0 {
            return bounds;
        }
        let mut pos = self.a_span.start;
        for i in 0..n {
            let next = if i + 1 == n {
                self.a_span.end
            } else {
                segment_ceil(pos + 1, w)
            };
            bounds.push(Span::new(pos, next));
            pos = next;
        }
        bounds
    }

    /// Cumulative B bases (in alignment-walk order) consumed by the
    /// first `idx` trace slices.
    fn cum_b(&self, idx: usize) -> u32 {
        self.trace[..idx].iter().map(|t| t.blen).sum()
    }

    /// Locate the trace-slice index whose bounds start at or contain
    /// `a_pos`, given the slice boundaries from `slice_bounds`.
    pub fn slice_index_at(bounds: &[Span], a_pos: u32) -> Option<usize> {
        bounds.iter().position(|s| a_pos < s.end)
    }

    /// Map the B window aligned to slices `[lo_idx, hi_idx)` into B's
    /// forward-strand coordinates. Conversion to forward coordinates
    /// happens only at the end, after the cumulative walk — never
    /// before.
    pub fn b_window_for_slices(&self, lo_idx: usize, hi_idx: usize) -> Span {
        let cum_lo = self.cum_b(lo_idx);
        let cum_hi = self.cum_b(hi_idx);
        match self.orientation {
            Orientation::Normal => {
                Span::new(self.b_span.start + cum_lo, self.b_span.start + cum_hi)
            }
            Orientation::Complement => {
                Span::new(self.b_span.end - cum_hi, self.b_span.end - cum_lo)
            }
        }
    }

    /// Average diff-weighted quality isn't tracked on the overlap
    /// itself; this returns the raw diff sum over slices `[lo, hi)`,
    /// used by the flip detector's mirrored-interval walk.
    pub fn diff_sum(&self, lo_idx: usize, hi_idx: usize) -> u32 {
        self.trace[lo_idx..hi_idx].iter().map(|t| t.diff).sum()
    }
}

/// Count of overlaps that "strictly span" `[lo, hi)` with margin
/// `MIN_SPAN` on both sides — i.e. ordinary evidence that the region
/// is not actually broken.
pub fn spanners(overlaps: &[Overlap], lo: u32, hi: u32) -> usize {
    let lo = lo as i64;
    let hi = hi as i64;
    overlaps
        .iter()
        .filter(|o| {
            (o.a_span.start as i64) < lo - MIN_SPAN as i64
                && (o.a_span.end as i64) > hi + MIN_SPAN as i64
        })
        .count()
}

/// Count of overlaps spanning `[lo, hi)` with the tighter 100-base
/// margin used by the weak-region scanner and the final `span`
/// recomputation in the candidate reducer.
pub fn spanners_margin(overlaps: &[Overlap], lo: u32, hi: u32, margin: u32) -> usize {
    let lo = lo as i64;
    let hi = hi as i64;
    let margin = margin as i64;
    overlaps
        .iter()
        .filter(|o| (o.a_span.start as i64) + margin < lo && (o.a_span.end as i64) - margin > hi)
        .count()
}

/// Read-only accessor for the overlap store: overlaps of a given
/// A-read, already grouped and ordered (self-overlaps first, then
/// grouped by B-read id, sorted by A-start within group).
pub trait OverlapSource {
    fn overlaps_for(&self, a: ReadId) -> &[Overlap];
}
