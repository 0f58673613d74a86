//! Track accessor: read-only interfaces over the per-read quality,
//! masking, trim and user annotation tracks, plus simple in-memory
//! implementations used by tests and small inputs.

use crate::read::ReadId;
use crate::span::Span;

/// Segment-quality track: one small nonnegative integer per `W`-wide
/// segment; `0` is the "unknown/masked" sentinel.
pub trait QualityTrack {
    fn segments(&self, r: ReadId) -> &[u8];
}

/// Masking intervals (e.g. dusted low-complexity regions), non-
/// overlapping and sorted per read.
pub trait MaskTrack {
    fn intervals(&self, r: ReadId) -> &[Span];
}

/// Optional single trim interval per read.
pub trait TrimTrack {
    /// `None` means no trim track is configured for this run at all;
    /// callers fall back to the full read length. A configured but
    /// empty interval (`start == end`) means the read is fully
    /// excluded and silently skipped.
    fn interval(&self, r: ReadId) -> Option<Span>;
}

/// Opaque user annotation track: intervals only, remapped transparently.
pub trait UserTrack {
    fn name(&self) -> &str;
    fn intervals(&self, r: ReadId) -> &[Span];
}

/// `q == 0` (no data) or `q >= lowq` (poor).
#[inline]
pub fn is_bad_quality(q: u8, lowq: u8) -> bool {
    q == 0 || q >= lowq
}

/// `Vec`-backed quality track indexed directly by `ReadId`.
#[derive(Debug, Clone, Default)]
pub struct VecQualityTrack(pub Vec<Vec<u8>>);

impl QualityTrack for VecQualityTrack {
    fn segments(&self, r: ReadId) -> &[u8] {
        self.0.get(r.0 as usize).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// `Vec`-backed mask track.
#[derive(Debug, Clone, Default)]
pub struct VecMaskTrack(pub Vec<Vec<Span>>);

impl MaskTrack for VecMaskTrack {
    fn intervals(&self, r: ReadId) -> &[Span] {
        self.0.get(r.0 as usize).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Stand-in trim track used when no `-t` trim track was named on the
/// command line: every read falls back to its full length.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrimTrack;

impl TrimTrack for NoTrimTrack {
    fn interval(&self, _r: ReadId) -> Option<Span> {
        None
    }
}

/// `Vec`-backed trim track; `None` entries mean "read excluded".
#[derive(Debug, Clone, Default)]
pub struct VecTrimTrack(pub Vec<Option<Span>>);

impl TrimTrack for VecTrimTrack {
    fn interval(&self, r: ReadId) -> Option<Span> {
        self.0.get(r.0 as usize).copied().flatten()
    }
}

/// `Vec`-backed named user track.
#[derive(Debug, Clone)]
pub struct VecUserTrack {
    pub name: String,
    pub intervals: Vec<Vec<Span>>,
}

impl UserTrack for VecUserTrack {
    fn name(&self) -> &str {
        &self.name
    }

    fn intervals(&self, r: ReadId) -> &[Span] {
        self.intervals
            .get(r.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_zero_is_always_bad() {
        assert!(is_bad_quality(0, 28));
        assert!(!is_bad_quality(1, 28));
        assert!(is_bad_quality(28, 28));
        assert!(!is_bad_quality(27, 28));
    }

    #[test]
    fn vec_tracks_return_empty_slice_out_of_range() {
        let t = VecQualityTrack(vec![vec![30, 30]]);
        assert_eq!(t.segments(ReadId(0)), &[30, 30]);
        assert_eq!(t.segments(ReadId(5)), &[] as &[u8]);
    }
}
