//! Per-read orchestrator: wires the track accessor, flip detector, gap
//! collector, weak-region scanner, candidate reducer, patch assembler
//! and track remapper together for one A-read, plus the
//! `rayon`-parallel driver across all A-reads.

use rayon::prelude::*;

use crate::assemble::assemble;
use crate::candidate::reduce_candidates;
use crate::config::RepairConfig;
use crate::error::{PatchError, Result};
use crate::flip::detect_flip;
use crate::gapcollect::collect_gaps;
use crate::overlap::OverlapSource;
use crate::read::{ReadDb, ReadId};
use crate::remap::{remap_track, remap_trim_only};
use crate::span::{segment_count, Span};
use crate::tracks::{MaskTrack, QualityTrack, TrimTrack, UserTrack};
use crate::weakscan::scan_weak_regions;

/// Whether a read's output was actually patched or only trimmed
/// (`fixed_` vs `trimmed_` output headers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    Fixed,
    Trimmed,
}

/// One emitted read: sequence, parallel quality streams, and the
/// remapped, named user tracks.
#[derive(Debug, Clone)]
pub struct PatchedRead {
    pub kind: ReadKind,
    pub aread: ReadId,
    pub sequence: Vec<u8>,
    pub quality: Vec<Vec<u8>>,
    pub tracks: Vec<(String, Vec<Span>)>,
}

/// Run the full repair pipeline for one A-read. Returns `Ok(None)` for
/// every silent-skip outcome (empty trim window, patched length below
/// `min_len`); returns `Err` only for fatal, abort-the-run conditions.
pub fn repair_read(
    db: &dyn ReadDb,
    overlaps_src: &dyn OverlapSource,
    quality: &dyn QualityTrack,
    mask: &dyn MaskTrack,
    trim: &dyn TrimTrack,
    user_tracks: &[&(dyn UserTrack + Sync)],
    cfg: &RepairConfig,
    a: ReadId,
) -> Result<Option<PatchedRead>> {
    let l = db.read_len(a);
    let w = cfg.segment_width;

    let a_quality = quality.segments(a);
    let want = segment_count(l, w) as usize;
    if a_quality.len() != want {
        return Err(PatchError::TrackLengthMismatch {
            read: a,
            got: a_quality.len(),
            want,
        });
    }

    for m in mask.intervals(a) {
        if m.start > l || m.end > l || m.start > m.end {
            return Err(PatchError::MaskOutOfBounds { read: a, b: m.start, e: m.end, len: l });
        }
    }

    let (trim_b0, trim_e0) = match trim.interval(a) {
        None => (0, l),
        Some(span) => {
            if span.is_empty() {
                return Ok(None);
            }
            (span.start, span.end)
        }
    };
    if trim_b0 >= trim_e0 || trim_e0 > l {
        return Err(PatchError::InvalidTrim { read: a, b: trim_b0, e: trim_e0 });
    }

    let overlaps = overlaps_src.overlaps_for(a);
    let flip = detect_flip(overlaps, l, trim_b0, trim_e0, w);
    let (trim_b, trim_e) = (flip.trim_b, flip.trim_e);
    if trim_b >= trim_e {
        return Ok(None);
    }

    let split = overlaps.iter().position(|o| o.b != o.a).unwrap_or(overlaps.len());
    let rest = &overlaps[split..];

    let mut candidates = collect_gaps(rest, quality, mask, db, w);
    let weak = scan_weak_regions(rest, quality, a_quality, &candidates, trim_b, trim_e, cfg.lowq, w);
    candidates.extend(weak);

    let survivors = reduce_candidates(candidates, rest, cfg, a_quality);

    let mut a_seq = Vec::new();
    db.load_read(a, &mut a_seq)?;
    let mut a_quality_streams = Vec::new();
    db.load_quality(a, &mut a_quality_streams)?;

    let (sequence, out_quality, patch_map) =
        assemble(db, &a_seq, &a_quality_streams, &survivors, trim_b, trim_e)?;

    if (sequence.len() as u32) < cfg.min_len {
        return Ok(None);
    }

    let mut tracks = Vec::with_capacity(user_tracks.len());
    for ut in user_tracks {
        let intervals = ut.intervals(a);
        let mapped = if survivors.is_empty() {
            remap_trim_only(intervals, trim_b, trim_e)
        } else {
            remap_track(&patch_map, intervals, sequence.len() as u32, a)?
        };
        tracks.push((ut.name().to_string(), mapped));
    }

    let kind = if survivors.is_empty() { ReadKind::Trimmed } else { ReadKind::Fixed };

    Ok(Some(PatchedRead { kind, aread: a, sequence, quality: out_quality, tracks }))
}

/// Repair every A-read in `db`, in parallel, returning results in
/// A-read order — reads are processed independently, and output order
/// is the only guarantee. Aborts on the first fatal error from any
/// read.
pub fn repair_all(
    db: &(dyn ReadDb + Sync),
    overlaps_src: &(dyn OverlapSource + Sync),
    quality: &(dyn QualityTrack + Sync),
    mask: &(dyn MaskTrack + Sync),
    trim: &(dyn TrimTrack + Sync),
    user_tracks: &[&(dyn UserTrack + Sync)],
    cfg: &RepairConfig,
) -> Result<Vec<PatchedRead>> {
    let n = db.num_reads() as u32;
    let results: Vec<Option<PatchedRead>> = (0..n)
        .into_par_iter()
        .map(|i| repair_read(db, overlaps_src, quality, mask, trim, user_tracks, cfg, ReadId(i)))
        .collect::<Result<Vec<_>>>()?;
    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::{Overlap, TraceSlice};
    use crate::read::Orientation;
    use crate::tracks::{NoTrimTrack, VecMaskTrack, VecQualityTrack};

    struct FixedDb {
        len: u32,
        seq: Vec<u8>,
        quality: Vec<u8>,
    }

    impl ReadDb for FixedDb {
        fn num_reads(&self) -> usize {
            2
        }
        fn read_len(&self, _r: ReadId) -> u32 {
            self.len
        }
        fn num_quality_streams(&self) -> usize {
            1
        }
        fn load_read(&self, _r: ReadId, out: &mut Vec<u8>) -> std::io::Result<()> {
            out.clear();
            out.extend_from_slice(&self.seq);
            Ok(())
        }
        fn load_quality(&self, _r: ReadId, out: &mut Vec<Vec<u8>>) -> std::io::Result<()> {
            out.clear();
            out.push(self.quality.clone());
            Ok(())
        }
    }

    struct OneReadOverlaps(Vec<Overlap>);
    impl OverlapSource for OneReadOverlaps {
        fn overlaps_for(&self, _a: ReadId) -> &[Overlap] {
            &self.0
        }
    }

    #[test]
    fn passthrough_with_no_overlaps_emits_trimmed_read() {
        let db = FixedDb { len: 2000, seq: vec![b'A'; 2000], quality: vec![30; 2000] };
        let overlaps = OneReadOverlaps(Vec::new());
        let quality = VecQualityTrack(vec![vec![30; 4]]);
        let mask = VecMaskTrack::default();
        let trim = NoTrimTrack;
        let cfg = RepairConfig::new(500);

        let out = repair_read(&db, &overlaps, &quality, &mask, &trim, &[], &cfg, ReadId(0))
            .unwrap()
            .unwrap();
        assert_eq!(out.kind, ReadKind::Trimmed);
        assert_eq!(out.sequence.len(), 2000);
    }

    #[test]
    fn gap_between_overlaps_is_patched_with_donor() {
        let db = FixedDb { len: 5000, seq: vec![b'A'; 5000], quality: vec![30; 5000] };
        let prev = Overlap {
            a: ReadId(0),
            b: ReadId(1),
            orientation: Orientation::Normal,
            a_span: Span::new(0, 2000),
            b_span: Span::new(0, 2000),
            trace: vec![TraceSlice { diff: 0, blen: 2000 }],
        };
        let cur = Overlap {
            a: ReadId(0),
            b: ReadId(1),
            orientation: Orientation::Normal,
            a_span: Span::new(2500, 5000),
            b_span: Span::new(2480, 5000),
            trace: vec![TraceSlice { diff: 0, blen: 2520 }],
        };
        // 4 more repeats of the same pair push support to 5.
        let mut overlaps = vec![prev.clone(), cur.clone()];
        for _ in 0..4 {
            overlaps.push(prev.clone());
            overlaps.push(cur.clone());
        }
        let quality = VecQualityTrack(vec![vec![30; 10], vec![30; 10]]);
        let mask = VecMaskTrack::default();
        let trim = NoTrimTrack;
        let mut a_quality = vec![30u8; 10];
        a_quality[4] = 0; // segment covering [2000,2500) is "bad"
        let quality = VecQualityTrack(vec![a_quality.clone(), quality.0[1].clone()]);

        let cfg = RepairConfig::new(500);
        let out = repair_read(&db, &OneReadOverlaps(overlaps), &quality, &mask, &trim, &[], &cfg, ReadId(0))
            .unwrap()
            .unwrap();
        assert_eq!(out.kind, ReadKind::Fixed);
        assert!(out.sequence.len() >= 5000 - 500);
    }
}
