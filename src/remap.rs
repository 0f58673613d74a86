//! Track remapper: carries user-track intervals from source
//! A-coordinates into patched output coordinates through the patch
//! map.

use crate::assemble::PatchMap;
use crate::config::MIN_INT_LEN;
use crate::error::{PatchError, Result};
use crate::read::ReadId;
use crate::span::Span;

/// Map one source interval `[ib, ie)` through `patch_map` into patched
/// coordinates. Returns `Ok(None)` when the interval doesn't
/// intersect any kept span or the mapped result is too short to keep
/// — both silent-skip outcomes, not errors.
pub fn remap_interval(
    patch_map: &PatchMap,
    ib: u32,
    ie: u32,
    rlen: u32,
    read: ReadId,
) -> Result<Option<Span>> {
    let ib_adj = match patch_map.iter().find(|&&(_, e, _)| ib < e) {
        Some(&(s, _, d)) => d + (ib.max(s) - s),
        None => return Ok(None),
    };

    let mut ie_adj = None;
    for (idx, &(s, e, d)) in patch_map.iter().enumerate() {
        if ie <= e {
            if ie < s {
                ie_adj = match idx.checked_sub(1) {
                    Some(prev) => {
                        let (ps, pe, pd) = patch_map[prev];
                        Some(pd + (pe - ps))
                    }
                    None => None,
                };
            } else {
                ie_adj = Some(d + (ie - s));
            }
            break;
        }
    }
    let ie_adj = match ie_adj {
        Some(v) => v,
        None => return Ok(None),
    };

    let len = ie_adj as i64 - ib_adj as i64;
    if len <= MIN_INT_LEN as i64 {
        return Ok(None);
    }

    if ib_adj > rlen || ie_adj > rlen || ib_adj > ie_adj {
        return Err(PatchError::RemapOutOfBounds {
            read,
            b: ib_adj as i64,
            e: ie_adj as i64,
            len: rlen,
        });
    }

    Ok(Some(Span::new(ib_adj, ie_adj)))
}

/// Remap every interval of one user track through `patch_map`,
/// dropping intervals the remapper silently skips.
pub fn remap_track(
    patch_map: &PatchMap,
    intervals: &[Span],
    rlen: u32,
    read: ReadId,
) -> Result<Vec<Span>> {
    let mut out = Vec::with_capacity(intervals.len());
    for iv in intervals {
        if let Some(mapped) = remap_interval(patch_map, iv.start, iv.end, rlen, read)? {
            out.push(mapped);
        }
    }
    Ok(out)
}

/// Trim-only passthrough remap: subtract `trim_b` and clip to
/// `[0, trim_e - trim_b)`, dropping intervals shorter than
/// `MIN_INT_LEN` afterward.
pub fn remap_trim_only(intervals: &[Span], trim_b: u32, trim_e: u32) -> Vec<Span> {
    let window = Span::new(trim_b, trim_e);
    intervals
        .iter()
        .filter_map(|iv| iv.clip(window))
        .map(|clipped| Span::new(clipped.start - trim_b, clipped.end - trim_b))
        .filter(|s| s.len() >= MIN_INT_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_fully_inside_single_kept_span() {
        let map: PatchMap = vec![(0, 400, 0), (600, 1000, 408)];
        let got = remap_interval(&map, 100, 300, 2000, ReadId(0)).unwrap().unwrap();
        assert_eq!(got, Span::new(100, 300));
    }

    #[test]
    fn interval_starting_in_a_gap_clamps_to_previous_span_end() {
        let map: PatchMap = vec![(0, 400, 0), (600, 1000, 408)];
        // [450, 700) starts inside the donor gap; ie=700 maps into the
        // second kept span, ib clamps forward to the first span it hits.
        let got = remap_interval(&map, 450, 700, 2000, ReadId(0)).unwrap();
        assert!(got.is_some());
    }

    #[test]
    fn short_mapped_interval_is_dropped() {
        let map: PatchMap = vec![(0, 1000, 0)];
        assert!(remap_interval(&map, 100, 103, 2000, ReadId(0)).unwrap().is_none());
    }

    #[test]
    fn trim_only_passthrough_subtracts_and_clips() {
        let intervals = vec![Span::new(50, 200), Span::new(900, 950)];
        let out = remap_trim_only(&intervals, 100, 1000);
        assert_eq!(out, vec![Span::new(0, 100), Span::new(800, 850)]);
    }
}
