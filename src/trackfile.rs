//! File-backed track adapters for the quality, mask, trim and user
//! annotation tracks. Same memchr-split, whitespace-tokenized line
//! format as `overlapfile`, kept deliberately simple since the file
//! format itself is outside the core's contract.

use std::fs;
use std::path::Path;

use memchr::memchr_iter;

use crate::error::{PatchError, Result};
use crate::read::ReadId;
use crate::span::Span;
use crate::tracks::{MaskTrack, QualityTrack, TrimTrack, UserTrack};

fn for_each_line<F>(bytes: &[u8], mut f: F) -> Result<()>
where
    F: FnMut(&str, usize) -> Result<()>,
{
    let mut start = 0usize;
    let mut line_no = 1usize;
    for nl in memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
        let line = &bytes[start..nl];
        start = nl + 1;
        if !line.iter().all(u8::is_ascii_whitespace) {
            let text = std::str::from_utf8(line)
                .map_err(|_| PatchError::Parse { line: line_no, message: "invalid utf-8".into() })?;
            f(text, line_no)?;
        }
        line_no += 1;
        if start > bytes.len() {
            break;
        }
    }
    Ok(())
}

fn parse_err(line: usize) -> PatchError {
    PatchError::Parse { line, message: "malformed track record".into() }
}

/// `readid q0,q1,q2,...` — one record per read.
pub struct SegmentTrackFile(Vec<Vec<u8>>);

impl SegmentTrackFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        let mut rows: Vec<Vec<u8>> = Vec::new();
        for_each_line(&bytes, |text, line_no| {
            let mut fields = text.split_ascii_whitespace();
            let id: usize = fields.next().ok_or_else(|| parse_err(line_no))?.parse().map_err(|_| parse_err(line_no))?;
            let values = fields.next().ok_or_else(|| parse_err(line_no))?;
            let segs: Vec<u8> = values
                .split(',')
                .map(|v| v.parse().map_err(|_| parse_err(line_no)))
                .collect::<Result<_>>()?;
            if id >= rows.len() {
                rows.resize(id + 1, Vec::new());
            }
            rows[id] = segs;
            Ok(())
        })?;
        Ok(Self(rows))
    }
}

impl QualityTrack for SegmentTrackFile {
    fn segments(&self, r: ReadId) -> &[u8] {
        self.0.get(r.0 as usize).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// `readid b1,e1,b2,e2,...` — zero or more non-overlapping intervals
/// per read. Used for both the mask track and user annotation tracks.
pub struct IntervalTrackFile {
    name: String,
    rows: Vec<Vec<Span>>,
}

impl IntervalTrackFile {
    pub fn open<P: AsRef<Path>>(path: P, name: impl Into<String>) -> Result<Self> {
        let bytes = fs::read(path)?;
        let mut rows: Vec<Vec<Span>> = Vec::new();
        for_each_line(&bytes, |text, line_no| {
            let mut fields = text.split_ascii_whitespace();
            let id: usize = fields.next().ok_or_else(|| parse_err(line_no))?.parse().map_err(|_| parse_err(line_no))?;
            let mut spans = Vec::new();
            if let Some(values) = fields.next() {
                let nums: Vec<u32> = values
                    .split(',')
                    .map(|v| v.parse().map_err(|_| parse_err(line_no)))
                    .collect::<Result<_>>()?;
                if nums.len() % 2 != 0 {
                    return Err(parse_err(line_no));
                }
                for pair in nums.chunks_exact(2) {
                    spans.push(Span::new(pair[0], pair[1]));
                }
            }
            if id >= rows.len() {
                rows.resize(id + 1, Vec::new());
            }
            rows[id] = spans;
            Ok(())
        })?;
        Ok(Self { name: name.into(), rows })
    }
}

impl MaskTrack for IntervalTrackFile {
    fn intervals(&self, r: ReadId) -> &[Span] {
        self.rows.get(r.0 as usize).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl UserTrack for IntervalTrackFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn intervals(&self, r: ReadId) -> &[Span] {
        self.rows.get(r.0 as usize).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// `readid b e` — at most one interval per read; reads absent from
/// the file fall back to the full read length.
pub struct TrimTrackFile(Vec<Option<Span>>);

impl TrimTrackFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        let mut rows: Vec<Option<Span>> = Vec::new();
        for_each_line(&bytes, |text, line_no| {
            let mut fields = text.split_ascii_whitespace();
            let id: usize = fields.next().ok_or_else(|| parse_err(line_no))?.parse().map_err(|_| parse_err(line_no))?;
            let b: u32 = fields.next().ok_or_else(|| parse_err(line_no))?.parse().map_err(|_| parse_err(line_no))?;
            let e: u32 = fields.next().ok_or_else(|| parse_err(line_no))?.parse().map_err(|_| parse_err(line_no))?;
            if id >= rows.len() {
                rows.resize(id + 1, None);
            }
            rows[id] = Some(Span::new(b, e));
            Ok(())
        })?;
        Ok(Self(rows))
    }
}

impl TrimTrack for TrimTrackFile {
    fn interval(&self, r: ReadId) -> Option<Span> {
        self.0.get(r.0 as usize).copied().flatten()
    }
}
