//! File-backed overlap store. A plain whitespace-delimited text
//! format, line-split with `memchr` the way BED readers split records
//! before tokenizing fields.
//!
//! One line per overlap:
//! `a b orientation abpos aepos bbpos bepos diff:blen[,diff:blen...]`
//! `orientation` is `N` or `C`.

use std::fs;
use std::path::Path;

use memchr::memchr_iter;

use crate::error::{PatchError, Result};
use crate::overlap::{Overlap, OverlapSource, TraceSlice};
use crate::read::{Orientation, ReadId};
use crate::span::Span;

#[derive(Debug)]
pub struct OverlapFile {
    overlaps: Vec<Overlap>,
    /// `(start, end)` range into `overlaps` for each A-read id.
    index: Vec<(u32, u32)>,
}

impl OverlapFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        let mut overlaps = Vec::new();

        let mut line_start = 0usize;
        let mut line_no = 1usize;
        for nl in memchr_iter(b'\n', &bytes).chain(std::iter::once(bytes.len())) {
            let line = &bytes[line_start..nl];
            line_start = nl + 1;
            if line.iter().all(u8::is_ascii_whitespace) {
                line_no += 1;
                continue;
            }
            overlaps.push(parse_line(line, line_no)?);
            line_no += 1;
            if line_start > bytes.len() {
                break;
            }
        }

        overlaps.sort_by(|x, y| {
            let key = |o: &Overlap| (o.a.0, (o.a != o.b) as u8, o.b.0, o.a_span.start);
            key(x).cmp(&key(y))
        });

        let max_a = overlaps.iter().map(|o| o.a.0).max().map(|m| m + 1).unwrap_or(0);
        let mut index = vec![(0u32, 0u32); max_a as usize];
        let mut i = 0usize;
        while i < overlaps.len() {
            let a = overlaps[i].a.0;
            let start = i;
            while i < overlaps.len() && overlaps[i].a.0 == a {
                i += 1;
            }
            index[a as usize] = (start as u32, i as u32);
        }

        Ok(Self { overlaps, index })
    }
}

impl OverlapSource for OverlapFile {
    fn overlaps_for(&self, a: ReadId) -> &[Overlap] {
        match self.index.get(a.0 as usize) {
            Some(&(start, end)) => &self.overlaps[start as usize..end as usize],
            None => &[],
        }
    }
}

fn parse_line(line: &[u8], line_no: usize) -> Result<Overlap> {
    let text = std::str::from_utf8(line)
        .map_err(|_| PatchError::Parse { line: line_no, message: "invalid utf-8".into() })?;
    let mut fields = text.split_ascii_whitespace();

    let err = || PatchError::Parse { line: line_no, message: "malformed overlap record".into() };

    let a: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let b: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let orientation = match fields.next().ok_or_else(err)? {
        "N" => Orientation::Normal,
        "C" => Orientation::Complement,
        _ => return Err(err()),
    };
    let abpos: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let aepos: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let bbpos: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let bepos: u32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let trace_field = fields.next().ok_or_else(err)?;

    let mut trace = Vec::new();
    for pair in trace_field.split(',') {
        let (d, l) = pair.split_once(':').ok_or_else(err)?;
        trace.push(TraceSlice {
            diff: d.parse().map_err(|_| err())?,
            blen: l.parse().map_err(|_| err())?,
        });
    }

    Ok(Overlap {
        a: ReadId(a),
        b: ReadId(b),
        orientation,
        a_span: Span::new(abpos, aepos),
        b_span: Span::new(bbpos, bepos),
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_and_groups_by_a_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlaps.txt");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "0 0 C 100 900 100 900 0:800").unwrap();
        writeln!(f, "0 1 N 0 2000 0 2000 0:2000").unwrap();
        writeln!(f, "1 0 N 0 2000 0 2000 0:2000").unwrap();
        drop(f);

        let store = OverlapFile::open(&path).unwrap();
        let for_a0 = store.overlaps_for(ReadId(0));
        assert_eq!(for_a0.len(), 2);
        assert_eq!(for_a0[0].b, ReadId(0)); // self-overlap sorts first
        assert_eq!(for_a0[1].b, ReadId(1));
        assert_eq!(store.overlaps_for(ReadId(1)).len(), 1);
        assert!(store.overlaps_for(ReadId(9)).is_empty());
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "0 1 N 0 100\n").unwrap();
        let err = OverlapFile::open(&path).unwrap_err();
        match err {
            PatchError::Parse { line, .. } => assert_eq!(line, 1),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
