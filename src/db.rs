//! File-backed read database. A simple length-prefixed binary
//! container, mmap'd for zero-copy random access to sequence and
//! quality bytes.
//!
//! Layout: an 8-byte header `[num_reads: u32][num_quality_streams: u32]`
//! (little-endian) followed by one record per read: `[len: u32][seq:
//! len bytes][quality_0: len bytes]...[quality_{k-1}: len bytes]`.

use std::fs::File;
use std::io;
use std::path::Path;

use memmap2::Mmap;

use crate::read::{ReadDb, ReadId};

const HEADER_LEN: usize = 8;

pub struct FileReadDb {
    mmap: Mmap,
    num_reads: usize,
    num_quality_streams: usize,
    /// `(record_offset, read_len)` per read, in id order.
    index: Vec<(usize, u32)>,
}

impl FileReadDb {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        if mmap.len() < HEADER_LEN {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read database header truncated"));
        }

        let num_reads = u32::from_le_bytes(mmap[0..4].try_into().unwrap()) as usize;
        let num_quality_streams = u32::from_le_bytes(mmap[4..8].try_into().unwrap()) as usize;

        let mut index = Vec::with_capacity(num_reads);
        let mut pos = HEADER_LEN;
        for _ in 0..num_reads {
            if pos + 4 > mmap.len() {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read record truncated"));
            }
            let len = u32::from_le_bytes(mmap[pos..pos + 4].try_into().unwrap());
            let record_bytes = 4 + len as usize * (1 + num_quality_streams);
            if pos + record_bytes > mmap.len() {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read record truncated"));
            }
            index.push((pos, len));
            pos += record_bytes;
        }

        Ok(Self { mmap, num_reads, num_quality_streams, index })
    }

    fn seq_slice(&self, r: ReadId) -> &[u8] {
        let (off, len) = self.index[r.0 as usize];
        let start = off + 4;
        &self.mmap[start..start + len as usize]
    }

    fn quality_slice(&self, r: ReadId, stream: usize) -> &[u8] {
        let (off, len) = self.index[r.0 as usize];
        let len = len as usize;
        let start = off + 4 + len + stream * len;
        &self.mmap[start..start + len]
    }
}

impl ReadDb for FileReadDb {
    fn num_reads(&self) -> usize {
        self.num_reads
    }

    fn read_len(&self, r: ReadId) -> u32 {
        self.index[r.0 as usize].1
    }

    fn num_quality_streams(&self) -> usize {
        self.num_quality_streams
    }

    fn load_read(&self, r: ReadId, out: &mut Vec<u8>) -> io::Result<()> {
        out.clear();
        out.extend_from_slice(self.seq_slice(r));
        Ok(())
    }

    fn load_quality(&self, r: ReadId, out: &mut Vec<Vec<u8>>) -> io::Result<()> {
        out.clear();
        for k in 0..self.num_quality_streams {
            out.push(self.quality_slice(r, k).to_vec());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(path: &Path) {
        let mut f = File::create(path).unwrap();
        f.write_all(&2u32.to_le_bytes()).unwrap();
        f.write_all(&1u32.to_le_bytes()).unwrap();
        // read 0: len 4, seq "ACGT", quality [1,2,3,4]
        f.write_all(&4u32.to_le_bytes()).unwrap();
        f.write_all(b"ACGT").unwrap();
        f.write_all(&[1, 2, 3, 4]).unwrap();
        // read 1: len 2, seq "TT", quality [9,9]
        f.write_all(&2u32.to_le_bytes()).unwrap();
        f.write_all(b"TT").unwrap();
        f.write_all(&[9, 9]).unwrap();
    }

    #[test]
    fn reads_and_quality_round_trip_through_the_mmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.db");
        write_fixture(&path);

        let db = FileReadDb::open(&path).unwrap();
        assert_eq!(db.num_reads(), 2);
        assert_eq!(db.num_quality_streams(), 1);
        assert_eq!(db.read_len(ReadId(0)), 4);
        assert_eq!(db.read_len(ReadId(1)), 2);

        let mut seq = Vec::new();
        db.load_read(ReadId(0), &mut seq).unwrap();
        assert_eq!(seq, b"ACGT");

        let mut quality = Vec::new();
        db.load_quality(ReadId(1), &mut quality).unwrap();
        assert_eq!(quality, vec![vec![9, 9]]);
    }
}
