//! Read identity and the read-database collaborator interface.

use std::fmt;
use std::io;

/// Identifier for a read within a database. Newtype instead of a bare
/// `u32` so pipeline signatures read clearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadId(pub u32);

impl fmt::Display for ReadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ReadId {
    fn from(v: u32) -> Self {
        ReadId(v)
    }
}

/// Base orientation of a donor segment relative to its read's stored,
/// forward-strand sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    Complement,
}

impl Orientation {
    #[inline]
    pub fn is_complement(self) -> bool {
        matches!(self, Orientation::Complement)
    }
}

/// Read-only accessor for the on-disk read database. The core pipeline
/// never assumes more than this: random-access length lookups plus
/// blocking loads of sequence and per-stream quality bytes.
pub trait ReadDb {
    fn num_reads(&self) -> usize;
    fn read_len(&self, r: ReadId) -> u32;
    fn num_quality_streams(&self) -> usize;

    /// Load the forward-strand, uppercase sequence of `r` into `out`,
    /// replacing its contents.
    fn load_read(&self, r: ReadId, out: &mut Vec<u8>) -> io::Result<()>;

    /// Load all `K` quality streams of `r` into `out`, one
    /// `read_len(r)`-byte buffer per stream. `out` is resized to
    /// `num_quality_streams()` entries as needed.
    fn load_quality(&self, r: ReadId, out: &mut Vec<Vec<u8>>) -> io::Result<()>;
}

/// Reverse-complement a DNA sequence slice into `out` (appended).
pub fn revcomp_into(seq: &[u8], out: &mut Vec<u8>) {
    out.extend(seq.iter().rev().map(|&b| complement_base(b)));
}

#[inline]
fn complement_base(b: u8) -> u8 {
    match b {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        _ => b'N',
    }
}

/// Reverse a quality-stream slice into `out` (appended). Quality
/// streams are strand-agnostic: no base-complementation, only
/// byte-order reversal.
pub fn reverse_quality_into(q: &[u8], out: &mut Vec<u8>) {
    out.extend(q.iter().rev().copied());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revcomp_reverses_and_complements() {
        let mut out = Vec::new();
        revcomp_into(b"ACGTN", &mut out);
        assert_eq!(out, b"NACGT");
    }

    #[test]
    fn reverse_quality_does_not_complement() {
        let mut out = Vec::new();
        reverse_quality_into(&[1, 2, 3, 4], &mut out);
        assert_eq!(out, vec![4, 3, 2, 1]);
    }
}
