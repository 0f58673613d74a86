//! In-memory fixtures and a synthetic-world generator for tests,
//! building randomized inputs off a seeded RNG rather than fixed
//! literals.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::overlap::{Overlap, OverlapSource, TraceSlice};
use crate::read::{Orientation, ReadDb, ReadId};
use crate::span::Span;

/// In-memory read database backing test fixtures.
#[derive(Debug, Clone, Default)]
pub struct VecReadDb {
    pub seqs: Vec<Vec<u8>>,
    pub quality: Vec<Vec<Vec<u8>>>,
}

impl ReadDb for VecReadDb {
    fn num_reads(&self) -> usize {
        self.seqs.len()
    }

    fn read_len(&self, r: ReadId) -> u32 {
        self.seqs[r.0 as usize].len() as u32
    }

    fn num_quality_streams(&self) -> usize {
        self.quality.first().map_or(0, Vec::len)
    }

    fn load_read(&self, r: ReadId, out: &mut Vec<u8>) -> std::io::Result<()> {
        out.clear();
        out.extend_from_slice(&self.seqs[r.0 as usize]);
        Ok(())
    }

    fn load_quality(&self, r: ReadId, out: &mut Vec<Vec<u8>>) -> std::io::Result<()> {
        out.clear();
        out.extend(self.quality[r.0 as usize].iter().cloned());
        Ok(())
    }
}

/// In-memory overlap store backing test fixtures.
#[derive(Debug, Clone, Default)]
pub struct VecOverlapSource {
    pub by_a: Vec<Vec<Overlap>>,
}

impl OverlapSource for VecOverlapSource {
    fn overlaps_for(&self, a: ReadId) -> &[Overlap] {
        self.by_a.get(a.0 as usize).map(Vec::as_slice).unwrap_or(&[])
    }
}

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// A small synthetic assembly world: `n` reads of length `read_len`,
/// each overlapping its neighbor with a deliberate `gap`-base hole
/// that the gap collector should propose to patch.
pub struct SyntheticWorld {
    pub db: VecReadDb,
    pub overlaps: VecOverlapSource,
    pub quality: Vec<Vec<u8>>,
}

pub fn generate_world(seed: u64, n: usize, read_len: u32, w: u32, gap: u32) -> SyntheticWorld {
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut seqs = Vec::with_capacity(n);
    let mut per_read_quality = Vec::with_capacity(n);
    let segs = read_len.div_ceil(w) as usize;
    for _ in 0..n {
        let seq: Vec<u8> = (0..read_len).map(|_| BASES[rng.gen_range(0..4)]).collect();
        seqs.push(seq.clone());
        per_read_quality.push(vec![seq.clone(), vec![0u8; read_len as usize]]);
    }

    let quality: Vec<Vec<u8>> = (0..n).map(|_| vec![30u8; segs]).collect();

    let mut by_a: Vec<Vec<Overlap>> = vec![Vec::new(); n];
    for i in 0..n.saturating_sub(1) {
        let a = ReadId(i as u32);
        let b = ReadId((i + 1) as u32);
        let half = read_len / 2;
        let overlap_len = half - gap;
        by_a[i].push(Overlap {
            a,
            b,
            orientation: Orientation::Normal,
            a_span: Span::new(half + gap, read_len),
            b_span: Span::new(0, overlap_len),
            trace: vec![TraceSlice { diff: 0, blen: overlap_len }],
        });
    }

    SyntheticWorld {
        db: VecReadDb { seqs, quality: per_read_quality },
        overlaps: VecOverlapSource { by_a },
        quality,
    }
}
