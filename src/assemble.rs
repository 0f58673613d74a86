//! Patch assembler: walks surviving gap candidates and builds the
//! patched sequence, its quality streams, and the patch map used by
//! the track remapper.

use crate::candidate::Gap;
use crate::error::Result;
use crate::read::{revcomp_into, reverse_quality_into, ReadDb, ReadId};

/// One retained (unpatched) A-span: `(src_b, src_e, dst_b)`. The donor
/// spans between retained spans carry no entry — user-track
/// coordinates never originate inside donor sequence.
pub type PatchMap = Vec<(u32, u32, u32)>;

/// Assemble the patched read for one A-read from its surviving
/// candidates, already sorted by `(ab, ae, diff)`.
pub fn assemble(
    db: &dyn ReadDb,
    a_seq: &[u8],
    a_quality: &[Vec<u8>],
    candidates: &[Gap],
    trim_b: u32,
    trim_e: u32,
) -> Result<(Vec<u8>, Vec<Vec<u8>>, PatchMap)> {
    let k = db.num_quality_streams();
    let mut out_seq = Vec::with_capacity(a_seq.len());
    let mut out_quality: Vec<Vec<u8>> = (0..k).map(|_| Vec::with_capacity(a_seq.len())).collect();
    let mut patch_map = PatchMap::new();

    let mut ab = trim_b;
    let mut donor_seq = Vec::new();
    let mut donor_quality: Vec<Vec<u8>> = Vec::new();

    for c in candidates {
        if trim_b > c.ab {
            ab = c.ae;
            continue;
        }
        if trim_e < c.ae {
            break;
        }

        let ae = c.ab;
        if trim_b > ab && trim_b < ae {
            ab = trim_b;
        }

        if ab < ae {
            let dst_b = out_seq.len() as u32;
            out_seq.extend_from_slice(&a_seq[ab as usize..ae as usize]);
            for (k, stream) in out_quality.iter_mut().enumerate() {
                stream.extend_from_slice(&a_quality[k][ab as usize..ae as usize]);
            }
            patch_map.push((ab, ae, dst_b));
        }

        db.load_read(c.b, &mut donor_seq)?;
        db.load_quality(c.b, &mut donor_quality)?;

        let (lo, hi) = (c.bb as usize, c.be as usize);
        if c.comp {
            revcomp_into(&donor_seq[lo..hi], &mut out_seq);
            for (k, stream) in out_quality.iter_mut().enumerate() {
                reverse_quality_into(&donor_quality[k][lo..hi], stream);
            }
        } else {
            out_seq.extend_from_slice(&donor_seq[lo..hi]);
            for (k, stream) in out_quality.iter_mut().enumerate() {
                stream.extend_from_slice(&donor_quality[k][lo..hi]);
            }
        }

        ab = c.ae;
    }

    let ae = trim_e;
    if ab < ae {
        let dst_b = out_seq.len() as u32;
        out_seq.extend_from_slice(&a_seq[ab as usize..ae as usize]);
        for (k, stream) in out_quality.iter_mut().enumerate() {
            stream.extend_from_slice(&a_quality[k][ab as usize..ae as usize]);
        }
        patch_map.push((ab, ae, dst_b));
    }

    Ok((out_seq, out_quality, patch_map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

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
        fn load_read(&self, _r: ReadId, out: &mut Vec<u8>) -> io::Result<()> {
            out.clear();
            out.extend_from_slice(&self.seq);
            Ok(())
        }
        fn load_quality(&self, _r: ReadId, out: &mut Vec<Vec<u8>>) -> io::Result<()> {
            out.clear();
            out.push(self.quality.clone());
            Ok(())
        }
    }

    #[test]
    fn single_candidate_splices_donor_between_kept_spans() {
        let db = FixedDb { len: 20, seq: vec![b'A'; 20], quality: vec![30; 20] };
        let a_seq = vec![b'C'; 1000];
        let a_quality = vec![vec![30u8; 1000]];
        let candidates = vec![Gap {
            ab: 400,
            ae: 600,
            bb: 2,
            be: 10,
            b: ReadId(1),
            comp: false,
            diff: 20.0,
            support: 5,
            span: 0,
        }];

        let (seq, quality, map) = assemble(&db, &a_seq, &a_quality, &candidates, 0, 1000).unwrap();

        assert_eq!(&seq[0..400], &a_seq[0..400]);
        assert_eq!(&seq[400..408], &db.seq[2..10]);
        assert_eq!(&seq[408..], &a_seq[600..1000]);
        assert_eq!(quality[0].len(), seq.len());
        assert_eq!(map, vec![(0, 400, 0), (600, 1000, 408)]);
    }

    #[test]
    fn complement_candidate_reverse_complements_donor_slice() {
        let db = FixedDb { len: 20, seq: b"ACGTACGTAC".to_vec(), quality: vec![30; 10] };
        let a_seq = vec![b'N'; 100];
        let a_quality = vec![vec![30u8; 100]];
        let candidates = vec![Gap {
            ab: 40,
            ae: 60,
            bb: 0,
            be: 4,
            b: ReadId(1),
            comp: true,
            diff: 20.0,
            support: 5,
            span: 0,
        }];

        let (seq, _, _) = assemble(&db, &a_seq, &a_quality, &candidates, 0, 100).unwrap();
        assert_eq!(&seq[40..44], b"ACGT");
    }
}
