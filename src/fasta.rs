//! FASTA/quality writer adapter. Wraps sequence lines at 60 columns
//! and formats track annotations inline using `itoa` for
//! allocation-free integer formatting, the same way BED coordinate
//! columns are formatted elsewhere in this crate.

use std::io::{self, Write};

use itoa::Buffer;

use crate::pipeline::{PatchedRead, ReadKind};

const WRAP_WIDTH: usize = 60;

fn kind_str(kind: ReadKind) -> &'static str {
    match kind {
        ReadKind::Fixed => "fixed",
        ReadKind::Trimmed => "trimmed",
    }
}

/// Write one FASTA record for `read`.
pub fn write_fasta<W: Write>(w: &mut W, read: &PatchedRead) -> io::Result<()> {
    let mut buf = Buffer::new();
    write!(w, ">{}_{} source={}", kind_str(read.kind), read.aread, read.aread)?;
    for (name, intervals) in &read.tracks {
        if intervals.is_empty() {
            continue;
        }
        write!(w, " {name}=")?;
        for (i, span) in intervals.iter().enumerate() {
            if i > 0 {
                write!(w, ",")?;
            }
            w.write_all(buf.format(span.start).as_bytes())?;
            write!(w, ",")?;
            w.write_all(buf.format(span.end).as_bytes())?;
        }
    }
    writeln!(w)?;

    for chunk in read.sequence.chunks(WRAP_WIDTH) {
        w.write_all(chunk)?;
        writeln!(w)?;
    }
    Ok(())
}

/// Write one quality record for `read` (the optional `-q` output).
pub fn write_quality<W: Write>(w: &mut W, read: &PatchedRead) -> io::Result<()> {
    let mut buf = Buffer::new();
    write!(w, "@{}/0_", kind_str(read.kind))?;
    w.write_all(buf.format(read.sequence.len() as u32).as_bytes())?;
    writeln!(w, " source={}", read.aread)?;
    for stream in &read.quality {
        w.write_all(stream)?;
        writeln!(w)?;
    }
    Ok(())
}
