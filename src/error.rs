//! Fatal error type for the repair pipeline.
//!
//! Silent-skip conditions never reach this type — they are represented
//! as `Option::None`/early-`continue` inside the pipeline modules.
//! Only conditions that must abort the whole run land here.

use crate::read::ReadId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("read {read}: track length {got} does not match segment count {want}")]
    TrackLengthMismatch {
        read: ReadId,
        got: usize,
        want: usize,
    },

    #[error("read {read}: mask interval [{b},{e}) lies outside read of length {len}")]
    MaskOutOfBounds {
        read: ReadId,
        b: u32,
        e: u32,
        len: u32,
    },

    #[error("read {read}: trim interval [{b},{e}) is inverted or outside the read")]
    InvalidTrim { read: ReadId, b: u32, e: u32 },

    #[error("read {read}: remapped interval [{b},{e}) is inverted or outside patched length {len}")]
    RemapOutOfBounds {
        read: ReadId,
        b: i64,
        e: i64,
        len: u32,
    },

    #[error("could not open output: {0}")]
    OutputOpen(String),
}

pub type Result<T> = std::result::Result<T, PatchError>;
