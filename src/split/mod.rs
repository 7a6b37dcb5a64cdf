//! Silence-driven segmentation — chunk lifecycle, validation, recursive re-split.
//!
//! The heart of the crate.  [`Session`] drives one segmentation run over a
//! WAV input; [`split_by_silence`] is the public entry point and the
//! function the session calls back into when a chunk turns out oversized.
//!
//! ```text
//! read block ──▶ classify ──noisy──▶ ChunkWriter::append
//!                    │
//!                  silent ──▶ ChunkWriter::close ──▶ ChunkValidator
//!                                                       │
//!                                     discard / keep / re-split (recursive)
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::audio::SourceError;

pub mod chunk;
pub mod session;
pub mod validator;

pub use chunk::{ChunkWriter, ClosedChunk};
pub use session::{
    split_by_silence, ChunkReport, Session, SplitParams, WaveformSink, MAX_RESPLIT_DEPTH,
    RESPLIT_THRESHOLD_STEP,
};
pub use validator::{ChunkValidator, Verdict};

// ---------------------------------------------------------------------------
// SplitError
// ---------------------------------------------------------------------------

/// Fatal conditions a segmentation run can hit.
///
/// Every variant is terminal: the run stops and already-open streams are
/// released as the session unwinds.  Short reads are not errors (a partial
/// final block is ordinary), and an unreadable chunk during validation
/// yields a duration of 0 rather than an error.
#[derive(Debug, Error)]
pub enum SplitError {
    /// The input stream could not be opened or decoded.
    #[error(transparent)]
    Input(#[from] SourceError),

    /// A chunk output file could not be created.
    #[error("failed to create chunk {}: {source}", .path.display())]
    CreateChunk {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Appending to or finalising a chunk file failed.
    #[error("failed to write chunk {}: {source}", .path.display())]
    WriteChunk {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// The waveform trace file could not be created.
    #[error("failed to create waveform trace {}: {source}", .path.display())]
    CreateWaveform {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing a waveform trace line failed.
    #[error("failed to write waveform trace: {0}")]
    WriteWaveform(#[source] io::Error),
}
