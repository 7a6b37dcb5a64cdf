//! Chunk output lifecycle state machine.
//!
//! [`ChunkWriter`] owns at most one open output stream at a time and moves
//! between two states:
//!
//! ```text
//! NoChunk ──noisy block──▶ Recording ──silent block──▶ NoChunk
//!                              │                          │
//!                           append                  close + validate
//! ```
//!
//! Chunk files are named `<input>.chunk<N>` where `N` comes from a counter
//! that strictly increases for the writer's lifetime, so chunk identities
//! are never reused even when chunks are later discarded.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::SplitError;

// ---------------------------------------------------------------------------
// ClosedChunk
// ---------------------------------------------------------------------------

/// A finished chunk handed to the validator after a noise-to-silence
/// transition (or to session teardown at end of stream).
#[derive(Debug, Clone)]
pub struct ClosedChunk {
    /// Path of the finalised chunk file.
    pub path: PathBuf,
    /// Counter value assigned at creation time.
    pub index: u32,
    /// Frames appended while the chunk was open.
    pub frames: u64,
}

// ---------------------------------------------------------------------------
// ChunkWriter
// ---------------------------------------------------------------------------

/// One open chunk: the `hound` writer plus its identity.
struct OpenChunk {
    writer: hound::WavWriter<BufWriter<File>>,
    path: PathBuf,
    index: u32,
    frames: u64,
}

/// Creates, appends to and finalises numbered chunk files.
///
/// Holds the `NoChunk` / `Recording` state as the presence of an open
/// writer.  Dropping a `ChunkWriter` finalises any still-open chunk so the
/// file on disk is a valid WAV on every exit path.
pub struct ChunkWriter {
    input_path: PathBuf,
    spec: hound::WavSpec,
    open: Option<OpenChunk>,
    counter: u32,
}

impl ChunkWriter {
    /// Create a writer producing chunks of `input_path` encoded with `spec`.
    pub fn new(input_path: &Path, spec: hound::WavSpec) -> Self {
        Self {
            input_path: input_path.to_path_buf(),
            spec,
            open: None,
            counter: 0,
        }
    }

    /// `true` while a chunk is open and receiving appends.
    pub fn is_recording(&self) -> bool {
        self.open.is_some()
    }

    /// Counter value the next created chunk will receive.
    pub fn next_index(&self) -> u32 {
        self.counter
    }

    /// Create the next chunk file and enter the `Recording` state.
    ///
    /// # Errors
    ///
    /// [`SplitError::CreateChunk`] when the file cannot be created; this is
    /// fatal for the whole run.
    pub fn open_next(&mut self) -> Result<(), SplitError> {
        debug_assert!(self.open.is_none(), "a chunk is already open");

        let path = chunk_path(&self.input_path, self.counter);
        let writer =
            hound::WavWriter::create(&path, self.spec).map_err(|e| SplitError::CreateChunk {
                path: path.clone(),
                source: e,
            })?;
        log::debug!("chunk: created {}", path.display());

        self.open = Some(OpenChunk {
            writer,
            path,
            index: self.counter,
            frames: 0,
        });
        self.counter += 1;
        Ok(())
    }

    /// Append one block of interleaved samples to the current chunk,
    /// creating a new chunk first when none is open.
    pub fn append(&mut self, block: &[i32]) -> Result<(), SplitError> {
        if self.open.is_none() {
            self.open_next()?;
        }

        if let Some(chunk) = self.open.as_mut() {
            let path = &chunk.path;
            for &s in block {
                chunk.writer.write_sample(s).map_err(|e| SplitError::WriteChunk {
                    path: path.clone(),
                    source: e,
                })?;
            }
            chunk.frames += (block.len() / usize::from(self.spec.channels)) as u64;
        }
        Ok(())
    }

    /// Finalise the current chunk and return to the `NoChunk` state.
    ///
    /// Returns the closed chunk's identity, or `None` when no chunk was
    /// open (remaining silent is not a transition).
    pub fn close(&mut self) -> Result<Option<ClosedChunk>, SplitError> {
        match self.open.take() {
            Some(chunk) => {
                chunk.writer.finalize().map_err(|e| SplitError::WriteChunk {
                    path: chunk.path.clone(),
                    source: e,
                })?;
                log::debug!(
                    "chunk: closed {} ({} frames)",
                    chunk.path.display(),
                    chunk.frames
                );
                Ok(Some(ClosedChunk {
                    path: chunk.path,
                    index: chunk.index,
                    frames: chunk.frames,
                }))
            }
            None => Ok(None),
        }
    }
}

impl Drop for ChunkWriter {
    fn drop(&mut self) {
        if let Some(chunk) = self.open.take() {
            if let Err(e) = chunk.writer.finalize() {
                log::error!(
                    "chunk: failed to finalise {} on drop: {e}",
                    chunk.path.display()
                );
            }
        }
    }
}

/// `<input>.chunk<index>` alongside the input file.
fn chunk_path(input: &Path, index: u32) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(format!(".chunk{index}"));
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
