//! wavsplit — silence-driven WAV segmentation.
//!
//! Reads a PCM WAV file block by block, classifies each block as noisy or
//! silent from its average scaled amplitude, and writes contiguous noisy
//! regions out as numbered chunk files.  Chunks shorter than a minimum
//! duration are discarded; chunks longer than a maximum duration are
//! recursively re-split with a smaller block size and a stricter threshold.
//!
//! # Pipeline
//!
//! ```text
//! WavSource ──block──▶ BlockClassifier ──Classification──▶ ChunkWriter
//!                           │                                  │ noise→silence
//!                           ▼                                  ▼
//!                     WaveformTrace                      ChunkValidator
//!                     (optional)                               │
//!                                          keep / discard / re-split
//!                                                              │
//!                                                              ▼
//!                                               split_by_silence (recursive)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use wavsplit::split::{split_by_silence, SplitParams};
//!
//! let params = SplitParams::default(); // threshold 30, 1.0–10.0 s, 1024 frames
//! let chunks = split_by_silence("recording.wav".as_ref(), &params).unwrap();
//!
//! for chunk in &chunks {
//!     println!("{} ({:.2} s)", chunk.path.display(), chunk.duration_secs);
//! }
//! ```

pub mod audio;
pub mod config;
pub mod merge;
pub mod split;
