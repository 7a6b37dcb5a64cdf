//! WAV input stream backed by `hound`.
//!
//! [`WavSource`] owns one open WAV file and hands out fixed-size blocks of
//! interleaved integer samples.  A block shorter than requested only occurs
//! at the end of the stream; an empty block signals end of stream.
//!
//! Samples are surfaced at the container's native bit depth.
//! [`WavSource::scale_shift`] reports how far they must be shifted left to
//! reach full 32-bit scale, which is the convention the classifier's
//! threshold constants assume.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ---------------------------------------------------------------------------
// SourceError
// ---------------------------------------------------------------------------

/// Errors that can occur while opening a WAV input.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be opened or decoded as WAV.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// The file holds float samples; only integer PCM input is supported.
    #[error("{} uses float samples; only integer PCM input is supported", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

// ---------------------------------------------------------------------------
// WavSource
// ---------------------------------------------------------------------------

/// Blocking reader over one integer-PCM WAV file.
///
/// # Example
///
/// ```rust,no_run
/// use wavsplit::audio::WavSource;
///
/// let mut source = WavSource::open("input.wav".as_ref()).unwrap();
/// println!(
///     "{} Hz, {} ch, {:.2} s",
///     source.sample_rate(),
///     source.channels(),
///     source.duration_secs()
/// );
///
/// let block = source.read_block(1024); // up to 1024 frames
/// ```
pub struct WavSource {
    reader: hound::WavReader<BufReader<File>>,
    spec: hound::WavSpec,
    path: PathBuf,
}

impl std::fmt::Debug for WavSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavSource")
            .field("spec", &self.spec)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl WavSource {
    /// Open `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`] when the file is missing or not a valid
    /// WAV container, and [`SourceError::UnsupportedFormat`] for float PCM.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let reader = hound::WavReader::open(path).map_err(|e| SourceError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        let spec = reader.spec();
        if spec.sample_format != hound::SampleFormat::Int {
            return Err(SourceError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            reader,
            spec,
            path: path.to_path_buf(),
        })
    }

    /// The input's format descriptor (channels, rate, bit depth).
    ///
    /// Chunk files are created with exactly this spec so the output inherits
    /// the input's encoding.
    pub fn spec(&self) -> hound::WavSpec {
        self.spec
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    /// Total number of frames in the file.
    pub fn total_frames(&self) -> u32 {
        self.reader.duration()
    }

    /// Total duration of the file in seconds.
    pub fn duration_secs(&self) -> f64 {
        f64::from(self.reader.duration()) / f64::from(self.spec.sample_rate)
    }

    /// Left shift that brings a native sample to full 32-bit scale.
    ///
    /// `16` for 16-bit input, `8` for 24-bit, `0` for 32-bit.
    pub fn scale_shift(&self) -> u32 {
        32 - u32::from(self.spec.bits_per_sample)
    }

    /// Path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next block of up to `frames` frames of interleaved samples.
    ///
    /// Returns fewer samples than requested only at the end of the stream,
    /// and an empty `Vec` once the stream is exhausted.  A decode error
    /// mid-stream is treated as an ordinary short read, matching the
    /// behaviour of a partial final block.
    pub fn read_block(&mut self, frames: usize) -> Vec<i32> {
        let want = frames * usize::from(self.spec.channels);
        let mut block = Vec::with_capacity(want);

        for sample in self.reader.samples::<i32>().take(want) {
            match sample {
                Ok(s) => block.push(s),
                Err(e) => {
                    log::warn!(
                        "source: read error in {} treated as end of stream: {e}",
                        self.path.display()
                    );
                    break;
                }
            }
        }

        block
    }

    /// Measure the duration in seconds of the WAV file at `path`.
    ///
    /// A missing or unreadable file yields `0.0`, which callers treat as a
    /// zero-length stream rather than an error.
    pub fn probe_duration(path: &Path) -> f64 {
        match hound::WavReader::open(path) {
            Ok(reader) => f64::from(reader.duration()) / f64::from(reader.spec().sample_rate),
            Err(e) => {
                log::warn!("source: cannot measure {}: {e}", path.display());
                0.0
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for &s in samples {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    // ---- open ---

    #[test]
    fn open_missing_file_fails() {
        let dir = tempdir().expect("temp dir");
        let err = WavSource::open(&dir.path().join("missing.wav")).unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }), "{err}");
    }

    #[test]
    fn open_float_file_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("float.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        writer.write_sample(0.5_f32).expect("write sample");
        writer.finalize().expect("finalize wav");

        let err = WavSource::open(&path).unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFormat { .. }), "{err}");
    }

    #[test]
    fn reports_spec_and_duration() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("one_second.wav");
        write_wav(&path, 1, 8_000, &vec![100_i16; 8_000]);

        let source = WavSource::open(&path).expect("open");
        assert_eq!(source.sample_rate(), 8_000);
        assert_eq!(source.channels(), 1);
        assert_eq!(source.total_frames(), 8_000);
        assert!((source.duration_secs() - 1.0).abs() < 1e-9);
        assert_eq!(source.scale_shift(), 16);
    }

    // ---- read_block ---

    #[test]
    fn reads_full_blocks_then_empty() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("two_blocks.wav");
        write_wav(&path, 1, 8_000, &vec![1_i16; 2_048]);

        let mut source = WavSource::open(&path).expect("open");
        assert_eq!(source.read_block(1_024).len(), 1_024);
        assert_eq!(source.read_block(1_024).len(), 1_024);
        assert!(source.read_block(1_024).is_empty());
    }

    #[test]
    fn final_partial_block_is_short() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.wav");
        write_wav(&path, 1, 8_000, &vec![1_i16; 1_500]);

        let mut source = WavSource::open(&path).expect("open");
        assert_eq!(source.read_block(1_024).len(), 1_024);
        assert_eq!(source.read_block(1_024).len(), 476);
        assert!(source.read_block(1_024).is_empty());
    }

    #[test]
    fn stereo_block_holds_frames_times_channels_samples() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 8_000, &vec![1_i16; 2_000]); // 1000 frames

        let mut source = WavSource::open(&path).expect("open");
        assert_eq!(source.read_block(512).len(), 1_024);
        assert_eq!(source.total_frames(), 1_000);
    }

    // ---- probe_duration ---

    #[test]
    fn probe_duration_measures_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("half_second.wav");
        write_wav(&path, 1, 8_000, &vec![1_i16; 4_000]);

        let d = WavSource::probe_duration(&path);
        assert!((d - 0.5).abs() < 1e-9, "duration = {d}");
    }

    #[test]
    fn probe_duration_missing_file_is_zero() {
        let dir = tempdir().expect("temp dir");
        assert_eq!(WavSource::probe_duration(&dir.path().join("gone.wav")), 0.0);
    }
}
