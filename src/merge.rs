//! Sequential WAV concatenation.
//!
//! [`merge_wav_files`] copies N input files into one output in two passes:
//! a scan pass that checks every input agrees on format and computes the
//! output's length, then a copy pass that streams samples through.  Inputs
//! must share sample rate, channel count and bit depth; the output inherits
//! that spec.

use std::path::{Path, PathBuf};

use thiserror::Error;

// ---------------------------------------------------------------------------
// MergeError
// ---------------------------------------------------------------------------

/// Fatal conditions while concatenating WAV files.
#[derive(Debug, Error)]
pub enum MergeError {
    /// No input files were given.
    #[error("no input files given")]
    NoInputs,

    /// An input file could not be opened or decoded.
    #[error("failed to open input {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// An input's format does not match the preceding inputs.
    #[error("input {} has spec {got:?}; expected {expected:?}", .path.display())]
    SpecMismatch {
        path: PathBuf,
        expected: hound::WavSpec,
        got: hound::WavSpec,
    },

    /// The output file could not be created.
    #[error("failed to create output {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Reading samples from an input failed mid-copy.
    #[error("failed to read input {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Writing samples to the output failed.
    #[error("failed to write output {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

// ---------------------------------------------------------------------------
// merge_wav_files
// ---------------------------------------------------------------------------

/// Summary of a completed merge.
#[derive(Debug, Clone, Copy)]
pub struct MergeReport {
    /// Total frames written to the output.
    pub frames: u64,
    /// Duration of the output in seconds.
    pub duration_secs: f64,
}

/// Concatenate `inputs` in order into `output`.
///
/// The scan pass logs each input's duration and the projected output
/// length before any file is written, matching the behaviour users expect
/// from a dry-run preamble.
pub fn merge_wav_files(inputs: &[PathBuf], output: &Path) -> Result<MergeReport, MergeError> {
    let (first, rest) = inputs.split_first().ok_or(MergeError::NoInputs)?;

    // Scan pass: durations and format agreement.
    let (spec, mut total_frames) = scan_input(first)?;
    for path in rest {
        let (got, frames) = scan_input(path)?;
        if got != spec {
            return Err(MergeError::SpecMismatch {
                path: path.clone(),
                expected: spec,
                got,
            });
        }
        total_frames += frames;
    }

    let duration_secs = total_frames as f64 / f64::from(spec.sample_rate);
    log::info!(
        "merge: {} will be {:.2} seconds",
        output.display(),
        duration_secs
    );

    // Copy pass.
    let mut writer =
        hound::WavWriter::create(output, spec).map_err(|e| MergeError::CreateOutput {
            path: output.to_path_buf(),
            source: e,
        })?;

    for path in inputs {
        let mut reader = hound::WavReader::open(path).map_err(|e| MergeError::OpenInput {
            path: path.clone(),
            source: e,
        })?;
        for sample in reader.samples::<i32>() {
            let s = sample.map_err(|e| MergeError::ReadInput {
                path: path.clone(),
                source: e,
            })?;
            writer.write_sample(s).map_err(|e| MergeError::WriteOutput {
                path: output.to_path_buf(),
                source: e,
            })?;
        }
        log::info!("merge: wrote from {}", path.display());
    }

    writer.finalize().map_err(|e| MergeError::WriteOutput {
        path: output.to_path_buf(),
        source: e,
    })?;

    Ok(MergeReport {
        frames: total_frames,
        duration_secs,
    })
}

/// Open one input, log its duration, and return its spec and frame count.
fn scan_input(path: &Path) -> Result<(hound::WavSpec, u64), MergeError> {
    let reader = hound::WavReader::open(path).map_err(|e| MergeError::OpenInput {
        path: path.to_path_buf(),
        source: e,
    })?;
    let spec = reader.spec();
    let frames = u64::from(reader.duration());
    log::info!(
        "merge: {} is {:.2} seconds",
        path.display(),
        frames as f64 / f64::from(spec.sample_rate)
    );
    Ok((spec, frames))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
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

    #[test]
    fn concatenates_inputs_in_order() {
        let dir = tempdir().expect("temp dir");
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        let out = dir.path().join("out.wav");
        write_wav(&a, 8_000, &[1, 2, 3]);
        write_wav(&b, 8_000, &[4, 5]);

        let report = merge_wav_files(&[a, b], &out).expect("merge");

        assert_eq!(report.frames, 5);
        let mut reader = hound::WavReader::open(&out).expect("open output");
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.expect("sample")).collect();
        assert_eq!(samples, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn report_duration_is_total_frames_over_rate() {
        let dir = tempdir().expect("temp dir");
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        let out = dir.path().join("out.wav");
        write_wav(&a, 8_000, &vec![0; 8_000]); // 1.0 s
        write_wav(&b, 8_000, &vec![0; 4_000]); // 0.5 s

        let report = merge_wav_files(&[a, b], &out).expect("merge");
        assert!((report.duration_secs - 1.5).abs() < 1e-9);
    }

    #[test]
    fn mismatched_sample_rates_are_rejected_before_writing() {
        let dir = tempdir().expect("temp dir");
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        let out = dir.path().join("out.wav");
        write_wav(&a, 8_000, &[1, 2, 3]);
        write_wav(&b, 16_000, &[4, 5]);

        let err = merge_wav_files(&[a, b], &out).unwrap_err();
        assert!(matches!(err, MergeError::SpecMismatch { .. }), "{err}");
        assert!(!out.exists(), "scan pass must fail before the output is created");
    }

    #[test]
    fn empty_input_list_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let err = merge_wav_files(&[], &dir.path().join("out.wav")).unwrap_err();
        assert!(matches!(err, MergeError::NoInputs), "{err}");
    }

    #[test]
    fn missing_input_is_an_open_failure() {
        let dir = tempdir().expect("temp dir");
        let err = merge_wav_files(
            &[dir.path().join("gone.wav")],
            &dir.path().join("out.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::OpenInput { .. }), "{err}");
    }

    #[test]
    fn single_input_copies_through() {
        let dir = tempdir().expect("temp dir");
        let a = dir.path().join("a.wav");
        let out = dir.path().join("out.wav");
        write_wav(&a, 8_000, &[7, 8, 9]);

        let report = merge_wav_files(&[a], &out).expect("merge");
        assert_eq!(report.frames, 3);
        assert!(out.exists());
    }
}
