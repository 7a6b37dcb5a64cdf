//! Segmentation session — the main loop and the recursive re-split.
//!
//! [`Session`] owns everything one run needs: the input source, the
//! classifier, the chunk writer, the validator and the optional waveform
//! trace.  [`Session::run`] consumes blocks until end of stream, dispatching
//! each classification to the chunk state machine and executing validator
//! verdicts as chunks close.
//!
//! An oversized chunk is re-split by a fresh, independent session over the
//! chunk file with the block size halved and the threshold raised by
//! [`RESPLIT_THRESHOLD_STEP`].  Recursion is synchronous and depth-first;
//! the superseded file is deleted only after the whole sub-run completes.
//!
//! A chunk still open when the input ends is closed by teardown and
//! retained without validation.  Only silence-triggered closures go through
//! the duration policy; the trailing chunk keeps whatever length it has.

use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::{BlockClassifier, WavSource, WaveformFormat, WaveformTrace};

use super::chunk::ChunkWriter;
use super::validator::{ChunkValidator, Verdict};
use super::SplitError;

/// Threshold increment applied at each re-split level.
pub const RESPLIT_THRESHOLD_STEP: i64 = 10;

/// Maximum re-split recursion depth.  At the cap an oversized chunk is
/// retained as-is instead of recursing further, so pathological inputs
/// cannot recurse without bound.
pub const MAX_RESPLIT_DEPTH: u32 = 8;

// ---------------------------------------------------------------------------
// SplitParams
// ---------------------------------------------------------------------------

/// Immutable configuration for one segmentation run.
///
/// Re-splitting derives a new value via [`SplitParams::for_resplit`] rather
/// than mutating shared state, so every recursion level sees exactly the
/// parameters it was created with.
#[derive(Debug, Clone)]
pub struct SplitParams {
    /// Noise threshold; blocks with a metric strictly above this are noisy.
    pub threshold: i64,
    /// Chunks shorter than this many seconds are discarded.
    pub min_duration_secs: f64,
    /// Chunks longer than this many seconds are re-split.
    pub max_duration_secs: f64,
    /// Frames read per block.  Must be greater than zero.
    pub block_frames: usize,
    /// Optional waveform trace destination.
    pub waveform: Option<WaveformSink>,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            threshold: 30,
            min_duration_secs: 1.0,
            max_duration_secs: 10.0,
            block_frames: 1024,
            waveform: None,
        }
    }
}

impl SplitParams {
    /// Parameters for re-splitting an oversized chunk: block size halved
    /// (clamped to at least one frame), threshold raised by
    /// [`RESPLIT_THRESHOLD_STEP`], duration bounds unchanged, and no
    /// waveform trace.
    pub fn for_resplit(&self) -> Self {
        Self {
            threshold: self.threshold + RESPLIT_THRESHOLD_STEP,
            block_frames: (self.block_frames / 2).max(1),
            waveform: None,
            ..self.clone()
        }
    }
}

/// Waveform trace destination for a run.
#[derive(Debug, Clone)]
pub struct WaveformSink {
    /// Output path of the trace file.
    pub path: PathBuf,
    /// Line format.
    pub format: WaveformFormat,
}

// ---------------------------------------------------------------------------
// ChunkReport
// ---------------------------------------------------------------------------

/// One retained output chunk.
#[derive(Debug, Clone)]
pub struct ChunkReport {
    /// Path of the chunk file on disk.
    pub path: PathBuf,
    /// Measured duration in seconds.
    pub duration_secs: f64,
    /// `false` for the trailing chunk that was still open at end of stream:
    /// it is retained unconditionally, bypassing the duration policy.
    pub validated: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One segmentation run over one input file.
pub struct Session {
    source: WavSource,
    classifier: BlockClassifier,
    chunks: ChunkWriter,
    validator: ChunkValidator,
    waveform: Option<WaveformTrace>,
    params: SplitParams,
    depth: u32,
    /// Running total of frames in noisy blocks; silence-span diagnostics only.
    noisy_frames: u64,
    /// Running total of frames read.
    read_frames: u64,
}

impl Session {
    /// Open `input` and prepare a run with `params`.
    pub fn new(input: &Path, params: &SplitParams) -> Result<Self, SplitError> {
        Self::at_depth(input, params, 0)
    }

    fn at_depth(input: &Path, params: &SplitParams, depth: u32) -> Result<Self, SplitError> {
        assert!(params.block_frames > 0, "block_frames must be > 0");

        let source = WavSource::open(input)?;
        let classifier =
            BlockClassifier::new(params.threshold, source.sample_rate(), source.scale_shift());
        let chunks = ChunkWriter::new(input, source.spec());
        let validator = ChunkValidator::new(params.min_duration_secs, params.max_duration_secs);

        let waveform = match &params.waveform {
            Some(sink) => Some(WaveformTrace::create(&sink.path, sink.format).map_err(|e| {
                SplitError::CreateWaveform {
                    path: sink.path.clone(),
                    source: e,
                }
            })?),
            None => None,
        };

        Ok(Self {
            source,
            classifier,
            chunks,
            validator,
            waveform,
            params: params.clone(),
            depth,
            noisy_frames: 0,
            read_frames: 0,
        })
    }

    /// Run the session to end of stream and return the retained chunks.
    pub fn run(mut self) -> Result<Vec<ChunkReport>, SplitError> {
        log::info!(
            "split: {} ({} Hz, {} ch, {:.2} s) threshold {} block {} frames",
            self.source.path().display(),
            self.source.sample_rate(),
            self.source.channels(),
            self.source.duration_secs(),
            self.params.threshold,
            self.params.block_frames,
        );

        let channels = u64::from(self.source.channels());
        let mut reports = Vec::new();

        // The first chunk opens before the first block is classified.
        self.chunks.open_next()?;

        loop {
            let block = self.source.read_block(self.params.block_frames);
            if block.is_empty() {
                break;
            }
            let frames = block.len() as u64 / channels;
            self.read_frames += frames;

            let class = self.classifier.classify(&block);

            if let Some(trace) = self.waveform.as_mut() {
                let classifier = &self.classifier;
                trace
                    .record(&class, block.iter().map(|&s| classifier.scaled(s)))
                    .map_err(SplitError::WriteWaveform)?;
            }

            if class.is_noisy {
                self.chunks.append(&block)?;
                self.noisy_frames += frames;
            } else {
                log::debug!(
                    "split: silence from frame {} to {}",
                    self.noisy_frames,
                    self.read_frames
                );
                if let Some(closed) = self.chunks.close()? {
                    self.settle(closed.path, &mut reports)?;
                }
            }
        }

        // End of stream: a chunk still open is retained without validation.
        if let Some(closed) = self.chunks.close()? {
            let duration_secs = WavSource::probe_duration(&closed.path);
            log::info!(
                "split: retained trailing {} ({:.2} s, unvalidated)",
                closed.path.display(),
                duration_secs
            );
            reports.push(ChunkReport {
                path: closed.path,
                duration_secs,
                validated: false,
            });
        }

        if let Some(trace) = self.waveform.take() {
            trace.finish().map_err(SplitError::WriteWaveform)?;
        }

        Ok(reports)
    }

    /// Execute the validator's verdict for a silence-closed chunk.
    fn settle(&self, path: PathBuf, reports: &mut Vec<ChunkReport>) -> Result<(), SplitError> {
        match self.validator.validate(&path) {
            Verdict::Discard { duration_secs } => {
                log::debug!(
                    "split: discarding {} ({:.2} s, below minimum)",
                    path.display(),
                    duration_secs
                );
                remove_chunk(&path);
            }
            Verdict::Keep { duration_secs } => {
                log::info!("split: retained {} ({:.2} s)", path.display(), duration_secs);
                reports.push(ChunkReport {
                    path,
                    duration_secs,
                    validated: true,
                });
            }
            Verdict::Resplit { duration_secs } => {
                if self.depth >= MAX_RESPLIT_DEPTH {
                    log::warn!(
                        "split: {} is {:.2} s but re-split depth {} reached; retaining as-is",
                        path.display(),
                        duration_secs,
                        self.depth
                    );
                    reports.push(ChunkReport {
                        path,
                        duration_secs,
                        validated: true,
                    });
                } else {
                    log::info!(
                        "split: re-splitting {} ({:.2} s, above maximum)",
                        path.display(),
                        duration_secs
                    );
                    let sub_params = self.params.for_resplit();
                    let sub =
                        Session::at_depth(&path, &sub_params, self.depth + 1)?.run()?;
                    reports.extend(sub);
                    remove_chunk(&path);
                }
            }
        }
        Ok(())
    }
}

/// Delete a discarded or superseded chunk file.  Deletion failure is not
/// fatal; the run continues and the stray file is left behind.
fn remove_chunk(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("split: could not delete {}: {e}", path.display());
    }
}

// ---------------------------------------------------------------------------
// split_by_silence
// ---------------------------------------------------------------------------

/// Split `input` into silence-bounded chunk files.
///
/// Runs one [`Session`] to completion, including any recursive re-splits,
/// and returns a report for every retained chunk file in the order the
/// chunks were produced.
///
/// # Errors
///
/// See [`SplitError`] — every variant is fatal for the run.
pub fn split_by_silence(input: &Path, params: &SplitParams) -> Result<Vec<ChunkReport>, SplitError> {
    Session::new(input, params)?.run()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const RATE: u32 = 8_000;
    /// Scaled metric (5000 << 16) / 8000 = 40960: noisy at any tested threshold.
    const LOUD: i16 = 5_000;
    /// Scaled metric 32: noisy at threshold 30, silent at threshold 40.
    const QUIET: i16 = 4;

    fn tone(secs: f64, amplitude: i16) -> Vec<i16> {
        vec![amplitude; (secs * RATE as f64) as usize]
    }

    fn write_wav(path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for &s in samples {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    fn params(threshold: i64, min: f64, max: f64, block: usize) -> SplitParams {
        SplitParams {
            threshold,
            min_duration_secs: min,
            max_duration_secs: max,
            block_frames: block,
            waveform: None,
        }
    }

    // ---- parameter derivation ---

    #[test]
    fn resplit_params_halve_block_and_raise_threshold() {
        let p = SplitParams {
            waveform: Some(WaveformSink {
                path: PathBuf::from("trace.txt"),
                format: WaveformFormat::Rms,
            }),
            ..params(30, 1.0, 10.0, 1024)
        };
        let r = p.for_resplit();

        assert_eq!(r.threshold, 40);
        assert_eq!(r.block_frames, 512);
        assert_eq!(r.min_duration_secs, 1.0);
        assert_eq!(r.max_duration_secs, 10.0);
        assert!(r.waveform.is_none(), "sub-splits suppress the trace");
    }

    #[test]
    fn resplit_block_size_clamps_to_one_frame() {
        let r = params(30, 1.0, 10.0, 1).for_resplit();
        assert_eq!(r.block_frames, 1);
    }

    // ---- scenarios ---

    /// A fully silent input creates the initial chunk, closes it on the
    /// first silent block, measures 0.0 s and deletes it.
    #[test]
    fn all_silent_input_leaves_no_chunks() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        write_wav(&input, &tone(1.0, 0));

        let reports = split_by_silence(&input, &params(30, 1.0, 10.0, 1024)).expect("split");

        assert!(reports.is_empty());
        assert!(!dir.path().join("in.wav.chunk0").exists());
    }

    /// 2 s of noise then silence: one chunk within bounds is retained.
    #[test]
    fn noisy_run_within_bounds_is_retained() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        let mut samples = tone(2.0, LOUD);
        samples.extend(tone(1.0, 0));
        write_wav(&input, &samples);

        let reports = split_by_silence(&input, &params(30, 1.0, 10.0, 1024)).expect("split");

        assert_eq!(reports.len(), 1);
        let chunk = &reports[0];
        assert!(chunk.validated);
        assert_eq!(chunk.path, dir.path().join("in.wav.chunk0"));
        assert!(chunk.path.exists());
        assert!(
            chunk.duration_secs > 1.9 && chunk.duration_secs < 2.3,
            "duration = {}",
            chunk.duration_secs
        );
    }

    /// A noisy run shorter than the minimum is deleted.
    #[test]
    fn short_chunk_is_discarded() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        let mut samples = tone(0.5, LOUD);
        samples.extend(tone(1.0, 0));
        write_wav(&input, &samples);

        let reports = split_by_silence(&input, &params(30, 1.0, 10.0, 1024)).expect("split");

        assert!(reports.is_empty());
        assert!(!dir.path().join("in.wav.chunk0").exists());
    }

    /// Counter values stay strictly increasing even when chunks are
    /// discarded: two short runs burn indices 0 and 1, the kept run gets 2.
    #[test]
    fn chunk_counter_skips_discarded_chunks() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        let mut samples = Vec::new();
        samples.extend(tone(0.3, LOUD));
        samples.extend(tone(0.5, 0));
        samples.extend(tone(0.3, LOUD));
        samples.extend(tone(0.5, 0));
        samples.extend(tone(2.0, LOUD));
        samples.extend(tone(0.5, 0));
        write_wav(&input, &samples);

        let reports = split_by_silence(&input, &params(30, 1.0, 10.0, 1024)).expect("split");

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, dir.path().join("in.wav.chunk2"));
        assert!(!dir.path().join("in.wav.chunk0").exists());
        assert!(!dir.path().join("in.wav.chunk1").exists());
    }

    /// A chunk still open at end of stream bypasses the duration policy:
    /// 0.5 s of noise with no trailing silence survives a 1.0 s minimum.
    #[test]
    fn trailing_chunk_bypasses_validation() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        write_wav(&input, &tone(0.5, LOUD));

        let reports = split_by_silence(&input, &params(30, 1.0, 10.0, 1024)).expect("split");

        assert_eq!(reports.len(), 1);
        let chunk = &reports[0];
        assert!(!chunk.validated);
        assert!(chunk.path.exists());
        assert!(
            chunk.duration_secs > 0.4 && chunk.duration_secs < 0.7,
            "duration = {}",
            chunk.duration_secs
        );
    }

    /// An oversized chunk is re-split with block size halved and threshold
    /// raised by 10.  The quiet sections (metric 32) are noisy at threshold
    /// 30 but silent at 40, so the sub-session finds boundaries the outer
    /// session could not, and the superseded file is deleted.
    #[test]
    fn oversized_chunk_is_resplit_with_stricter_parameters() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        let mut samples = Vec::new();
        samples.extend(tone(6.0, LOUD));
        samples.extend(tone(2.0, QUIET));
        samples.extend(tone(5.0, LOUD));
        samples.extend(tone(2.0, QUIET));
        samples.extend(tone(1.0, 0));
        write_wav(&input, &samples);

        let reports = split_by_silence(&input, &params(30, 1.0, 10.0, 1024)).expect("split");

        // The 15 s chunk0 was replaced by two sub-chunks nested under its name.
        assert!(!dir.path().join("in.wav.chunk0").exists());
        assert_eq!(reports.len(), 2);

        let first = &reports[0];
        assert_eq!(first.path, dir.path().join("in.wav.chunk0.chunk0"));
        assert!(first.validated);
        assert!(
            first.duration_secs > 5.5 && first.duration_secs < 6.5,
            "duration = {}",
            first.duration_secs
        );

        let second = &reports[1];
        assert_eq!(second.path, dir.path().join("in.wav.chunk0.chunk1"));
        assert!(second.validated);
        assert!(
            second.duration_secs > 4.5 && second.duration_secs < 5.5,
            "duration = {}",
            second.duration_secs
        );

        assert!(first.path.exists());
        assert!(second.path.exists());
    }

    /// At the recursion cap an oversized chunk is retained rather than
    /// re-split further.
    #[test]
    fn resplit_depth_cap_retains_oversized_chunk() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        let mut samples = tone(2.0, LOUD);
        samples.extend(tone(0.5, 0));
        write_wav(&input, &samples);

        let session = Session::at_depth(&input, &params(30, 0.1, 0.5, 1024), MAX_RESPLIT_DEPTH)
            .expect("session");
        let reports = session.run().expect("run");

        assert_eq!(reports.len(), 1);
        assert!(reports[0].path.exists());
        assert!(
            reports[0].duration_secs > 0.5,
            "still oversized: {}",
            reports[0].duration_secs
        );
        assert!(!dir.path().join("in.wav.chunk0.chunk0").exists());
    }

    // ---- waveform wiring ---

    /// The trace receives exactly one line per processed block.
    #[test]
    fn waveform_trace_records_one_line_per_block() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        let trace_path = dir.path().join("trace.txt");
        write_wav(&input, &tone(1.0, LOUD)); // 8000 frames = 7 full + 1 partial block

        let p = SplitParams {
            waveform: Some(WaveformSink {
                path: trace_path.clone(),
                format: WaveformFormat::Rms,
            }),
            ..params(30, 0.1, 10.0, 1024)
        };
        split_by_silence(&input, &p).expect("split");

        let content = fs::read_to_string(&trace_path).expect("read trace");
        assert_eq!(content.lines().count(), 8);
        for line in content.lines() {
            assert!(line.parse::<f64>().is_ok(), "not a number: {line}");
        }
    }

    #[test]
    fn missing_waveform_directory_is_a_create_failure() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        write_wav(&input, &tone(0.5, LOUD));

        let p = SplitParams {
            waveform: Some(WaveformSink {
                path: dir.path().join("no_such_dir").join("trace.txt"),
                format: WaveformFormat::Rms,
            }),
            ..params(30, 1.0, 10.0, 1024)
        };
        let err = split_by_silence(&input, &p).unwrap_err();
        assert!(matches!(err, SplitError::CreateWaveform { .. }), "{err}");
    }

    // ---- errors ---

    #[test]
    fn missing_input_is_an_open_failure() {
        let dir = tempdir().expect("temp dir");
        let err =
            split_by_silence(&dir.path().join("gone.wav"), &SplitParams::default()).unwrap_err();
        assert!(matches!(err, SplitError::Input(_)), "{err}");
    }

    #[test]
    #[should_panic(expected = "block_frames must be > 0")]
    fn zero_block_size_panics() {
        let dir = tempdir().expect("temp dir");
        let input = dir.path().join("in.wav");
        write_wav(&input, &tone(0.1, 0));
        let _ = Session::new(&input, &params(30, 1.0, 10.0, 0));
    }
}
