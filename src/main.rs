//! `wavsplit` entry point — silence-driven WAV segmentation.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse command-line arguments.
//! 3. Load [`AppConfig`] from the `--config` path when given (missing file
//!    falls back to defaults); flags override file values.
//! 4. Run [`split_by_silence`] to completion and report retained chunks.
//!
//! # Exit codes
//!
//! | Code | Condition |
//! |------|-----------|
//! | 1    | input cannot be opened or decoded |
//! | 2    | invalid parameters (e.g. zero block size) |
//! | 3    | a chunk file cannot be created |
//! | 4    | the waveform trace cannot be created |
//! | 5    | a write to a chunk or the trace failed mid-stream |

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use wavsplit::audio::WaveformFormat;
use wavsplit::config::AppConfig;
use wavsplit::split::{split_by_silence, SplitError, SplitParams, WaveformSink};

// ---------------------------------------------------------------------------
// Cli
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "wavsplit",
    version,
    about = "Split a WAV file into chunks at silent regions"
)]
struct Cli {
    /// Input WAV file.
    input: PathBuf,

    /// Noise threshold; blocks with an average scaled amplitude above this
    /// are kept.
    #[arg(short = 't', long)]
    threshold: Option<i64>,

    /// Discard chunks shorter than this many seconds.
    #[arg(long)]
    min_duration: Option<f64>,

    /// Re-split chunks longer than this many seconds.
    #[arg(long)]
    max_duration: Option<f64>,

    /// Frames read per block.
    #[arg(short = 'b', long)]
    block_size: Option<usize>,

    /// Write a plain-text waveform trace (one line per block).
    #[arg(short = 'w', long)]
    waveform: Option<PathBuf>,

    /// Waveform trace line format.
    #[arg(long, value_enum)]
    waveform_format: Option<WaveformFormat>,

    /// TOML settings file; flags given on the command line override it.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write a default settings file to the `--config` path and exit.
    #[arg(long)]
    write_config: bool,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Arguments
    let cli = Cli::parse();

    if cli.write_config {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from("wavsplit.toml"));
        return match AppConfig::default().save_to(&path) {
            Ok(()) => {
                log::info!("wrote default settings to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("failed to write settings to {}: {e}", path.display());
                ExitCode::FAILURE
            }
        };
    }

    // 3. Configuration — file first, flags override.
    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(path).unwrap_or_else(|e| {
            log::warn!("failed to load settings ({e}); using defaults");
            AppConfig::default()
        }),
        None => AppConfig::default(),
    };

    let waveform_path = cli.waveform.clone().or_else(|| config.waveform.path.clone());
    let params = SplitParams {
        threshold: cli.threshold.unwrap_or(config.split.threshold),
        min_duration_secs: cli.min_duration.unwrap_or(config.split.min_duration_secs),
        max_duration_secs: cli.max_duration.unwrap_or(config.split.max_duration_secs),
        block_frames: cli.block_size.unwrap_or(config.split.block_frames),
        waveform: waveform_path.map(|path| WaveformSink {
            path,
            format: cli.waveform_format.unwrap_or(config.waveform.format),
        }),
    };

    if params.block_frames == 0 {
        log::error!("block size must be greater than zero");
        return ExitCode::from(2);
    }

    // 4. Run
    match split_by_silence(&cli.input, &params) {
        Ok(chunks) => {
            for chunk in &chunks {
                log::info!("retained {} ({:.2} s)", chunk.path.display(), chunk.duration_secs);
            }
            log::info!("{} chunk(s) retained", chunks.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Distinct non-zero status per fatal condition.
fn exit_code(err: &SplitError) -> u8 {
    match err {
        SplitError::Input(_) => 1,
        SplitError::CreateChunk { .. } => 3,
        SplitError::CreateWaveform { .. } => 4,
        SplitError::WriteChunk { .. } | SplitError::WriteWaveform(_) => 5,
    }
}
