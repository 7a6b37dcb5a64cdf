//! `wavmerge` entry point — sequential WAV concatenation.
//!
//! Usage mirrors the classic tail-output convention:
//!
//! ```text
//! wavmerge a.wav b.wav ... out.wav
//! ```
//!
//! All inputs must share sample rate, channel count and bit depth; the
//! output inherits that format.  Each failure condition maps to its own
//! exit code so scripts can tell them apart.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use wavsplit::merge::{merge_wav_files, MergeError};

#[derive(Parser, Debug)]
#[command(
    name = "wavmerge",
    version,
    about = "Concatenate WAV files into one output file"
)]
struct Cli {
    /// Input files followed by the output file (a.wav b.wav ... out.wav).
    #[arg(required = true, num_args = 2..)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Arguments — the last path is the output, everything before it an input.
    let cli = Cli::parse();
    let (output, inputs) = match cli.files.split_last() {
        Some((output, inputs)) if !inputs.is_empty() => (output, inputs),
        _ => {
            log::error!("usage: wavmerge a.wav b.wav ... out.wav");
            return ExitCode::from(2);
        }
    };

    // 3. Merge
    match merge_wav_files(inputs, output) {
        Ok(report) => {
            log::info!(
                "wrote {} ({} frames, {:.2} s)",
                output.display(),
                report.frames,
                report.duration_secs
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Distinct non-zero status per failure condition.
fn exit_code(err: &MergeError) -> u8 {
    match err {
        MergeError::OpenInput { .. } => 1,
        MergeError::NoInputs | MergeError::SpecMismatch { .. } => 2,
        MergeError::CreateOutput { .. } => 3,
        MergeError::ReadInput { .. } => 4,
        MergeError::WriteOutput { .. } => 5,
    }
}
