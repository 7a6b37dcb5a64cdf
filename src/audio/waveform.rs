//! Plain-text waveform trace for offline visualisation.
//!
//! [`WaveformTrace`] appends one line per processed block to a text file.
//! Two line formats exist:
//!
//! | Format | Line content |
//! |--------|--------------|
//! | [`WaveformFormat::Rms`] | block RMS formatted to two decimals |
//! | [`WaveformFormat::Samples`] | per-sample scaled values, space separated |
//!
//! The `Samples` format is the legacy one consumed by external plotting
//! scripts that read a whitespace-separated stream of integers.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Classification;

// ---------------------------------------------------------------------------
// WaveformFormat
// ---------------------------------------------------------------------------

/// Line format of the waveform trace file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WaveformFormat {
    /// One RMS value per block, two decimals.
    Rms,
    /// Space-separated scaled sample values, one block per line.
    Samples,
}

impl Default for WaveformFormat {
    fn default() -> Self {
        Self::Rms
    }
}

// ---------------------------------------------------------------------------
// WaveformTrace
// ---------------------------------------------------------------------------

/// Buffered text sink recording one line per processed block.
pub struct WaveformTrace {
    writer: BufWriter<File>,
    format: WaveformFormat,
    lines: u64,
}

impl WaveformTrace {
    /// Create (truncate) the trace file at `path`.
    pub fn create(path: &Path, format: WaveformFormat) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            format,
            lines: 0,
        })
    }

    /// Line format this trace writes.
    pub fn format(&self) -> WaveformFormat {
        self.format
    }

    /// Number of lines recorded so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Append one line for a processed block.
    ///
    /// `scaled` supplies the block's per-sample scaled values; it is only
    /// consumed in the [`WaveformFormat::Samples`] format.
    pub fn record<I>(&mut self, classification: &Classification, scaled: I) -> io::Result<()>
    where
        I: IntoIterator<Item = i64>,
    {
        match self.format {
            WaveformFormat::Rms => writeln!(self.writer, "{:.2}", classification.rms)?,
            WaveformFormat::Samples => {
                let mut sep = "";
                for w in scaled {
                    write!(self.writer, "{sep}{w}")?;
                    sep = " ";
                }
                writeln!(self.writer)?;
            }
        }
        self.lines += 1;
        Ok(())
    }

    /// Flush and close the trace.
    pub fn finish(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
