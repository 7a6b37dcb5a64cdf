//! Duration policy applied to each closed chunk.
//!
//! [`ChunkValidator`] re-measures a finished chunk file and decides whether
//! it is kept, discarded, or sent back through the splitter with stricter
//! parameters.  Both bounds are strict: a chunk exactly at the minimum or
//! maximum duration is kept unmodified.

use std::path::Path;

use crate::audio::WavSource;

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Outcome of validating one closed chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Shorter than the minimum: delete the file, produce no output.
    Discard { duration_secs: f64 },
    /// Within bounds: this is a final output chunk.
    Keep { duration_secs: f64 },
    /// Longer than the maximum: re-split recursively, then delete the
    /// superseded file.
    Resplit { duration_secs: f64 },
}

impl Verdict {
    /// Measured duration the verdict was based on.
    pub fn duration_secs(&self) -> f64 {
        match *self {
            Verdict::Discard { duration_secs }
            | Verdict::Keep { duration_secs }
            | Verdict::Resplit { duration_secs } => duration_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// ChunkValidator
// ---------------------------------------------------------------------------

/// Keep/discard/re-split policy over chunk durations.
///
/// ```rust
/// use wavsplit::split::{ChunkValidator, Verdict};
///
/// let validator = ChunkValidator::new(1.0, 10.0);
/// assert!(matches!(validator.assess(0.5), Verdict::Discard { .. }));
/// assert!(matches!(validator.assess(5.0), Verdict::Keep { .. }));
/// assert!(matches!(validator.assess(12.0), Verdict::Resplit { .. }));
/// ```
pub struct ChunkValidator {
    min_secs: f64,
    max_secs: f64,
}

impl ChunkValidator {
    /// Create a validator keeping chunks within `[min_secs, max_secs]`.
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Pure policy decision over a measured duration.
    ///
    /// Evaluated in order: too short, then too long, then keep.  Strict
    /// inequalities on both bounds.
    pub fn assess(&self, duration_secs: f64) -> Verdict {
        if duration_secs < self.min_secs {
            Verdict::Discard { duration_secs }
        } else if duration_secs > self.max_secs {
            Verdict::Resplit { duration_secs }
        } else {
            Verdict::Keep { duration_secs }
        }
    }

    /// Re-open the chunk file at `path` and assess its duration.
    ///
    /// A missing or unreadable file measures as 0.0 seconds and therefore
    /// falls into the discard branch.
    pub fn validate(&self, path: &Path) -> Verdict {
        self.assess(WavSource::probe_duration(path))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
