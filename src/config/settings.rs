//! Settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Command-line flags
//! override whatever a settings file provides.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::audio::WaveformFormat;

// ---------------------------------------------------------------------------
// SplitConfig
// ---------------------------------------------------------------------------

/// Settings for the segmentation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Noise threshold; blocks with an average scaled amplitude strictly
    /// above this are noisy.
    pub threshold: i64,
    /// Minimum chunk duration in seconds; shorter chunks are discarded.
    pub min_duration_secs: f64,
    /// Maximum chunk duration in seconds; longer chunks are re-split.
    pub max_duration_secs: f64,
    /// Frames read per block.
    pub block_frames: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            threshold: 30,
            min_duration_secs: 1.0,
            max_duration_secs: 10.0,
            block_frames: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// WaveformConfig
// ---------------------------------------------------------------------------

/// Settings for the optional waveform trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformConfig {
    /// Trace output path; `None` disables the trace.
    pub path: Option<PathBuf>,
    /// Line format of the trace file.
    pub format: WaveformFormat,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            path: None,
            format: WaveformFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as a TOML settings file.
///
/// # Persistence
///
/// ```rust,no_run
/// use wavsplit::config::AppConfig;
///
/// // Load (returns Default when the file is missing)
/// let config = AppConfig::load_from("wavsplit.toml".as_ref()).unwrap();
///
/// // Modify and save
/// // config.save_to("wavsplit.toml".as_ref()).unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Segmentation settings.
    pub split: SplitConfig,
    /// Waveform trace settings.
    pub waveform: WaveformConfig,
}

impl AppConfig {
    /// Load configuration from `path`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist so
    /// callers never need to special-case a missing file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
