//! Configuration for wavsplit.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the splitter
//! and the waveform trace, and TOML persistence via `AppConfig::load_from` /
//! `AppConfig::save_to`.

pub mod settings;

pub use settings::{AppConfig, SplitConfig, WaveformConfig};
