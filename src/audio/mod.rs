//! Audio input and block analysis — WAV source → block classifier → waveform trace.
//!
//! # Pipeline
//!
//! ```text
//! WavSource::read_block → BlockClassifier::classify → Classification
//!                                                   → WaveformTrace::record (optional)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wavsplit::audio::{BlockClassifier, WavSource};
//!
//! let mut source = WavSource::open("input.wav".as_ref()).unwrap();
//! let classifier = BlockClassifier::new(30, source.sample_rate(), source.scale_shift());
//!
//! loop {
//!     let block = source.read_block(1024);
//!     if block.is_empty() {
//!         break; // end of stream
//!     }
//!     let class = classifier.classify(&block);
//!     println!("metric {} noisy {}", class.metric, class.is_noisy);
//! }
//! ```

pub mod classifier;
pub mod source;
pub mod waveform;

pub use classifier::{BlockClassifier, Classification};
pub use source::{SourceError, WavSource};
pub use waveform::{WaveformFormat, WaveformTrace};
