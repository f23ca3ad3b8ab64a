//! Shotscope audio engine
//!
//! Clip loading, format probing, and playback for gunshot-analysis review.
//! Playback runs on a dedicated engine thread driven by channel commands:
//!
//! ```no_run
//! use shotscope::audio::{AudioClip, ClipEngine};
//!
//! # fn main() -> Result<(), shotscope::error::ClipError> {
//! let engine = ClipEngine::new()?;
//! let clip = AudioClip::from_path(std::path::Path::new("recording.wav"))?;
//! engine.load(clip)?;
//! engine.toggle_play()?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod format;
