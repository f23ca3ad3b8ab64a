//! Audio subsystem
//!
//! Clip handling, format probing, and playback on a dedicated engine thread.

pub mod clip;
pub mod controller;
pub mod engine;
pub mod probe;
pub mod types;

// Re-exports
pub use clip::{AudioClip, ClipReader};
pub use controller::{new_shared_progress, PlaybackController, PlaybackProgress, SharedProgress};
pub use engine::ClipEngine;
pub use probe::{codec_type_to_name, start_probe, ClipSource};
pub use types::{ClipCommand, ClipEvent, ClipInfo, PlaybackState};
