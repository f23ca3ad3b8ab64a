//! Playback controller
//!
//! Facade over the engine for review surfaces. Every surface renders time
//! from the same [`PlaybackProgress`] snapshot, so the result card and the
//! transport controls can never show different clocks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::error::ClipError;
use crate::format;

use super::clip::AudioClip;
use super::engine::ClipEngine;
use super::types::ClipEvent;

/// Snapshot of playback state for display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackProgress {
    /// Whether a clip is currently playing
    pub playing: bool,
    /// Position within the clip
    pub elapsed: Duration,
    /// Total clip length; `None` while (or forever if) unknown
    pub duration: Option<Duration>,
}

impl PlaybackProgress {
    /// Transport clock, e.g. `0:05 / 2:05` or `0:05 / -:--`
    pub fn clock_line(&self) -> String {
        format!(
            "{} / {}",
            format::clock(self.elapsed),
            format::clock_opt(self.duration)
        )
    }
}

/// Progress shared between the engine thread and review surfaces
pub type SharedProgress = Arc<Mutex<PlaybackProgress>>;

/// Create a fresh shared progress handle
pub fn new_shared_progress() -> SharedProgress {
    Arc::new(Mutex::new(PlaybackProgress::default()))
}

/// Playback facade owned by a review frontend
pub struct PlaybackController {
    engine: ClipEngine,
}

impl PlaybackController {
    /// Start the playback engine
    pub fn new() -> Result<Self, ClipError> {
        Ok(Self {
            engine: ClipEngine::new()?,
        })
    }

    /// Load a clip, replacing whatever was loaded before
    pub fn load(&self, clip: AudioClip) -> Result<(), ClipError> {
        self.engine.load(clip)
    }

    /// Toggle play/pause; a finished clip restarts from the beginning
    pub fn toggle_play(&self) -> Result<(), ClipError> {
        self.engine.toggle_play()
    }

    /// Stop playback and release the loaded clip
    pub fn unload(&self) -> Result<(), ClipError> {
        self.engine.stop()
    }

    /// Set playback volume
    pub fn set_volume(&self, volume: f32) -> Result<(), ClipError> {
        self.engine.set_volume(volume)
    }

    /// Current progress snapshot
    pub fn snapshot(&self) -> PlaybackProgress {
        self.engine.snapshot()
    }

    /// Whether a clip is currently playing
    pub fn is_playing(&self) -> bool {
        self.snapshot().playing
    }

    /// The shared transport clock line
    pub fn clock_line(&self) -> String {
        self.snapshot().clock_line()
    }

    /// Non-blocking event poll
    pub fn try_recv_event(&self) -> Option<ClipEvent> {
        self.engine.try_recv_event()
    }

    /// The engine's event channel
    pub fn event_receiver(&self) -> &Receiver<ClipEvent> {
        self.engine.event_receiver()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_default_is_empty() {
        let progress = PlaybackProgress::default();
        assert!(!progress.playing);
        assert_eq!(progress.elapsed, Duration::ZERO);
        assert_eq!(progress.duration, None);
    }

    #[test]
    fn clock_line_with_known_duration() {
        let progress = PlaybackProgress {
            playing: true,
            elapsed: Duration::from_secs(5),
            duration: Some(Duration::from_secs(125)),
        };
        assert_eq!(progress.clock_line(), "0:05 / 2:05");
    }

    #[test]
    fn clock_line_with_unknown_duration() {
        let progress = PlaybackProgress {
            playing: true,
            elapsed: Duration::from_secs(5),
            duration: None,
        };
        assert_eq!(progress.clock_line(), "0:05 / -:--");
    }

    #[test]
    fn clock_line_truncates_fractions() {
        let progress = PlaybackProgress {
            playing: false,
            elapsed: Duration::from_secs_f64(5.9),
            duration: Some(Duration::from_secs_f64(125.7)),
        };
        assert_eq!(progress.clock_line(), "0:05 / 2:05");
    }

    #[test]
    fn shared_progress_starts_default() {
        let shared = new_shared_progress();
        assert_eq!(*shared.lock().unwrap(), PlaybackProgress::default());
    }

    #[test]
    fn controller_starts_and_stops() {
        // Needs audio hardware; skip where there is none
        let Ok(controller) = PlaybackController::new() else {
            return;
        };
        assert!(!controller.is_playing());
        controller.unload().unwrap();
    }
}
