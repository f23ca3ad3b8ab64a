//! Core audio types shared across the engine

use std::fmt;
use std::time::Duration;

use super::clip::AudioClip;
use crate::format;

/// Playback state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing queued in the sink
    #[default]
    Stopped,
    /// Clip is playing
    Playing,
    /// Clip is loaded and paused
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        };
        write!(f, "{}", s)
    }
}

/// Technical details of a probed clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    /// Codec name (e.g. "MP3", "PCM 16-bit")
    pub codec_name: String,
    /// Number of channels
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Total length, if the container declares one.
    /// `None` means unknown, which is distinct from zero.
    pub duration: Option<Duration>,
}

impl fmt::Display for ClipInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = match self.channels {
            1 => "Mono".to_string(),
            2 => "Stereo".to_string(),
            n => format!("{} ch", n),
        };
        write!(
            f,
            "{} · {} Hz · {} · {}",
            self.codec_name,
            self.sample_rate,
            channels,
            format::clock_opt(self.duration)
        )
    }
}

/// Commands accepted by the engine thread
pub enum ClipCommand {
    /// Load a clip: probe it and queue it paused at the start
    Load(AudioClip),
    /// Toggle between playing and paused; restarts a finished clip
    TogglePlay,
    /// Stop playback and unload the current clip
    Stop,
    /// Set volume (0.0 to 1.0, values above 1.0 amplify)
    SetVolume(f32),
    /// Shut down the engine thread
    Shutdown,
}

impl fmt::Debug for ClipCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipCommand::Load(clip) => write!(f, "Load({})", clip.filename()),
            ClipCommand::TogglePlay => write!(f, "TogglePlay"),
            ClipCommand::Stop => write!(f, "Stop"),
            ClipCommand::SetVolume(v) => write!(f, "SetVolume({})", v),
            ClipCommand::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// Events emitted by the engine thread
#[derive(Debug, Clone)]
pub enum ClipEvent {
    /// A clip was probed and queued, ready to play
    Loaded(ClipInfo),
    /// Playback started or resumed
    Playing,
    /// Playback paused
    Paused,
    /// The clip played to its natural end
    Finished,
    /// Playback stopped and the clip was unloaded
    Stopped,
    /// Something went wrong
    Error(String),
}
