//! Clip playback engine
//!
//! Runs playback on a dedicated thread, accepting commands via crossbeam
//! channels and emitting events back. Progress is shared through
//! `Arc<Mutex<PlaybackProgress>>` so review surfaces can poll it.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use rodio::{DeviceSinkBuilder, Player};

use crate::config::playback::{
    COMMAND_CHANNEL_CAPACITY, EVENT_CHANNEL_CAPACITY, TICK_INTERVAL_MS,
};
use crate::error::ClipError;

use super::clip::AudioClip;
use super::controller::{new_shared_progress, SharedProgress};
use super::probe::ClipSource;
use super::types::{ClipCommand, ClipEvent, ClipInfo, PlaybackState};

/// Playback engine that manages a clip on a dedicated thread
pub struct ClipEngine {
    cmd_tx: Sender<ClipCommand>,
    event_rx: Receiver<ClipEvent>,
    progress: SharedProgress,
    thread: Option<JoinHandle<()>>,
}

impl ClipEngine {
    /// Create a new engine, spawning the playback thread.
    ///
    /// Blocks until the audio output is initialized (or fails).
    pub fn new() -> Result<Self, ClipError> {
        let (cmd_tx, cmd_rx) = bounded::<ClipCommand>(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = bounded::<ClipEvent>(EVENT_CHANNEL_CAPACITY);
        let (init_tx, init_rx) = bounded::<Result<(), String>>(1);

        let progress = new_shared_progress();
        let progress_thread = Arc::clone(&progress);

        let thread = thread::Builder::new()
            .name("clip-engine".to_string())
            .spawn(move || run(cmd_rx, event_tx, init_tx, progress_thread))
            .map_err(|e| ClipError::Audio(format!("Failed to spawn engine thread: {}", e)))?;

        match init_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                cmd_tx,
                event_rx,
                progress,
                thread: Some(thread),
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(ClipError::Audio(e))
            }
            Err(_) => {
                let _ = thread.join();
                Err(ClipError::Audio(
                    "Engine thread failed during initialization".to_string(),
                ))
            }
        }
    }

    /// Probe a clip and queue it, paused at the start. Does not autoplay.
    pub fn load(&self, clip: AudioClip) -> Result<(), ClipError> {
        self.send(ClipCommand::Load(clip))
    }

    /// Toggle between playing and paused. A finished clip restarts from zero.
    pub fn toggle_play(&self) -> Result<(), ClipError> {
        self.send(ClipCommand::TogglePlay)
    }

    /// Stop playback and unload the current clip
    pub fn stop(&self) -> Result<(), ClipError> {
        self.send(ClipCommand::Stop)
    }

    /// Set playback volume (0.0 to 1.0, values above 1.0 amplify)
    pub fn set_volume(&self, volume: f32) -> Result<(), ClipError> {
        self.send(ClipCommand::SetVolume(volume))
    }

    /// Send a raw command to the engine thread
    pub fn send(&self, cmd: ClipCommand) -> Result<(), ClipError> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| ClipError::Audio("Engine thread is not running".to_string()))
    }

    /// Non-blocking event poll
    pub fn try_recv_event(&self) -> Option<ClipEvent> {
        self.event_rx.try_recv().ok()
    }

    /// The event channel, for callers that want to select or block
    pub fn event_receiver(&self) -> &Receiver<ClipEvent> {
        &self.event_rx
    }

    /// Shared progress handle
    pub fn progress(&self) -> SharedProgress {
        Arc::clone(&self.progress)
    }

    /// Current progress snapshot
    pub fn snapshot(&self) -> super::controller::PlaybackProgress {
        self.progress
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Shut down the engine and wait for the thread to exit
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.cmd_tx.send(ClipCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ClipEngine {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

/// Decode error slot shared with a queued source
type ErrorSlot = Arc<Mutex<Option<String>>>;

/// Elapsed playback time given the accumulated total and the instant
/// playback last resumed
fn current_elapsed(accumulated: Duration, started: Option<Instant>) -> Duration {
    match started {
        Some(t) => accumulated + t.elapsed(),
        None => accumulated,
    }
}

/// Probe a clip and queue its samples on the (paused) sink
fn queue_clip(sink: &Player, clip: &AudioClip) -> Result<(ClipInfo, ErrorSlot), ClipError> {
    let source = ClipSource::from_clip(clip)?;
    let info = source.clip_info();
    let slot = source.error_slot();
    sink.append(source);
    Ok((info, slot))
}

/// Engine thread main loop
fn run(
    cmd_rx: Receiver<ClipCommand>,
    event_tx: Sender<ClipEvent>,
    init_tx: Sender<Result<(), String>>,
    progress: SharedProgress,
) {
    // The output stream must be created on this thread: cpal streams may be
    // !Send on some platforms. Declared before the sink so it outlives it.
    let mut stream = match DeviceSinkBuilder::open_default_sink() {
        Ok(s) => s,
        Err(e) => {
            let _ = init_tx.send(Err(format!("Failed to open audio output: {}", e)));
            return;
        }
    };
    stream.log_on_drop(false);
    let sink = Player::connect_new(stream.mixer());

    let _ = init_tx.send(Ok(()));

    let mut state = PlaybackState::Stopped;
    let mut loaded: Option<AudioClip> = None;
    let mut info: Option<ClipInfo> = None;
    let mut error_slot: Option<ErrorSlot> = None;
    let mut play_started: Option<Instant> = None;
    let mut accumulated = Duration::ZERO;

    let set_progress = |playing: bool, elapsed: Duration, duration: Option<Duration>| {
        if let Ok(mut p) = progress.lock() {
            p.playing = playing;
            p.elapsed = elapsed;
            p.duration = duration;
        }
    };

    loop {
        match cmd_rx.recv_timeout(Duration::from_millis(TICK_INTERVAL_MS)) {
            Ok(ClipCommand::Load(clip)) => {
                sink.stop();
                sink.pause();
                play_started = None;
                accumulated = Duration::ZERO;

                match queue_clip(&sink, &clip) {
                    Ok((clip_info, slot)) => {
                        set_progress(false, Duration::ZERO, clip_info.duration);
                        let _ = event_tx.send(ClipEvent::Loaded(clip_info.clone()));
                        loaded = Some(clip);
                        info = Some(clip_info);
                        error_slot = Some(slot);
                        state = PlaybackState::Paused;
                    }
                    Err(e) => {
                        set_progress(false, Duration::ZERO, None);
                        let _ = event_tx.send(ClipEvent::Error(e.to_string()));
                        loaded = None;
                        info = None;
                        error_slot = None;
                        state = PlaybackState::Stopped;
                    }
                }
            }
            Ok(ClipCommand::TogglePlay) => match state {
                PlaybackState::Playing => {
                    sink.pause();
                    accumulated = current_elapsed(accumulated, play_started.take());
                    state = PlaybackState::Paused;
                    set_progress(false, accumulated, info.as_ref().and_then(|i| i.duration));
                    let _ = event_tx.send(ClipEvent::Paused);
                }
                PlaybackState::Paused => {
                    sink.play();
                    play_started = Some(Instant::now());
                    state = PlaybackState::Playing;
                    set_progress(true, accumulated, info.as_ref().and_then(|i| i.duration));
                    let _ = event_tx.send(ClipEvent::Playing);
                }
                PlaybackState::Stopped => {
                    // A finished clip restarts from the beginning
                    let Some(clip) = loaded.clone() else { continue };
                    sink.stop();
                    sink.pause();
                    match queue_clip(&sink, &clip) {
                        Ok((clip_info, slot)) => {
                            sink.play();
                            accumulated = Duration::ZERO;
                            play_started = Some(Instant::now());
                            state = PlaybackState::Playing;
                            set_progress(true, Duration::ZERO, clip_info.duration);
                            info = Some(clip_info);
                            error_slot = Some(slot);
                            let _ = event_tx.send(ClipEvent::Playing);
                        }
                        Err(e) => {
                            set_progress(false, Duration::ZERO, None);
                            let _ = event_tx.send(ClipEvent::Error(e.to_string()));
                            loaded = None;
                            info = None;
                            error_slot = None;
                        }
                    }
                }
            },
            Ok(ClipCommand::Stop) => {
                sink.stop();
                let had_clip = loaded.is_some() || state != PlaybackState::Stopped;
                loaded = None;
                info = None;
                error_slot = None;
                play_started = None;
                accumulated = Duration::ZERO;
                state = PlaybackState::Stopped;
                set_progress(false, Duration::ZERO, None);
                if had_clip {
                    let _ = event_tx.send(ClipEvent::Stopped);
                }
            }
            Ok(ClipCommand::SetVolume(v)) => {
                sink.set_volume(v.clamp(0.0, 2.0));
            }
            Ok(ClipCommand::Shutdown) => {
                sink.stop();
                break;
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                if state != PlaybackState::Playing {
                    continue;
                }
                let duration = info.as_ref().and_then(|i| i.duration);

                if sink.empty() {
                    // Natural end. Pin the final position to the known length
                    // so the transport shows the full time, then report.
                    let final_elapsed =
                        duration.unwrap_or_else(|| current_elapsed(accumulated, play_started));
                    accumulated = final_elapsed;
                    play_started = None;
                    state = PlaybackState::Stopped;
                    set_progress(false, final_elapsed, duration);

                    let decode_failure = error_slot
                        .as_ref()
                        .and_then(|slot| slot.lock().ok().and_then(|mut s| s.take()));
                    match decode_failure {
                        Some(msg) => {
                            let _ = event_tx.send(ClipEvent::Error(msg));
                        }
                        None => {
                            let _ = event_tx.send(ClipEvent::Finished);
                        }
                    }
                } else {
                    let mut elapsed = current_elapsed(accumulated, play_started);
                    if let Some(total) = duration {
                        elapsed = elapsed.min(total);
                    }
                    set_progress(true, elapsed, duration);
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                sink.stop();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&channels.to_le_bytes());
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        let byte_rate = sample_rate * u32::from(channels) * 2;
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        let block_align = channels * 2;
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            wav.extend_from_slice(&s.to_le_bytes());
        }
        wav
    }

    fn one_second_clip() -> AudioClip {
        AudioClip::from_bytes("one-second.wav", make_wav(44100, 1, &[0i16; 44100]))
    }

    fn short_clip() -> AudioClip {
        // ~50ms, finishes almost immediately
        AudioClip::from_bytes("short.wav", make_wav(44100, 1, &[0i16; 2205]))
    }

    /// Engines need audio hardware; skip tests on machines without it
    fn try_engine() -> Option<ClipEngine> {
        ClipEngine::new().ok()
    }

    fn wait_for_event(engine: &ClipEngine, timeout_ms: u64) -> Option<ClipEvent> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        while Instant::now() < deadline {
            if let Some(event) = engine.try_recv_event() {
                return Some(event);
            }
            thread::sleep(Duration::from_millis(25));
        }
        None
    }

    fn wait_for_matching(
        engine: &ClipEngine,
        timeout_ms: u64,
        pred: impl Fn(&ClipEvent) -> bool,
    ) -> Option<ClipEvent> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        while Instant::now() < deadline {
            if let Some(event) = engine.try_recv_event() {
                if pred(&event) {
                    return Some(event);
                }
            }
            thread::sleep(Duration::from_millis(25));
        }
        None
    }

    // --- Lifecycle ---

    #[test]
    fn create_and_shutdown() {
        let Some(engine) = try_engine() else { return };
        engine.shutdown();
    }

    #[test]
    fn drop_shuts_down_cleanly() {
        let Some(engine) = try_engine() else { return };
        drop(engine);
    }

    // --- Loading ---

    #[test]
    fn load_reports_clip_info() {
        let Some(engine) = try_engine() else { return };
        engine.load(one_second_clip()).unwrap();

        let event = wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Loaded(_)));
        let Some(ClipEvent::Loaded(info)) = event else {
            panic!("expected Loaded event");
        };
        assert_eq!(info.channels, 1);
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.codec_name, "PCM 16-bit");
        let duration = info.duration.expect("wav declares its length");
        assert!((duration.as_secs_f64() - 1.0).abs() < 0.05);

        let snap = engine.snapshot();
        assert!(!snap.playing);
        assert_eq!(snap.elapsed, Duration::ZERO);
        assert!(snap.duration.is_some());
    }

    #[test]
    fn load_does_not_autoplay() {
        let Some(engine) = try_engine() else { return };
        engine.load(one_second_clip()).unwrap();
        wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Loaded(_)));

        thread::sleep(Duration::from_millis(250));
        assert!(!engine.snapshot().playing);
        assert_eq!(engine.snapshot().elapsed, Duration::ZERO);
    }

    #[test]
    fn load_invalid_clip_reports_error() {
        let Some(engine) = try_engine() else { return };
        let junk = AudioClip::from_bytes("junk.bin", vec![1, 2, 3, 4]);
        engine.load(junk).unwrap();

        let event = wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Error(_)));
        assert!(event.is_some());
        assert_eq!(engine.snapshot().duration, None);
    }

    #[test]
    fn engine_survives_bad_clip() {
        let Some(engine) = try_engine() else { return };
        engine
            .load(AudioClip::from_bytes("junk.bin", vec![0u8; 16]))
            .unwrap();
        wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Error(_)));

        engine.load(one_second_clip()).unwrap();
        let event = wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Loaded(_)));
        assert!(event.is_some());
    }

    // --- Playback ---

    #[test]
    fn toggle_plays_and_pauses() {
        let Some(engine) = try_engine() else { return };
        engine.load(one_second_clip()).unwrap();
        wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Loaded(_)));

        engine.toggle_play().unwrap();
        let playing = wait_for_matching(&engine, 2000, |e| matches!(e, ClipEvent::Playing));
        assert!(playing.is_some());
        assert!(engine.snapshot().playing);

        engine.toggle_play().unwrap();
        let paused = wait_for_matching(&engine, 2000, |e| matches!(e, ClipEvent::Paused));
        assert!(paused.is_some());
        assert!(!engine.snapshot().playing);
    }

    #[test]
    fn toggle_without_clip_is_ignored() {
        let Some(engine) = try_engine() else { return };
        engine.toggle_play().unwrap();
        assert!(wait_for_event(&engine, 300).is_none());
    }

    #[test]
    fn short_clip_finishes_on_its_own() {
        let Some(engine) = try_engine() else { return };
        engine.load(short_clip()).unwrap();
        wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Loaded(_)));

        engine.toggle_play().unwrap();
        let finished = wait_for_matching(&engine, 5000, |e| matches!(e, ClipEvent::Finished));
        assert!(finished.is_some());

        // The final position pins to the clip length and playback stops
        let snap = engine.snapshot();
        assert!(!snap.playing);
        assert_eq!(Some(snap.elapsed), snap.duration);
    }

    #[test]
    fn toggle_after_finish_restarts() {
        let Some(engine) = try_engine() else { return };
        engine.load(short_clip()).unwrap();
        wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Loaded(_)));

        engine.toggle_play().unwrap();
        wait_for_matching(&engine, 5000, |e| matches!(e, ClipEvent::Finished));

        engine.toggle_play().unwrap();
        let replaying = wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Playing));
        assert!(replaying.is_some());
    }

    #[test]
    fn stop_unloads_the_clip() {
        let Some(engine) = try_engine() else { return };
        engine.load(one_second_clip()).unwrap();
        wait_for_matching(&engine, 3000, |e| matches!(e, ClipEvent::Loaded(_)));

        engine.stop().unwrap();
        let stopped = wait_for_matching(&engine, 2000, |e| matches!(e, ClipEvent::Stopped));
        assert!(stopped.is_some());

        let snap = engine.snapshot();
        assert_eq!(snap.duration, None);
        assert_eq!(snap.elapsed, Duration::ZERO);

        // Toggle after unload has nothing to play
        engine.toggle_play().unwrap();
        assert!(wait_for_event(&engine, 300).is_none());
    }

    #[test]
    fn stop_without_clip_emits_nothing() {
        let Some(engine) = try_engine() else { return };
        engine.stop().unwrap();
        assert!(wait_for_event(&engine, 300).is_none());
    }

    #[test]
    fn set_volume_accepts_range() {
        let Some(engine) = try_engine() else { return };
        engine.set_volume(0.0).unwrap();
        engine.set_volume(0.5).unwrap();
        engine.set_volume(2.0).unwrap();
        engine.set_volume(100.0).unwrap();
        engine.shutdown();
    }
}
