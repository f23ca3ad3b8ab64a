//! Format probing and decoding via Symphonia
//!
//! Probing runs on a helper thread so a malformed clip can never wedge the
//! engine; decoding happens lazily as the sink pulls samples.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use rodio::Source;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, CodecType, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::{Hint, ProbeResult};

use crate::config::timeouts::PROBE_TIMEOUT_SECS;
use crate::error::ClipError;

use super::clip::AudioClip;
use super::types::ClipInfo;

/// Map a Symphonia codec type to a display name
pub fn codec_type_to_name(codec_type: CodecType) -> &'static str {
    use symphonia::core::codecs::*;
    match codec_type {
        CODEC_TYPE_AAC => "AAC",
        CODEC_TYPE_ALAC => "ALAC",
        CODEC_TYPE_FLAC => "FLAC",
        CODEC_TYPE_MP3 => "MP3",
        CODEC_TYPE_OPUS => "Opus",
        CODEC_TYPE_VORBIS => "Vorbis",
        CODEC_TYPE_PCM_S16LE | CODEC_TYPE_PCM_S16BE => "PCM 16-bit",
        CODEC_TYPE_PCM_S24LE | CODEC_TYPE_PCM_S24BE => "PCM 24-bit",
        CODEC_TYPE_PCM_S32LE | CODEC_TYPE_PCM_S32BE => "PCM 32-bit",
        CODEC_TYPE_PCM_F32LE | CODEC_TYPE_PCM_F32BE => "PCM Float",
        CODEC_TYPE_PCM_U8 => "PCM 8-bit",
        _ => "Audio",
    }
}

/// Total clip length as declared by the container, if it declares one.
///
/// Raw MP3 without a Xing header reports no frame count; such clips keep an
/// unknown duration for their whole life.
fn duration_from_params(params: &CodecParameters) -> Option<Duration> {
    match (params.n_frames, params.time_base) {
        (Some(frames), Some(tb)) => {
            let time = tb.calc_time(frames);
            Some(Duration::from_secs_f64(time.seconds as f64 + time.frac))
        }
        (Some(frames), None) => params
            .sample_rate
            .map(|rate| Duration::from_secs_f64(frames as f64 / f64::from(rate))),
        _ => None,
    }
}

/// Start probing a media source on a background thread.
///
/// Returns a receiver that yields the probe result once. The caller decides
/// how long to wait; the probe thread is detached either way.
pub fn start_probe<R>(
    reader: R,
    format_hint: Option<String>,
) -> Result<Receiver<Result<ProbeResult, ClipError>>, ClipError>
where
    R: MediaSource + 'static,
{
    let (tx, rx) = bounded(1);

    thread::Builder::new()
        .name("symphonia-probe".to_string())
        .spawn(move || {
            let mss = MediaSourceStream::new(Box::new(reader), Default::default());
            let mut hint = Hint::new();
            if let Some(ext) = format_hint {
                hint.with_extension(&ext);
            }

            let result = symphonia::default::get_probe()
                .format(
                    &hint,
                    mss,
                    &FormatOptions::default(),
                    &MetadataOptions::default(),
                )
                .map_err(|e| ClipError::Decode(format!("Failed to probe clip: {}", e)));

            let _ = tx.send(result);
        })
        .map_err(|e| ClipError::Audio(format!("Failed to spawn probe thread: {}", e)))?;

    Ok(rx)
}

/// A decoded clip as a rodio sample source
///
/// Wraps a probed format reader and decoder, yielding interleaved `f32`
/// samples. Decode failures after the first frame are reported through the
/// shared error slot, since by then the source has been moved into the sink.
pub struct ClipSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn symphonia::core::codecs::Decoder>,
    track_id: u32,
    sample_buf: Option<SampleBuffer<f32>>,
    sample_idx: usize,
    channels: u16,
    sample_rate: u32,
    codec_name: String,
    duration: Option<Duration>,
    error_slot: Arc<Mutex<Option<String>>>,
}

impl ClipSource {
    /// Probe and decode a clip, using its filename extension as a hint
    pub fn from_clip(clip: &AudioClip) -> Result<Self, ClipError> {
        Self::new_with_hint(clip.reader(), clip.extension())
    }

    /// Probe a media source and prepare it for decoding
    pub fn new<R>(reader: R) -> Result<Self, ClipError>
    where
        R: MediaSource + 'static,
    {
        Self::new_with_hint(reader, None)
    }

    /// Probe with an optional format hint (filename extension)
    pub fn new_with_hint<R>(reader: R, format_hint: Option<String>) -> Result<Self, ClipError>
    where
        R: MediaSource + 'static,
    {
        let rx = start_probe(reader, format_hint)?;
        let probed = match rx.recv_timeout(Duration::from_secs(PROBE_TIMEOUT_SECS)) {
            Ok(result) => result?,
            Err(RecvTimeoutError::Timeout) => {
                return Err(ClipError::Timeout("Format probe timed out".to_string()));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(ClipError::Decode(
                    "Probe thread terminated unexpectedly".to_string(),
                ));
            }
        };
        Self::from_probed(probed)
    }

    /// Build a source from an already-probed format
    pub fn from_probed(probed: ProbeResult) -> Result<Self, ClipError> {
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| ClipError::Decode("No supported audio track found".to_string()))?;

        let track_id = track.id;
        let params = track.codec_params.clone();

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| ClipError::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut source = Self {
            format,
            decoder,
            track_id,
            sample_buf: None,
            sample_idx: 0,
            channels: params.channels.map(|c| c.count() as u16).unwrap_or(2),
            sample_rate: params.sample_rate.unwrap_or(44100),
            codec_name: codec_type_to_name(params.codec).to_string(),
            duration: duration_from_params(&params),
            error_slot: Arc::new(Mutex::new(None)),
        };

        // Decode the first packet up front so the reported rate and channel
        // count reflect what the decoder actually produces (AAC SBR doubles
        // the declared rate, for example).
        source.decode_next_packet();
        Ok(source)
    }

    /// Technical details for display
    pub fn clip_info(&self) -> ClipInfo {
        ClipInfo {
            codec_name: self.codec_name.clone(),
            channels: self.channels,
            sample_rate: self.sample_rate,
            duration: self.duration,
        }
    }

    /// Total clip length, if known
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Shared slot for decode errors that occur after the source is queued
    pub fn error_slot(&self) -> Arc<Mutex<Option<String>>> {
        Arc::clone(&self.error_slot)
    }

    fn record_error(&mut self, msg: String) {
        if let Ok(mut slot) = self.error_slot.lock() {
            slot.get_or_insert(msg);
        }
    }

    /// Decode packets until one yields samples. Returns false at end of
    /// stream or on a fatal decode error.
    fn decode_next_packet(&mut self) -> bool {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    // Clean end of stream
                    return false;
                }
                Err(e) => {
                    self.record_error(format!("Packet read error: {}", e));
                    return false;
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    self.sample_rate = spec.rate;
                    self.channels = spec.channels.count() as u16;

                    if self.sample_buf.is_none() {
                        self.sample_buf =
                            Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
                    }
                    if let Some(buf) = &mut self.sample_buf {
                        buf.copy_interleaved_ref(decoded);
                        self.sample_idx = 0;
                    }
                    return true;
                }
                // Skip over corrupt packets rather than killing playback
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(e) => {
                    self.record_error(format!("Decode error: {}", e));
                    return false;
                }
            }
        }
    }
}

impl Iterator for ClipSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        loop {
            if let Some(buf) = &self.sample_buf {
                if self.sample_idx < buf.len() {
                    let sample = buf.samples()[self.sample_idx];
                    self.sample_idx += 1;
                    return Some(sample);
                }
            }
            if !self.decode_next_packet() {
                return None;
            }
        }
    }
}

impl Source for ClipSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> rodio::ChannelCount {
        rodio::ChannelCount::new(self.channels)
            .expect("audio should always have at least one channel")
    }

    fn sample_rate(&self) -> rodio::SampleRate {
        rodio::SampleRate::new(self.sample_rate)
            .expect("audio should always have a non zero SampleRate")
    }

    fn total_duration(&self) -> Option<Duration> {
        self.duration
    }
}
