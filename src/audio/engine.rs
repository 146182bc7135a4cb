//! PlaybackEngine - beat scheduling, mixing, and session lifecycle
//!
//! The engine converts tempo/meter/style into a continuous stream of mixed
//! buffers written to an output sink from one dedicated generation thread.
//! Key properties:
//! - Beat times accumulate in a floating-point sample clock, so drift stays
//!   below one sample over arbitrarily long sessions while each individual
//!   beat still lands on the nearest sample
//! - Overlapping clicks are mixed with saturating addition, never wrapped
//! - One session per engine; `start()` tears down any live session first
//! - `stop()` latency is bounded: one sink write plus the join timeout
//!
//! State machine: Idle → Running → Idle. Tempo and meter are fixed for a
//! session's lifetime; changing them means stop + start.

use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::accent::level_for_beat;
use super::profile::{ClickProfile, SoundStyle};
use super::sink::{open_output, OutputSink};
use crate::config::EngineConfig;
use crate::error::{log_audio_error, AudioError};

/// Valid tempo range in beats per minute; out-of-range values are clamped
pub const BPM_RANGE: (u32, u32) = (30, 240);

/// Valid meter range in beats per measure; out-of-range values are clamped
pub const BEATS_RANGE: (u32, u32) = (1, 12);

/// Per-session beat clock and mixer
///
/// Owns the floating-point sample clock, the cyclic beat index, and the
/// running sample total. `fill` implements the scheduling rules: every beat
/// whose nominal time falls before the end of the buffer is mixed in at its
/// rounded sample position, including beats that started just before the
/// buffer (negative offset ⇒ the waveform's tail is mixed from position 0).
pub struct BeatScheduler {
    samples_per_beat: f64,
    next_beat_sample: f64,
    total_samples_written: u64,
    beat_index: u32,
    beats_per_measure: u32,
}

impl BeatScheduler {
    pub fn new(bpm: u32, beats_per_measure: u32, sample_rate: u32) -> Self {
        Self {
            samples_per_beat: f64::from(sample_rate) * 60.0 / f64::from(bpm),
            next_beat_sample: 0.0,
            total_samples_written: 0,
            beat_index: 0,
            beats_per_measure,
        }
    }

    /// Nominal distance between beats, in samples
    pub fn samples_per_beat(&self) -> f64 {
        self.samples_per_beat
    }

    /// Total samples emitted through `fill` so far
    pub fn total_samples_written(&self) -> u64 {
        self.total_samples_written
    }

    /// Zero the buffer and mix in every beat scheduled within it.
    ///
    /// Returns the number of beats mixed into this buffer.
    pub fn fill(&mut self, buffer: &mut [i16], profile: &ClickProfile) -> usize {
        buffer.fill(0);
        let buffer_end = self.total_samples_written + buffer.len() as u64;
        let mut beats_mixed = 0;
        while self.next_beat_sample < buffer_end as f64 {
            let beat_sample = self.next_beat_sample.round() as i64;
            let offset = beat_sample - self.total_samples_written as i64;
            let level = level_for_beat(self.beat_index, self.beats_per_measure);
            mix_click(buffer, profile.waveform_for(level), offset);
            beats_mixed += 1;
            self.beat_index = (self.beat_index + 1) % self.beats_per_measure;
            self.next_beat_sample += self.samples_per_beat;
        }
        self.total_samples_written = buffer_end;
        beats_mixed
    }
}

/// Additively mix a click into the buffer at a sample offset.
///
/// A negative offset means the beat landed at or before the buffer start
/// due to rounding: the first `-offset` samples of the click are skipped
/// and the remainder is mixed from buffer position 0. The copy truncates
/// at the buffer end. Addition saturates at the i16 range.
fn mix_click(buffer: &mut [i16], click: &[i16], offset: i64) {
    if offset >= buffer.len() as i64 {
        return;
    }
    let (start, skip) = if offset < 0 {
        (0usize, (-offset) as usize)
    } else {
        (offset as usize, 0usize)
    };
    if skip >= click.len() {
        return;
    }
    let length = (click.len() - skip).min(buffer.len() - start);
    for i in 0..length {
        let mixed = i32::from(buffer[start + i]) + i32::from(click[skip + i]);
        buffer[start + i] = mixed.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
    }
}

/// Running session owned by the engine while in the Running state
struct Session {
    running: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
    // Kept alive on the control thread; dropping it releases the device.
    // cpal streams are not Send, so the generation thread never owns it.
    _stream: Option<cpal::Stream>,
}

/// Real-time click playback engine
///
/// Owns at most one session (output stream + generation thread) at a time.
/// `start` and `stop` are idempotent per the Idle → Running → Idle state
/// machine; invalid tempo/meter values are clamped rather than rejected so
/// the engine is always playable.
pub struct PlaybackEngine {
    config: EngineConfig,
    session: Option<Session>,
}

impl PlaybackEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Start a session on the default output device.
    ///
    /// Any live session is fully stopped first; there are never two
    /// concurrent sessions. If the device cannot be opened the error is
    /// returned, no thread is spawned, and the engine stays Idle.
    ///
    /// # Arguments
    /// * `bpm` - Tempo in beats per minute, clamped to [30, 240]
    /// * `beats_per_measure` - Meter, clamped to [1, 12]
    /// * `style` - Click timbre
    pub fn start(
        &mut self,
        bpm: u32,
        beats_per_measure: u32,
        style: SoundStyle,
    ) -> Result<(), AudioError> {
        self.stop();
        let (stream, sink) = open_output(&self.config).map_err(|err| {
            log_audio_error(&err, "start");
            err
        })?;
        self.spawn_session(Box::new(sink), Some(stream), bpm, beats_per_measure, style)
    }

    /// Start a session against a caller-provided sink.
    ///
    /// Same lifecycle as [`start`](Self::start) without opening a device;
    /// used for offline verification and by tests.
    pub fn start_with_sink(
        &mut self,
        sink: Box<dyn OutputSink>,
        bpm: u32,
        beats_per_measure: u32,
        style: SoundStyle,
    ) -> Result<(), AudioError> {
        self.stop();
        self.spawn_session(sink, None, bpm, beats_per_measure, style)
    }

    fn spawn_session(
        &mut self,
        sink: Box<dyn OutputSink>,
        stream: Option<cpal::Stream>,
        bpm: u32,
        beats_per_measure: u32,
        style: SoundStyle,
    ) -> Result<(), AudioError> {
        let bpm = bpm.clamp(BPM_RANGE.0, BPM_RANGE.1);
        let beats = beats_per_measure.clamp(BEATS_RANGE.0, BEATS_RANGE.1);
        let profile = ClickProfile::build(style, self.config.sample_rate);

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let sample_rate = self.config.sample_rate;
        let buffer_samples = self.config.buffer_samples;

        let handle = thread::Builder::new()
            .name("click-gen".to_string())
            .spawn(move || {
                info!(
                    "[Engine] Generation thread started: {} bpm, {} beats/measure, {:?}",
                    bpm, beats, style
                );
                run_generation_loop(sink, profile, bpm, beats, sample_rate, buffer_samples, flag);
                info!("[Engine] Generation thread exited");
            })
            .map_err(|e| {
                let err = AudioError::ThreadSpawnFailed {
                    details: e.to_string(),
                };
                log_audio_error(&err, "start");
                err
            })?;

        self.session = Some(Session {
            running,
            handle,
            _stream: stream,
        });
        Ok(())
    }

    /// Stop the current session; a no-op when Idle.
    ///
    /// Clears the running flag, waits up to `stop_timeout_ms` for the
    /// generation thread to finish, then releases the output device. A
    /// thread that misses the deadline is detached; the cleared flag
    /// guarantees it exits after at most one more sink write.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.running.store(false, Ordering::Release);

        let deadline = Instant::now() + Duration::from_millis(self.config.stop_timeout_ms);
        while !session.handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        if session.handle.is_finished() {
            let _ = session.handle.join();
        } else {
            warn!(
                "[Engine] Generation thread did not exit within {} ms; detaching",
                self.config.stop_timeout_ms
            );
        }
        // Session drops here: the stream is released and the device closed
    }

    /// Whether a session is live (thread spawned and not yet terminated)
    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.running.load(Ordering::Acquire) && !s.handle.is_finished())
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Generation loop body, run on the dedicated thread.
///
/// Fills one reused buffer per iteration and writes it out, retrying
/// partial writes until the buffer is fully consumed, the running flag
/// clears, or the sink reports an unrecoverable error. The buffer is
/// always filled atomically before any write, so a stop can cut output
/// short but never corrupts buffer state.
fn run_generation_loop(
    mut sink: Box<dyn OutputSink>,
    profile: ClickProfile,
    bpm: u32,
    beats_per_measure: u32,
    sample_rate: u32,
    buffer_samples: usize,
    running: Arc<AtomicBool>,
) {
    let mut scheduler = BeatScheduler::new(bpm, beats_per_measure, sample_rate);
    let mut buffer = vec![0i16; buffer_samples.max(1)];

    while running.load(Ordering::Acquire) {
        scheduler.fill(&mut buffer, &profile);

        let mut written = 0;
        while written < buffer.len() && running.load(Ordering::Acquire) {
            match sink.write(&buffer[written..]) {
                Ok(n) => written += n,
                Err(err) => {
                    error!("[Engine] Unrecoverable sink error, ending session: {}", err);
                    running.store(false, Ordering::Release);
                    break;
                }
            }
        }
    }

    if let Err(err) = sink.drain() {
        warn!("[Engine] Drain on shutdown failed: {}", err);
    }
}

/// Render a session offline into a PCM buffer.
///
/// Runs the same scheduler and mixer as a live session, without a device.
/// Tempo and meter are clamped exactly as in [`PlaybackEngine::start`].
pub fn render_session(
    bpm: u32,
    beats_per_measure: u32,
    style: SoundStyle,
    duration_secs: f64,
    config: &EngineConfig,
) -> Vec<i16> {
    let bpm = bpm.clamp(BPM_RANGE.0, BPM_RANGE.1);
    let beats = beats_per_measure.clamp(BEATS_RANGE.0, BEATS_RANGE.1);
    let profile = ClickProfile::build(style, config.sample_rate);
    let mut scheduler = BeatScheduler::new(bpm, beats, config.sample_rate);

    let total_samples = (f64::from(config.sample_rate) * duration_secs).round() as usize;
    let mut output = Vec::with_capacity(total_samples);
    let mut buffer = vec![0i16; config.buffer_samples.max(1)];
    while output.len() < total_samples {
        scheduler.fill(&mut buffer, &profile);
        let take = buffer.len().min(total_samples - output.len());
        output.extend_from_slice(&buffer[..take]);
    }
    output
}
