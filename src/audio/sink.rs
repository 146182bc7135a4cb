//! Output sink - blocking sample delivery to the audio device
//!
//! The generation thread writes i16 buffers through the [`OutputSink`]
//! trait. The cpal-backed implementation pushes samples into a lock-free
//! SPSC ring buffer that the real-time output callback drains, so the
//! callback itself stays allocation- and lock-free:
//!
//! ```text
//! generation thread ──write()──> rtrb ring buffer ──pop()──> cpal callback
//! ```
//!
//! Tests substitute an in-memory sink; the generation loop never touches
//! cpal directly.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::warn;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::error::AudioError;

/// Pause between write attempts while the ring buffer is full
const BACKPRESSURE_WAIT: Duration = Duration::from_millis(1);

/// Bounded wait for the callback to drain remaining samples on shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Blocking output sink consumed by the generation loop
///
/// `write` may accept only part of the slice under backpressure; the
/// caller retries with the remainder. A returned error is unrecoverable
/// for the session.
pub trait OutputSink: Send {
    /// Write samples, returning how many were accepted (possibly zero)
    fn write(&mut self, samples: &[i16]) -> Result<usize, AudioError>;

    /// Block (bounded) until previously written samples have been consumed
    fn drain(&mut self) -> Result<(), AudioError>;
}

/// Sink half handed to the generation thread
///
/// Owns the producer side of the ring buffer. The paired cpal stream stays
/// on the control thread (cpal streams are not `Send`) and is dropped there
/// once the generation thread has exited.
pub struct RingBufferSink {
    producer: rtrb::Producer<i16>,
    capacity: usize,
}

impl OutputSink for RingBufferSink {
    fn write(&mut self, samples: &[i16]) -> Result<usize, AudioError> {
        if self.producer.is_abandoned() {
            return Err(AudioError::WriteFailed {
                details: "output stream closed the ring buffer".to_string(),
            });
        }
        let mut written = 0;
        for &sample in samples {
            match self.producer.push(sample) {
                Ok(()) => written += 1,
                Err(rtrb::PushError::Full(_)) => break,
            }
        }
        if written == 0 {
            // Full ring buffer: the device has not caught up yet. Sleep
            // briefly instead of spinning; the caller re-checks its running
            // flag between attempts.
            thread::sleep(BACKPRESSURE_WAIT);
        }
        Ok(written)
    }

    fn drain(&mut self) -> Result<(), AudioError> {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while self.producer.slots() < self.capacity && !self.producer.is_abandoned() {
            if Instant::now() >= deadline {
                warn!("[Sink] Drain timed out with samples still queued");
                break;
            }
            thread::sleep(BACKPRESSURE_WAIT);
        }
        Ok(())
    }
}

/// Open the default output device at the session format (mono content,
/// 16-bit source samples, fixed sample rate).
///
/// Returns the playing cpal stream and the sink for the generation thread.
/// Any failure here is fatal to `start()`: no thread is spawned and the
/// engine stays Idle.
pub fn open_output(config: &EngineConfig) -> Result<(cpal::Stream, RingBufferSink), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::DeviceUnavailable {
            reason: "No default output device found".to_string(),
        })?;

    let device_config = device
        .default_output_config()
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("Failed to get default output config: {:?}", e),
        })?;

    let channels_count = device_config.channels() as usize;
    let stream_config = cpal::StreamConfig {
        channels: device_config.channels(),
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let capacity = config.buffer_samples * config.ring_buffer_buffers.max(1);
    let (producer, mut consumer) = rtrb::RingBuffer::new(capacity);

    let err_fn = |err| log::error!("[Sink] Output stream error: {}", err);

    let stream = match device_config.sample_format() {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // Mono source duplicated across all device channels.
                // Underruns emit silence rather than stale samples.
                for frame in data.chunks_mut(channels_count) {
                    let sample = match consumer.pop() {
                        Ok(v) => f32::from(v) / 32_768.0,
                        Err(_) => 0.0,
                    };
                    for out in frame.iter_mut() {
                        *out = sample;
                    }
                }
            },
            err_fn,
            None,
        ),
        _ => {
            return Err(AudioError::StreamOpenFailed {
                reason: "Only F32 sample format is currently supported for output".to_string(),
            })
        }
    }
    .map_err(|e| AudioError::StreamOpenFailed {
        reason: format!("{:?}", e),
    })?;

    stream.play().map_err(|e| AudioError::StreamOpenFailed {
        reason: format!("Failed to start output stream: {:?}", e),
    })?;

    Ok((stream, RingBufferSink { producer, capacity }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_sink_partial_writes() {
        let (producer, mut consumer) = rtrb::RingBuffer::new(8);
        let mut sink = RingBufferSink {
            producer,
            capacity: 8,
        };

        let samples = [1i16; 12];
        let written = sink.write(&samples).expect("write should succeed");
        assert_eq!(written, 8, "Only the ring buffer capacity fits");

        // Consumer drains; the remainder fits on retry
        for _ in 0..8 {
            consumer.pop().expect("queued sample");
        }
        let written = sink.write(&samples[written..]).expect("retry should succeed");
        assert_eq!(written, 4, "Remaining samples accepted after drain");
    }

    #[test]
    fn test_ring_buffer_sink_reports_abandonment() {
        let (producer, consumer) = rtrb::RingBuffer::<i16>::new(4);
        let mut sink = RingBufferSink {
            producer,
            capacity: 4,
        };
        drop(consumer);

        let err = sink.write(&[0, 0]).expect_err("abandoned buffer should error");
        assert!(matches!(err, AudioError::WriteFailed { .. }));
    }

    #[test]
    fn test_drain_returns_once_empty() {
        let (producer, mut consumer) = rtrb::RingBuffer::new(4);
        let mut sink = RingBufferSink {
            producer,
            capacity: 4,
        };
        sink.write(&[1, 2]).expect("write should succeed");

        let handle = std::thread::spawn(move || {
            while consumer.pop().is_ok() {}
            consumer
        });
        sink.drain().expect("drain should succeed");
        drop(handle.join().expect("consumer thread"));
    }
}
