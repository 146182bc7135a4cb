// Error types for the metronome engine
//
// Structured error handling with numeric error codes, so callers embedding
// the engine (FFI shims, service wrappers) can branch on codes without
// string matching.

use log::error;
use std::fmt;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling at the
/// embedding boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Audio error code constants
///
/// Single source of truth for the numeric codes carried by [`AudioError`].
/// Error code range: 1001-1004
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// No usable output device was found
    pub const DEVICE_UNAVAILABLE: i32 = 1001;

    /// Failed to open or start the output stream
    pub const STREAM_OPEN_FAILED: i32 = 1002;

    /// Writing samples to the device failed unrecoverably
    pub const WRITE_FAILED: i32 = 1003;

    /// Spawning the generation thread failed
    pub const THREAD_SPAWN_FAILED: i32 = 1004;
}

/// Audio-related errors
///
/// These errors cover output-device access and the playback session
/// lifecycle. Synthesis itself is pure and cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// No usable output device was found
    DeviceUnavailable { reason: String },

    /// Failed to open or start the output stream
    StreamOpenFailed { reason: String },

    /// Writing samples to the device failed unrecoverably
    WriteFailed { details: String },

    /// Spawning the generation thread failed
    ThreadSpawnFailed { details: String },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::DeviceUnavailable { .. } => AudioErrorCodes::DEVICE_UNAVAILABLE,
            AudioError::StreamOpenFailed { .. } => AudioErrorCodes::STREAM_OPEN_FAILED,
            AudioError::WriteFailed { .. } => AudioErrorCodes::WRITE_FAILED,
            AudioError::ThreadSpawnFailed { .. } => AudioErrorCodes::THREAD_SPAWN_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::DeviceUnavailable { reason } => {
                format!("No output device available: {}", reason)
            }
            AudioError::StreamOpenFailed { reason } => {
                format!("Failed to open audio stream: {}", reason)
            }
            AudioError::WriteFailed { details } => {
                format!("Device write failed: {}", details)
            }
            AudioError::ThreadSpawnFailed { details } => {
                format!("Failed to spawn generation thread: {}", details)
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AudioError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::ThreadSpawnFailed {
            details: err.to_string(),
        }
    }
}

/// Log an audio error with structured context
///
/// Logs the error code, component, and message. Non-blocking; never panics.
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=PlaybackEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_codes() {
        assert_eq!(
            AudioError::DeviceUnavailable {
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::DEVICE_UNAVAILABLE
        );
        assert_eq!(
            AudioError::StreamOpenFailed {
                reason: "test".to_string()
            }
            .code(),
            AudioErrorCodes::STREAM_OPEN_FAILED
        );
        assert_eq!(
            AudioError::WriteFailed {
                details: "test".to_string()
            }
            .code(),
            AudioErrorCodes::WRITE_FAILED
        );
        assert_eq!(
            AudioError::ThreadSpawnFailed {
                details: "test".to_string()
            }
            .code(),
            AudioErrorCodes::THREAD_SPAWN_FAILED
        );
    }

    #[test]
    fn test_audio_error_messages() {
        let err = AudioError::DeviceUnavailable {
            reason: "no default device".to_string(),
        };
        assert_eq!(
            err.message(),
            "No output device available: no default device"
        );

        let err = AudioError::WriteFailed {
            details: "ring buffer closed".to_string(),
        };
        assert!(err.message().contains("ring buffer closed"));
    }

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::StreamOpenFailed {
            reason: "unsupported format".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("AudioError"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("thread limit reached");
        let audio_err: AudioError = io_err.into();
        match audio_err {
            AudioError::ThreadSpawnFailed { details } => {
                assert!(details.contains("thread limit reached"));
            }
            _ => panic!("Expected ThreadSpawnFailed"),
        }
    }
}
