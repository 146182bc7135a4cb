//! Configuration for the playback engine
//!
//! Buffer sizing and stop-latency parameters can be adjusted via a JSON
//! config file without recompiling. Tempo, meter, and sound style are
//! per-session arguments to `start()`, not configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Playback engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Output sample rate in Hz (mono, 16-bit)
    pub sample_rate: u32,
    /// Size of each generation buffer in samples
    pub buffer_samples: usize,
    /// Ring buffer capacity, in multiples of `buffer_samples`
    pub ring_buffer_buffers: usize,
    /// Bounded wait for the generation thread to exit on stop, in milliseconds
    pub stop_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            buffer_samples: 1024,
            ring_buffer_buffers: 4,
            stop_timeout_ms: 300,
        }
    }
}

impl EngineConfig {
    /// Load configuration from JSON file
    ///
    /// Falls back to defaults if the file is missing or invalid, so the
    /// engine stays startable with no config present.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
