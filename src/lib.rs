// Metronome Core - Real-time click synthesis and scheduling engine
// Sample-accurate beat placement over a blocking audio output sink

// Module declarations
pub mod audio;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use audio::accent::{level_for_beat, AccentLevel};
pub use audio::engine::{render_session, PlaybackEngine};
pub use audio::profile::{ClickProfile, SoundStyle};
pub use audio::sink::OutputSink;
pub use config::EngineConfig;
pub use error::AudioError;
