// Audio module - click synthesis, beat scheduling, and device output

pub mod accent;
pub mod engine;
pub mod profile;
pub mod sink;
pub mod synth;

// Re-export commonly used types for convenience
pub use accent::{level_for_beat, AccentLevel};
pub use engine::PlaybackEngine;
pub use profile::{ClickProfile, SoundStyle};
pub use sink::OutputSink;
pub use synth::Waveform;
