//! Sound styles and click profiles
//!
//! A click profile bundles the three precomputed waveforms (one per accent
//! level) for a sound style. Profiles are stateless and rebuildable at any
//! time from the style alone; the engine builds one per session.

use super::accent::AccentLevel;
use super::synth::{build_dual_tone, build_tone, Waveform};

/// Selectable click timbre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundStyle {
    Classic,
    Short,
    Soft,
    Wood,
    Drum,
    Metal,
}

impl SoundStyle {
    /// Stable numeric id for persistence and FFI surfaces
    pub fn id(self) -> i32 {
        match self {
            SoundStyle::Classic => 0,
            SoundStyle::Short => 1,
            SoundStyle::Soft => 2,
            SoundStyle::Wood => 3,
            SoundStyle::Drum => 4,
            SoundStyle::Metal => 5,
        }
    }

    /// Resolve a numeric id, substituting Classic for unknown values
    pub fn from_id(id: i32) -> Self {
        match id {
            1 => SoundStyle::Short,
            2 => SoundStyle::Soft,
            3 => SoundStyle::Wood,
            4 => SoundStyle::Drum,
            5 => SoundStyle::Metal,
            _ => SoundStyle::Classic,
        }
    }
}

impl Default for SoundStyle {
    fn default() -> Self {
        SoundStyle::Classic
    }
}

/// The three waveforms representing one sound style
#[derive(Debug, Clone)]
pub struct ClickProfile {
    strong: Waveform,
    secondary: Waveform,
    regular: Waveform,
}

impl ClickProfile {
    /// Build the profile for a style at the given sample rate.
    ///
    /// Frequencies, durations, volumes, and decay constants are fixed per
    /// style; changing them changes the product's sound.
    pub fn build(style: SoundStyle, sample_rate: u32) -> Self {
        match style {
            SoundStyle::Classic => ClickProfile {
                strong: build_tone(sample_rate, 1000.0, 18, 0.9, 5.0),
                secondary: build_tone(sample_rate, 900.0, 18, 0.7, 5.0),
                regular: build_tone(sample_rate, 780.0, 18, 0.55, 5.0),
            },
            SoundStyle::Short => ClickProfile {
                strong: build_tone(sample_rate, 1400.0, 8, 0.85, 7.5),
                secondary: build_tone(sample_rate, 1200.0, 8, 0.65, 7.5),
                regular: build_tone(sample_rate, 1000.0, 8, 0.5, 7.5),
            },
            SoundStyle::Soft => ClickProfile {
                strong: build_tone(sample_rate, 700.0, 22, 0.5, 4.0),
                secondary: build_tone(sample_rate, 620.0, 22, 0.42, 4.0),
                regular: build_tone(sample_rate, 540.0, 22, 0.35, 4.0),
            },
            SoundStyle::Wood => ClickProfile {
                strong: build_dual_tone(sample_rate, 900.0, 1200.0, 16, 0.8, 6.0),
                secondary: build_dual_tone(sample_rate, 820.0, 1080.0, 16, 0.62, 6.0),
                regular: build_dual_tone(sample_rate, 700.0, 980.0, 16, 0.5, 6.0),
            },
            SoundStyle::Drum => ClickProfile {
                strong: build_tone(sample_rate, 220.0, 50, 0.9, 2.2),
                secondary: build_tone(sample_rate, 200.0, 46, 0.7, 2.2),
                regular: build_tone(sample_rate, 170.0, 42, 0.55, 2.2),
            },
            SoundStyle::Metal => ClickProfile {
                strong: build_tone(sample_rate, 2000.0, 12, 0.7, 7.0),
                secondary: build_tone(sample_rate, 1800.0, 12, 0.55, 7.0),
                regular: build_tone(sample_rate, 1600.0, 12, 0.4, 7.0),
            },
        }
    }

    /// Select the waveform for an accent level
    #[inline]
    pub fn waveform_for(&self, level: AccentLevel) -> &[i16] {
        match level {
            AccentLevel::Strong => &self.strong,
            AccentLevel::Secondary => &self.secondary,
            AccentLevel::Regular => &self.regular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44_100;

    const ALL_STYLES: [SoundStyle; 6] = [
        SoundStyle::Classic,
        SoundStyle::Short,
        SoundStyle::Soft,
        SoundStyle::Wood,
        SoundStyle::Drum,
        SoundStyle::Metal,
    ];

    #[test]
    fn test_id_round_trip() {
        for style in ALL_STYLES {
            assert_eq!(
                SoundStyle::from_id(style.id()),
                style,
                "Id round trip failed for {:?}",
                style
            );
        }
    }

    #[test]
    fn test_unknown_id_falls_back_to_classic() {
        for id in [-1, 6, 42, i32::MAX] {
            assert_eq!(
                SoundStyle::from_id(id),
                SoundStyle::Classic,
                "Unknown id {} should resolve to Classic",
                id
            );
        }
    }

    #[test]
    fn test_every_style_builds_nonempty_waveforms() {
        for style in ALL_STYLES {
            let profile = ClickProfile::build(style, SAMPLE_RATE);
            for level in [
                AccentLevel::Strong,
                AccentLevel::Secondary,
                AccentLevel::Regular,
            ] {
                assert!(
                    !profile.waveform_for(level).is_empty(),
                    "{:?}/{:?} produced an empty waveform",
                    style,
                    level
                );
            }
        }
    }

    #[test]
    fn test_strong_beats_are_loudest() {
        for style in ALL_STYLES {
            let profile = ClickProfile::build(style, SAMPLE_RATE);
            let peak = |level| {
                profile
                    .waveform_for(level)
                    .iter()
                    .map(|s: &i16| s.unsigned_abs())
                    .max()
                    .unwrap()
            };
            assert!(
                peak(AccentLevel::Strong) > peak(AccentLevel::Regular),
                "{:?}: strong beat should out-peak regular",
                style
            );
        }
    }

    #[test]
    fn test_drum_durations_differ_per_level() {
        let profile = ClickProfile::build(SoundStyle::Drum, SAMPLE_RATE);
        let strong = profile.waveform_for(AccentLevel::Strong).len();
        let secondary = profile.waveform_for(AccentLevel::Secondary).len();
        let regular = profile.waveform_for(AccentLevel::Regular).len();
        assert!(
            strong > secondary && secondary > regular,
            "Drum durations should shrink with accent level: {} / {} / {}",
            strong,
            secondary,
            regular
        );
    }
}
