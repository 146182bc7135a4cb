//! Accent pattern - per-beat emphasis within a measure
//!
//! Single source of truth for which beats are accented. Any visual beat
//! indicator layered on top of the engine must call the same function so
//! audio and display never disagree.

/// Relative emphasis category of a beat within a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentLevel {
    /// Downbeat of the measure
    Strong,
    /// Group boundary in compound meters (6/8, 9/8)
    Secondary,
    /// Every other beat
    Regular,
}

/// Resolve the accent level for a beat index within a measure.
///
/// Beat 0 is always Strong. Compound meters subdivide into groups of
/// three: 6 beats as 3+3 (Secondary on beat 3), 9 beats as 3+3+3
/// (Secondary on beats 3 and 6). All remaining beats are Regular.
///
/// Pure and deterministic; zero allocations.
///
/// # Arguments
/// * `index` - Beat index within the measure, 0-based
/// * `beats_per_measure` - Measure length in beats
#[inline]
pub fn level_for_beat(index: u32, beats_per_measure: u32) -> AccentLevel {
    if index == 0 {
        return AccentLevel::Strong;
    }
    match beats_per_measure {
        6 if index == 3 => AccentLevel::Secondary,
        9 if index == 3 || index == 6 => AccentLevel::Secondary,
        _ => AccentLevel::Regular,
    }
}
