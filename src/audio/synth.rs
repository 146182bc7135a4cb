//! Tone synthesis - fixed-length PCM click waveforms
//!
//! Pure functions generating exponentially decaying sine bursts as signed
//! 16-bit mono PCM. Key properties:
//! - Deterministic output for identical parameters (results are cacheable)
//! - Zero run-time state; sample rate is passed explicitly
//! - Every sample clamped to the i16 range before narrowing

use std::f64::consts::PI;

/// Immutable fixed-length click waveform, signed 16-bit mono PCM
pub type Waveform = Vec<i16>;

/// Weight of the second partial in dual-partial clicks
const SECOND_PARTIAL_GAIN: f64 = 0.6;

/// Generate a single-partial click waveform.
///
/// `sample[i] = sin(2π f i / sr) · exp(-decay · i / n) · volume · i16::MAX`,
/// rounded to the nearest integer and clamped to the 16-bit signed range.
///
/// # Arguments
/// * `sample_rate` - Output sample rate in Hz
/// * `freq_hz` - Partial frequency in Hz
/// * `duration_ms` - Waveform length in milliseconds (minimum one sample)
/// * `volume` - Peak amplitude scale in (0, 1]
/// * `decay` - Exponential envelope steepness over the waveform length
pub fn build_tone(
    sample_rate: u32,
    freq_hz: f64,
    duration_ms: u32,
    volume: f64,
    decay: f64,
) -> Waveform {
    let sample_count = sample_count_for(sample_rate, duration_ms);
    let omega = 2.0 * PI * freq_hz / f64::from(sample_rate);
    let mut buffer = Vec::with_capacity(sample_count);
    for i in 0..sample_count {
        let envelope = (-decay * i as f64 / sample_count as f64).exp();
        let sample = (omega * i as f64).sin() * envelope * volume;
        buffer.push(quantize(sample));
    }
    buffer
}

/// Generate a dual-partial click waveform (woodblock-like timbre).
///
/// The two partials are summed with the second at 0.6 gain and the total
/// divided by 1.6, bounding the combined amplitude to ≤ 1 before the
/// volume scale is applied.
pub fn build_dual_tone(
    sample_rate: u32,
    freq_a_hz: f64,
    freq_b_hz: f64,
    duration_ms: u32,
    volume: f64,
    decay: f64,
) -> Waveform {
    let sample_count = sample_count_for(sample_rate, duration_ms);
    let omega_a = 2.0 * PI * freq_a_hz / f64::from(sample_rate);
    let omega_b = 2.0 * PI * freq_b_hz / f64::from(sample_rate);
    let norm = 1.0 + SECOND_PARTIAL_GAIN;
    let mut buffer = Vec::with_capacity(sample_count);
    for i in 0..sample_count {
        let envelope = (-decay * i as f64 / sample_count as f64).exp();
        let mixed = ((omega_a * i as f64).sin() + SECOND_PARTIAL_GAIN * (omega_b * i as f64).sin())
            / norm;
        buffer.push(quantize(mixed * envelope * volume));
    }
    buffer
}

/// Number of samples for a duration, never less than one
#[inline]
pub fn sample_count_for(sample_rate: u32, duration_ms: u32) -> usize {
    let exact = f64::from(sample_rate) * f64::from(duration_ms) / 1000.0;
    (exact.round() as usize).max(1)
}

/// Round a normalized sample to i16, clamping out-of-range values
#[inline]
fn quantize(normalized: f64) -> i16 {
    let scaled = (normalized * f64::from(i16::MAX)).round();
    scaled.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 44_100;

    #[test]
    fn test_sample_count_matches_duration() {
        // Durations used across the style table
        for &ms in &[8u32, 12, 16, 18, 22, 42, 46, 50] {
            let expected = (f64::from(SAMPLE_RATE) * f64::from(ms) / 1000.0).round() as usize;
            let wave = build_tone(SAMPLE_RATE, 1000.0, ms, 0.9, 5.0);
            assert_eq!(
                wave.len(),
                expected,
                "Waveform length should match {} ms at {} Hz",
                ms,
                SAMPLE_RATE
            );
        }
    }

    #[test]
    fn test_zero_duration_yields_one_sample() {
        let wave = build_tone(SAMPLE_RATE, 1000.0, 0, 0.9, 5.0);
        assert_eq!(wave.len(), 1, "Length is never below one sample");
    }

    #[test]
    fn test_tone_is_deterministic() {
        let a = build_tone(SAMPLE_RATE, 780.0, 18, 0.55, 5.0);
        let b = build_tone(SAMPLE_RATE, 780.0, 18, 0.55, 5.0);
        assert_eq!(a, b, "Synthesis should be deterministic");
    }

    #[test]
    fn test_tone_peak_respects_volume() {
        let wave = build_tone(SAMPLE_RATE, 1000.0, 18, 0.5, 5.0);
        let ceiling = (0.5 * f64::from(i16::MAX)).round() as i16;
        for (i, &sample) in wave.iter().enumerate() {
            assert!(
                sample.abs() <= ceiling,
                "Sample {} at index {} exceeds volume ceiling {}",
                sample,
                i,
                ceiling
            );
        }
    }

    #[test]
    fn test_dual_tone_normalization_bounds_amplitude() {
        // Full volume, no decay: the 1/1.6 normalization alone must keep
        // the two-partial sum inside the i16 range.
        let wave = build_dual_tone(SAMPLE_RATE, 900.0, 1200.0, 16, 1.0, 0.0);
        for (i, &sample) in wave.iter().enumerate() {
            assert!(
                sample > i16::MIN && sample <= i16::MAX,
                "Sample {} at index {} escaped the 16-bit range",
                sample,
                i
            );
        }
    }

    #[test]
    fn test_envelope_decays_toward_silence() {
        let wave = build_tone(SAMPLE_RATE, 1000.0, 50, 0.9, 5.0);
        let head_peak = wave[..64].iter().map(|s| s.unsigned_abs()).max().unwrap();
        let tail_peak = wave[wave.len() - 64..]
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap();
        assert!(
            tail_peak < head_peak / 4,
            "Tail peak {} should be well below head peak {}",
            tail_peak,
            head_peak
        );
    }
}
