//! Impact decay math.
//!
//! Each active impact loses intensity once per tick in proportion to its own
//! configured fade rate *and* its current intensity:
//!
//!   intensity -= (fade_rate / 60) · (intensity / 100)
//!
//! which is exponential-style decay — strong impacts shed more per tick, and
//! a higher fade rate shortens an emotion's effective lifetime. The scheduler
//! that drives these ticks lives in [`crate::engine`]; this module is pure
//! math so it can be tested without timers.

/// Intensity below which an impact is treated as spent.
///
/// The decay step alone asymptotes toward zero without ever reaching it, so
/// the ledger needs an explicit floor to actually release impacts (and their
/// timers).
pub const EXPIRY_FLOOR: f32 = 1.0;

/// Apply one decay tick to an intensity value.
///
/// Returns the reduced intensity, floored at 0.0 once it drops below
/// [`EXPIRY_FLOOR`].
#[must_use]
pub fn step(intensity: f32, fade_rate: f32) -> f32 {
    let next = intensity - (fade_rate / 60.0) * (intensity / 100.0);
    if next < EXPIRY_FLOOR { 0.0 } else { next }
}

/// Whether a decayed intensity means the impact should leave the ledger.
#[must_use]
pub fn is_spent(intensity: f32) -> bool {
    intensity <= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joy_scenario_first_tick() {
        // 80 - (60/60) * (80/100) = 79.2
        let next = step(80.0, 60.0);
        assert!((next - 79.2).abs() < 1e-4, "got {next}");
    }

    #[test]
    fn repeated_ticks_monotonically_reach_zero() {
        let mut intensity = 80.0;
        let mut previous = f32::MAX;
        let mut ticks = 0u32;
        while !is_spent(intensity) {
            assert!(intensity < previous, "decay must be monotonic");
            previous = intensity;
            intensity = step(intensity, 60.0);
            ticks += 1;
            assert!(ticks < 100_000, "decay must terminate");
        }
        assert!(is_spent(intensity));
    }

    #[test]
    fn higher_fade_rate_decays_faster() {
        let slow = step(50.0, 10.0);
        let fast = step(50.0, 90.0);
        assert!(fast < slow);
    }

    #[test]
    fn zero_fade_rate_holds_steady() {
        let next = step(50.0, 0.0);
        assert!((next - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn sub_floor_intensity_is_cut_to_zero() {
        let next = step(1.0, 60.0);
        assert!((next - 0.0).abs() < f32::EPSILON);
        assert!(is_spent(next));
    }

    #[test]
    fn extreme_fade_rate_never_goes_negative() {
        let next = step(50.0, 10_000.0);
        assert!(next >= 0.0);
        assert!(is_spent(next));
    }
}
