//! Power-percentage to firing-delay conversion.
//!
//! The firing delay is the time from the zero-cross reference to the gate
//! trigger. Zero power parks the trigger at the end of the half-cycle where
//! it never conducts; full power triggers at the minimum delay the gate
//! drive allows. The conversion runs at commit time, never inside the firing
//! path, so the sequencer only ever consumes precomputed values.

use crate::config::PhaseConfig;

/// A firing delay in both time units and compare-timer ticks.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FiringDelay {
    /// Delay from the zero-cross reference in microseconds.
    pub micros: u32,
    /// The same delay expressed in compare-timer ticks.
    pub ticks: u32,
}

/// Computes the firing delay for a power percentage.
///
/// `delay = half_cycle − power × (half_cycle − min_delay) / 100`, clamped to
/// 100 % power. Monotonic: more power, shorter delay, earlier trigger, more
/// of the half-cycle conducted.
pub fn firing_delay(power: u8, config: &PhaseConfig) -> FiringDelay {
    let power = u32::from(power.min(100));
    let span = config.half_cycle_us - config.min_firing_delay_us;
    let micros = config.half_cycle_us - power * span / 100;
    FiringDelay {
        micros,
        ticks: micros * config.ticks_per_us,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineFrequency;

    const CONFIG: PhaseConfig = PhaseConfig::new(LineFrequency::Hz60, 2);

    #[test]
    fn zero_power_parks_at_end_of_half_cycle() {
        let delay = firing_delay(0, &CONFIG);
        assert_eq!(delay.micros, 8_333);
        assert_eq!(delay.ticks, 83_330);
    }

    #[test]
    fn full_power_triggers_at_minimum_delay() {
        let delay = firing_delay(100, &CONFIG);
        assert_eq!(delay.micros, 500);
        assert_eq!(delay.ticks, 5_000);
    }

    #[test]
    fn delay_is_monotonic_non_increasing_in_power() {
        let mut previous = firing_delay(0, &CONFIG);
        for power in 1..=100 {
            let delay = firing_delay(power, &CONFIG);
            assert!(delay.micros <= previous.micros, "delay grew at {power} %");
            assert!(delay.ticks <= previous.ticks);
            previous = delay;
        }
    }

    #[test]
    fn over_range_power_clamps_to_full() {
        assert_eq!(firing_delay(255, &CONFIG), firing_delay(100, &CONFIG));
    }

    #[test]
    fn fifty_hertz_mains_stretches_the_delay() {
        let config = PhaseConfig::new(LineFrequency::Hz50, 2);
        assert_eq!(firing_delay(0, &config).micros, 10_000);
        assert_eq!(firing_delay(100, &config).micros, 500);
    }
}
