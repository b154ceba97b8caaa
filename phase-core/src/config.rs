//! Immutable controller configuration shared by firmware and host targets.
//!
//! All timing parameters live in one configuration value constructed at
//! startup and handed to the mapper, the delay calculator, and the firing
//! sequencer, so the 50 Hz/60 Hz and 1/2/3-channel variants share a single
//! implementation.

/// Maximum number of independently fired triac channels.
pub const MAX_TRIAC_CHANNELS: usize = 3;

/// Full-scale reading of the 10-bit control input ADC.
pub const ADC_FULL_SCALE: u16 = 1023;

/// Mains frequency the zero-cross detector is wired to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LineFrequency {
    Hz50,
    Hz60,
}

impl LineFrequency {
    /// Duration of one AC half-cycle in microseconds.
    pub const fn half_cycle_us(self) -> u32 {
        match self {
            // 10 ms at 50 Hz, 8.33 ms at 60 Hz (rounded down).
            LineFrequency::Hz50 => 10_000,
            LineFrequency::Hz60 => 8_333,
        }
    }
}

/// Earliest practical trigger point, bounded by triac gate-drive minimums.
pub const DEFAULT_MIN_FIRING_DELAY_US: u32 = 500;

/// Width of one triac gate pulse.
pub const DEFAULT_GATE_PULSE_US: u32 = 50;

/// Compare-timer resolution: ticks per microsecond at the 10 MHz timer clock.
pub const DEFAULT_TICKS_PER_US: u32 = 10;

/// Timing parameters for the phase-angle firing engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PhaseConfig {
    /// Duration of one AC half-cycle in microseconds.
    pub half_cycle_us: u32,
    /// Firing delay commanded at 100 % power.
    pub min_firing_delay_us: u32,
    /// Gate pulse width in microseconds.
    pub gate_pulse_us: u32,
    /// Compare-timer ticks per microsecond.
    pub ticks_per_us: u32,
    /// Number of fired channels, 1 to [`MAX_TRIAC_CHANNELS`].
    channels: usize,
}

impl PhaseConfig {
    /// Builds a configuration for the given mains frequency and channel count.
    ///
    /// The channel count is clamped into `1..=MAX_TRIAC_CHANNELS`; every other
    /// parameter takes the default hardware value.
    pub const fn new(line: LineFrequency, channels: usize) -> Self {
        Self {
            half_cycle_us: line.half_cycle_us(),
            min_firing_delay_us: DEFAULT_MIN_FIRING_DELAY_US,
            gate_pulse_us: DEFAULT_GATE_PULSE_US,
            ticks_per_us: DEFAULT_TICKS_PER_US,
            channels: clamp_channels(channels),
        }
    }

    /// Returns the configured channel count.
    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// Gate pulse width expressed in timer ticks.
    pub const fn gate_pulse_ticks(&self) -> u32 {
        self.gate_pulse_us * self.ticks_per_us
    }

    /// Returns `true` when `channel` addresses a fired channel.
    pub const fn has_channel(&self, channel: usize) -> bool {
        channel < self.channels
    }
}

const fn clamp_channels(channels: usize) -> usize {
    if channels == 0 {
        1
    } else if channels > MAX_TRIAC_CHANNELS {
        MAX_TRIAC_CHANNELS
    } else {
        channels
    }
}

/// Control-input mapping parameters for the joystick/potentiometer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ControlConfig {
    /// Raw reading at the control's rest position.
    pub center: u16,
    /// Half-width of the zero-power band around `center`.
    pub deadzone: u16,
}

impl ControlConfig {
    /// Mapping used by the reference hardware: centered 10-bit joystick with
    /// a 50-count deadzone.
    pub const DEFAULT: Self = Self {
        center: 512,
        deadzone: 50,
    };

    pub const fn new(center: u16, deadzone: u16) -> Self {
        Self { center, deadzone }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
