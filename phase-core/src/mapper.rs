//! Control-input to power-percentage mapping.
//!
//! The joystick rests near the center of the 10-bit ADC range. Deflection
//! past the deadzone in either direction maps linearly onto 0–100 % power,
//! reaching 100 % at the rails. Readings inside the deadzone command zero
//! power so electrical noise at rest cannot chatter the triacs.

use crate::config::{ADC_FULL_SCALE, ControlConfig};

/// Maps one raw control sample (0–1023) to a power percentage in `0..=100`.
///
/// Pure integer arithmetic; the multiplication happens before the division so
/// the scaling never truncates to zero prematurely.
pub fn power_from_sample(sample: u16, control: &ControlConfig) -> u8 {
    let sample = sample.min(ADC_FULL_SCALE);
    let upper = control.center + control.deadzone;
    let lower = control.center.saturating_sub(control.deadzone);

    let percent = if sample > upper {
        u32::from(sample - upper) * 100 / u32::from(ADC_FULL_SCALE - upper)
    } else if sample < lower {
        u32::from(lower - sample) * 100 / u32::from(lower)
    } else {
        0
    };

    percent.min(100) as u8
}

/// Maps a two-axis control reading to one power percentage per axis.
pub fn powers_from_axes(x: u16, y: u16, control: &ControlConfig) -> (u8, u8) {
    (
        power_from_sample(x, control),
        power_from_sample(y, control),
    )
}
