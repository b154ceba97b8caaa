//! Background control-input sampling.
//!
//! Reads the joystick every 10 ms, maps the deflection onto a power
//! percentage, and broadcasts it to every channel. Commits go through the
//! atomic channel bank, so they land on the next zero-cross boundary without
//! ever tearing mid-cycle.

use defmt::debug;
use embassy_time::Timer;
use phase_core::config::ControlConfig;
use phase_core::mapper::power_from_sample;

use crate::control::{ChannelBank, SAMPLE_PERIOD, SampleSmoother};
use crate::hw::adc::JoystickAdc;

#[embassy_executor::task]
pub async fn run(bank: &'static ChannelBank, mut joystick: JoystickAdc<'static>) -> ! {
    let control = ControlConfig::DEFAULT;
    let mut smoother = SampleSmoother::new();
    let mut last_power: Option<u8> = None;

    loop {
        let sample = smoother.push(joystick.read());
        let power = power_from_sample(sample, &control);

        // All triacs track the single control axis.
        for channel in 0..bank.config().channels() {
            bank.set_power(channel, power);
        }

        if last_power != Some(power) {
            debug!("control sample {} -> {} % power", sample, power);
            last_power = Some(power);
        }

        Timer::after(SAMPLE_PERIOD).await;
    }
}
