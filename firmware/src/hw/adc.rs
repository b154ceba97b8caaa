//! Joystick sampling over the on-chip ADC.
//!
//! The control input is a centered joystick potentiometer on PA0. The ADC
//! converts at 12 bits; readings are scaled down to the 10-bit range the
//! power mapper is calibrated for.

use embassy_stm32::adc::{Adc, AnyAdcChannel, SampleTime};
use embassy_stm32::peripherals::ADC1;

/// Blocking joystick reader returning 10-bit control samples.
pub struct JoystickAdc<'d> {
    adc: Adc<'d, ADC1>,
    channel: AnyAdcChannel<ADC1>,
}

impl<'d> JoystickAdc<'d> {
    /// Wraps the ADC and the joystick channel with a long sample time, since
    /// the pot is high-impedance and the loop runs at only 100 Hz.
    pub fn new(mut adc: Adc<'d, ADC1>, channel: AnyAdcChannel<ADC1>) -> Self {
        adc.set_sample_time(SampleTime::CYCLES160_5);
        Self { adc, channel }
    }

    /// Reads one sample, scaled to the 0..=1023 control range.
    pub fn read(&mut self) -> u16 {
        self.adc.blocking_read(&mut self.channel) >> 2
    }
}
