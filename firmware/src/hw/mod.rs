//! Hardware bindings for the triac gate lines and the compare timing model.
//!
//! The firing state machine in `phase-core` talks to hardware through the
//! [`TriacSurface`] capability. On the MCU the gate lines are plain push-pull
//! outputs into the gate-drive optocouplers, and the compare timer is
//! realized by the async firing task awaiting the armed tick count on the
//! executor's time driver, so `reset_counter` needs no hardware action: every
//! armed wait is already measured from the instant it is armed.

pub mod adc;

use embassy_stm32::gpio::Output;
use phase_core::config::MAX_TRIAC_CHANNELS;
use phase_core::sequencer::TriacSurface;

/// Gate outputs plus the armed-compare bookkeeping for the firing loop.
pub struct GateDriver<'d> {
    gates: [Output<'d>; MAX_TRIAC_CHANNELS],
    armed_ticks: Option<u32>,
    running: bool,
}

impl<'d> GateDriver<'d> {
    /// Wraps the three gate outputs; unfired channels simply stay low.
    pub fn new(gates: [Output<'d>; MAX_TRIAC_CHANNELS]) -> Self {
        Self {
            gates,
            armed_ticks: None,
            running: false,
        }
    }

    /// Takes the pending compare arm, if the timer is running.
    ///
    /// The firing task awaits this many ticks and then delivers the compare
    /// event back to the sequencer.
    pub fn take_armed(&mut self) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.armed_ticks.take()
    }
}

impl TriacSurface for GateDriver<'_> {
    fn set_gate(&mut self, channel: usize, asserted: bool) {
        if let Some(gate) = self.gates.get_mut(channel) {
            if asserted {
                gate.set_high();
            } else {
                gate.set_low();
            }
        }
    }

    fn arm_compare(&mut self, ticks: u32) {
        self.armed_ticks = Some(ticks);
    }

    fn reset_counter(&mut self) {
        // The await-based compare model measures every arm from its own
        // arming instant; there is no free-running counter to clear.
    }

    fn start_timer(&mut self) {
        self.running = true;
    }

    fn stop_timer(&mut self) {
        self.running = false;
        self.armed_ticks = None;
    }
}
