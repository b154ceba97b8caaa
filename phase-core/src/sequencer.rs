//! Zero-cross-synchronized triac firing state machine.
//!
//! Once per AC half-cycle the zero-cross edge latches every channel's
//! committed (power, delay) pair and arms the compare timer for channel 0.
//! Each compare event then advances the machine one step: `Fire(i)` asserts
//! channel i's gate (only when its latched power is non-zero) and arms the
//! fixed pulse width; `Hold(i)` deasserts the gate unconditionally and either
//! arms the next channel's delay or stops the timer. Channels therefore fire
//! strictly in index order and no two gate pulses ever overlap.
//!
//! The machine touches hardware only through [`TriacSurface`], so the same
//! code runs against real gate outputs on the MCU and against the recording
//! surface in host tests and the emulator.

use heapless::Vec;

use crate::channel::ChannelBank;
use crate::config::{MAX_TRIAC_CHANNELS, PhaseConfig};

/// Capability surface over the compare timer and the triac gate lines.
///
/// Timer semantics follow the periodic-interrupt compare timer of the target
/// hardware: the free-running counter wraps to zero on every compare match,
/// so [`arm_compare`](TriacSurface::arm_compare) schedules the next event
/// relative to the most recent match (or to an explicit
/// [`reset_counter`](TriacSurface::reset_counter)).
pub trait TriacSurface {
    /// Drives one channel's gate line high or low.
    fn set_gate(&mut self, channel: usize, asserted: bool);

    /// Schedules the next compare event `ticks` after the counter reset point.
    fn arm_compare(&mut self, ticks: u32);

    /// Forces the free-running counter to zero, re-establishing the timing
    /// reference at the instant of the call.
    fn reset_counter(&mut self);

    /// Starts the compare timer if it is not already running.
    fn start_timer(&mut self);

    /// Stops the compare timer until the next zero-cross.
    fn stop_timer(&mut self);
}

/// Position of the firing state machine within the half-cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FiringStep {
    /// Waiting for the next zero-cross; the timer is stopped.
    Idle,
    /// Gate pulse for this channel begins at the next compare event.
    Fire(usize),
    /// Gate pulse for this channel ends at the next compare event.
    Hold(usize),
}

impl FiringStep {
    /// Returns `true` while a half-cycle sequence is in flight.
    pub const fn is_active(self) -> bool {
        !matches!(self, FiringStep::Idle)
    }
}

/// One channel's planned pulse within the upcoming half-cycle.
///
/// Start offsets are cumulative from the zero-cross reference: each channel's
/// delay is measured from the end of the previous channel's pulse.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PlannedPulse {
    pub channel: usize,
    /// Offset of the gate assertion from the zero-cross, in timer ticks.
    pub start_ticks: u32,
    /// Pulse width in timer ticks.
    pub width_ticks: u32,
    /// `false` when zero committed power suppresses the assertion.
    pub asserts: bool,
}

/// The interrupt-driven firing engine for up to three triac channels.
pub struct FiringSequencer {
    config: PhaseConfig,
    step: FiringStep,
    latched_ticks: [u32; MAX_TRIAC_CHANNELS],
    latched_fires: [bool; MAX_TRIAC_CHANNELS],
}

impl FiringSequencer {
    /// Creates an idle sequencer for the given timing configuration.
    pub const fn new(config: PhaseConfig) -> Self {
        Self {
            config,
            step: FiringStep::Idle,
            latched_ticks: [0; MAX_TRIAC_CHANNELS],
            latched_fires: [false; MAX_TRIAC_CHANNELS],
        }
    }

    /// Returns the current state-machine position.
    pub const fn step(&self) -> FiringStep {
        self.step
    }

    /// Returns the timing configuration the sequencer runs against.
    pub const fn config(&self) -> &PhaseConfig {
        &self.config
    }

    /// Handles a detected zero-cross edge: the start-of-half-cycle event.
    ///
    /// Resets unconditionally. If the previous half-cycle has not finished
    /// stepping (starvation, missed compare), the straggling pulse is
    /// sacrificed: every gate is deasserted and the new cycle starts clean
    /// rather than risking a trigger at the wrong phase angle.
    pub fn on_zero_cross<S: TriacSurface>(&mut self, bank: &ChannelBank, surface: &mut S) {
        if self.step.is_active() {
            self.release_gates(surface);
        }

        // Latch the committed pairs once; firing never re-reads the bank, so
        // background writes only take effect from the next zero-cross on.
        for channel in 0..self.config.channels() {
            let command = bank.command(channel);
            self.latched_ticks[channel] = command.delay_ticks;
            self.latched_fires[channel] = command.fires();
        }

        surface.reset_counter();
        surface.arm_compare(self.latched_ticks[0]);
        self.step = FiringStep::Fire(0);
        surface.start_timer();
    }

    /// Advances the machine one step on a compare-match event.
    pub fn on_timer_compare<S: TriacSurface>(&mut self, surface: &mut S) {
        match self.step {
            // Spurious compare while no cycle is in flight.
            FiringStep::Idle => {}
            FiringStep::Fire(channel) => {
                if self.latched_fires[channel] {
                    surface.set_gate(channel, true);
                }
                surface.arm_compare(self.config.gate_pulse_ticks());
                self.step = FiringStep::Hold(channel);
            }
            FiringStep::Hold(channel) => {
                // Deassert unconditionally so the line can never stay high.
                surface.set_gate(channel, false);
                let next = channel + 1;
                if next < self.config.channels() {
                    surface.reset_counter();
                    surface.arm_compare(self.latched_ticks[next]);
                    self.step = FiringStep::Fire(next);
                } else {
                    surface.stop_timer();
                    self.step = FiringStep::Idle;
                }
            }
        }
    }

    /// Forces every output low, zeroes the committed powers, and halts the
    /// timer. Idempotent; callable from any context that owns the surface.
    pub fn emergency_stop<S: TriacSurface>(&mut self, bank: &ChannelBank, surface: &mut S) {
        self.release_gates(surface);
        bank.clear_all();
        surface.stop_timer();
        self.step = FiringStep::Idle;
    }

    /// Reports the pulse timeline the committed bank state implies for the
    /// next half-cycle. Diagnostics only; the firing path never calls this.
    pub fn firing_plan(&self, bank: &ChannelBank) -> Vec<PlannedPulse, MAX_TRIAC_CHANNELS> {
        let mut plan = Vec::new();
        let width = self.config.gate_pulse_ticks();
        let mut offset = 0u32;
        for channel in 0..self.config.channels() {
            let command = bank.command(channel);
            offset += command.delay_ticks;
            // Capacity equals the channel maximum, so this push cannot fail.
            let _ = plan.push(PlannedPulse {
                channel,
                start_ticks: offset,
                width_ticks: width,
                asserts: command.fires(),
            });
            offset += width;
        }
        plan
    }

    fn release_gates<S: TriacSurface>(&mut self, surface: &mut S) {
        for channel in 0..self.config.channels() {
            surface.set_gate(channel, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineFrequency;
    use crate::sim::RecordingSurface;

    fn fixture(channels: usize) -> (ChannelBank, FiringSequencer, RecordingSurface) {
        let config = PhaseConfig::new(LineFrequency::Hz60, channels);
        (
            ChannelBank::new(config),
            FiringSequencer::new(config),
            RecordingSurface::new(),
        )
    }

    #[test]
    fn sequencer_starts_idle() {
        let (_, sequencer, _) = fixture(2);
        assert_eq!(sequencer.step(), FiringStep::Idle);
        assert!(!sequencer.step().is_active());
    }

    #[test]
    fn zero_cross_enters_fire_zero_and_starts_timer() {
        let (bank, mut sequencer, mut surface) = fixture(2);
        bank.set_power(0, 50);
        sequencer.on_zero_cross(&bank, &mut surface);
        assert_eq!(sequencer.step(), FiringStep::Fire(0));
        assert!(surface.timer_running());
    }

    #[test]
    fn compare_in_idle_is_a_no_op() {
        let (_, mut sequencer, mut surface) = fixture(1);
        sequencer.on_timer_compare(&mut surface);
        assert_eq!(sequencer.step(), FiringStep::Idle);
        assert!(surface.events().is_empty());
    }

    #[test]
    fn hold_deasserts_even_when_fire_skipped_the_gate() {
        let (bank, mut sequencer, mut surface) = fixture(1);
        bank.set_power(0, 0);
        sequencer.on_zero_cross(&bank, &mut surface);
        sequencer.on_timer_compare(&mut surface); // Fire(0): no assertion
        sequencer.on_timer_compare(&mut surface); // Hold(0): unconditional low
        assert!(!surface.gate(0));
        assert_eq!(sequencer.step(), FiringStep::Idle);
    }

    #[test]
    fn emergency_stop_is_idempotent_and_clears_the_bank() {
        let (bank, mut sequencer, mut surface) = fixture(3);
        bank.set_power(0, 80);
        bank.set_power(2, 20);
        sequencer.on_zero_cross(&bank, &mut surface);
        sequencer.on_timer_compare(&mut surface); // assert channel 0

        sequencer.emergency_stop(&bank, &mut surface);
        sequencer.emergency_stop(&bank, &mut surface);

        assert_eq!(sequencer.step(), FiringStep::Idle);
        assert!(!surface.timer_running());
        for channel in 0..3 {
            assert!(!surface.gate(channel));
            assert!(!bank.command(channel).fires());
        }
    }

    #[test]
    fn firing_plan_reports_cumulative_offsets() {
        let (bank, sequencer, _) = fixture(2);
        bank.set_power(0, 100);
        bank.set_power(1, 100);
        let plan = sequencer.firing_plan(&bank);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].start_ticks, 5_000);
        // Second delay is measured from the end of the first pulse.
        assert_eq!(plan[1].start_ticks, 5_000 + 500 + 5_000);
        assert!(plan[0].asserts && plan[1].asserts);
    }
}
