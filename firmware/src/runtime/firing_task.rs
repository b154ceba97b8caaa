//! Async realization of the zero-cross-synchronized firing loop.
//!
//! The hardware design drives the sequencer from two interrupt sources: the
//! zero-cross edge and the compare timer. Here both become awaited events in
//! one task, which preserves the shared-state discipline by construction:
//! only this task ever touches the sequencer and the gate driver, while the
//! sample task reaches the atomic channel bank alone.

use defmt::warn;
use embassy_futures::select::{Either, Either3, select, select3};
use embassy_time::Timer;

use crate::control::{ChannelBank, FiringSequencer, ticks_to_duration};
use crate::hw::GateDriver;

#[embassy_executor::task]
pub async fn run(
    bank: &'static ChannelBank,
    mut sequencer: FiringSequencer,
    mut driver: GateDriver<'static>,
) -> ! {
    let ticks_per_us = sequencer.config().ticks_per_us;

    loop {
        // Idle until the next zero-cross arms a cycle or a stop arrives.
        match select(super::ZERO_CROSS.wait(), super::STOP.wait()).await {
            Either::First(()) => {
                if super::STOP_LATCH.is_engaged() {
                    continue;
                }
                sequencer.on_zero_cross(bank, &mut driver);
            }
            Either::Second(()) => {
                engage_stop(&mut sequencer, bank, &mut driver);
                continue;
            }
        }

        // Step the compare chain. A fresh zero-cross preempts the armed
        // wait and resynchronizes unconditionally; stop always wins.
        while let Some(ticks) = driver.take_armed() {
            let compare = Timer::after(ticks_to_duration(ticks, ticks_per_us));
            match select3(compare, super::ZERO_CROSS.wait(), super::STOP.wait()).await {
                Either3::First(()) => sequencer.on_timer_compare(&mut driver),
                Either3::Second(()) => sequencer.on_zero_cross(bank, &mut driver),
                Either3::Third(()) => engage_stop(&mut sequencer, bank, &mut driver),
            }
        }
    }
}

fn engage_stop(
    sequencer: &mut FiringSequencer,
    bank: &ChannelBank,
    driver: &mut GateDriver<'_>,
) {
    sequencer.emergency_stop(bank, driver);
    super::STOP_LATCH.engage();
    warn!("emergency stop: all gates released, firing halted");
}
