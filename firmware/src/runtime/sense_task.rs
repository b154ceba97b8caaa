//! Edge-sensing tasks: zero-cross detection and the emergency-stop input.

use defmt::trace;
use embassy_stm32::exti::ExtiInput;

/// Forwards every zero-cross edge to the firing task.
///
/// The detector toggles on both AC edges, so each edge marks the start of
/// one half-cycle.
#[embassy_executor::task]
pub async fn zero_cross(mut input: ExtiInput<'static>) -> ! {
    loop {
        input.wait_for_any_edge().await;
        super::ZERO_CROSS.signal(());
    }
}

/// Raises the stop signal when the fault input pulls low.
///
/// The stop latch stays engaged afterwards; recovering requires a reset.
#[embassy_executor::task]
pub async fn fault(mut input: ExtiInput<'static>) -> ! {
    loop {
        input.wait_for_falling_edge().await;
        trace!("fault input asserted");
        super::STOP.signal(());
    }
}
