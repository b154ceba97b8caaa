use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_sync::signal::Signal;
use static_cell::StaticCell;

use crate::control::{ChannelBank, FiringSequencer, LineFrequency, PhaseConfig, StopLatch,
    StopSignal, ZeroCrossSignal};
use crate::hw::adc::JoystickAdc;
use crate::hw::GateDriver;

mod firing_task;
mod sample_task;
mod sense_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Fired channels on this board: one triac per phase.
const CHANNELS: usize = 3;
/// Mains frequency the zero-cross detector is wired to.
const LINE: LineFrequency = LineFrequency::Hz60;

pub(crate) static ZERO_CROSS: ZeroCrossSignal = Signal::new();
pub(crate) static STOP: StopSignal = Signal::new();
pub(crate) static STOP_LATCH: StopLatch = StopLatch::new();
static BANK: StaticCell<ChannelBank> = StaticCell::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PB0,
        PB1,
        PB2,
        PC13,
        ADC1,
        EXTI1,
        EXTI13,
        ..
    } = hal::init(config);

    let phase_config = PhaseConfig::new(LINE, CHANNELS);
    let bank: &'static ChannelBank = BANK.init(ChannelBank::new(phase_config));
    let sequencer = FiringSequencer::new(phase_config);

    // Gates idle low; a floating line must never trigger a triac.
    let gate_driver = GateDriver::new([
        Output::new(PB0, Level::Low, Speed::Low),
        Output::new(PB1, Level::Low, Speed::Low),
        Output::new(PB2, Level::Low, Speed::Low),
    ]);

    let joystick = JoystickAdc::new(Adc::new(ADC1), PA0.degrade_adc());
    let zero_cross_input = ExtiInput::new(PA1, EXTI1, Pull::Up);
    let fault_input = ExtiInput::new(PC13, EXTI13, Pull::Up);

    info!(
        "phase controller up: {} channels, half cycle {} us",
        phase_config.channels(),
        phase_config.half_cycle_us
    );

    spawner
        .spawn(firing_task::run(bank, sequencer, gate_driver))
        .expect("failed to spawn firing task");
    spawner
        .spawn(sample_task::run(bank, joystick))
        .expect("failed to spawn sample task");
    spawner
        .spawn(sense_task::zero_cross(zero_cross_input))
        .expect("failed to spawn zero-cross task");
    spawner
        .spawn(sense_task::fault(fault_input))
        .expect("failed to spawn fault task");

    core::future::pending::<()>().await;
}
