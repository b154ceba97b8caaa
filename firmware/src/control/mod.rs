//! Control surface bridging firmware tasks with `phase-core`.
//!
//! Holds the executor-facing type aliases and shared primitives that are
//! portable across the MCU target and host builds: the zero-cross and
//! emergency-stop signaling types, the latched stop flag, and tick/duration
//! conversion helpers used by the async firing loop.

#![allow(dead_code)]

use embassy_sync::signal::Signal;
#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_time::Duration;
use portable_atomic::{AtomicBool, Ordering};

pub use phase_core::channel::ChannelBank;
pub use phase_core::config::{LineFrequency, PhaseConfig};
pub use phase_core::sequencer::FiringSequencer;

#[cfg(target_os = "none")]
type ControlMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type ControlMutex = NoopRawMutex;

/// Signal raised by the zero-cross detector for every AC edge.
pub type ZeroCrossSignal = Signal<ControlMutex, ()>;

/// Signal raised when the emergency-stop input asserts.
pub type StopSignal = Signal<ControlMutex, ()>;

/// Interval between control-input samples in the background context.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(10);

/// Latched emergency-stop state.
///
/// Once set, the firing task refuses to arm new cycles until the latch is
/// cleared; clearing requires an explicit operator action, not just the
/// fault input releasing.
pub struct StopLatch {
    engaged: AtomicBool,
}

impl StopLatch {
    pub const fn new() -> Self {
        Self {
            engaged: AtomicBool::new(false),
        }
    }

    pub fn engage(&self) {
        self.engaged.store(true, Ordering::Release);
    }

    pub fn release(&self) {
        self.engaged.store(false, Ordering::Release);
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::Acquire)
    }
}

/// Samples averaged per control reading.
pub const SMOOTHING_WINDOW: usize = 4;

/// Running average over the most recent control samples.
///
/// The joystick pot picks up switching noise from the gate drive; a short
/// window keeps the commanded power stable at rest without adding
/// noticeable control lag at the 100 Hz sample rate.
pub struct SampleSmoother {
    window: heapless::HistoryBuf<u16, SMOOTHING_WINDOW>,
}

impl SampleSmoother {
    pub fn new() -> Self {
        Self {
            window: heapless::HistoryBuf::new(),
        }
    }

    /// Records a sample and returns the current window average.
    pub fn push(&mut self, sample: u16) -> u16 {
        self.window.write(sample);
        let sum: u32 = self.window.oldest_ordered().map(|s| u32::from(*s)).sum();
        (sum / self.window.len() as u32) as u16
    }
}

impl Default for SampleSmoother {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a compare-timer tick count into an executor duration.
///
/// Rounds up so an awaited compare never lands early.
pub fn ticks_to_duration(ticks: u32, ticks_per_us: u32) -> Duration {
    let micros = u64::from(ticks.div_ceil(ticks_per_us));
    Duration::from_micros(micros)
}
