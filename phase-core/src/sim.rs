//! Simulated hardware surface for host-side tests and the emulator.
//!
//! [`RecordingSurface`] models the periodic-interrupt compare timer of the
//! real hardware over a virtual tick clock: the counter origin wraps to the
//! instant of each delivered compare match, and every gate or timer action
//! is recorded with its absolute tick timestamp. Test code arms the machine
//! through the normal sequencer entry points and then pumps compare events
//! with [`fire_compare`](RecordingSurface::fire_compare).

use heapless::Vec;

use crate::sequencer::TriacSurface;

/// Upper bound on recorded events; drain with
/// [`take_events`](RecordingSurface::take_events) between simulated cycles.
pub const EVENT_CAPACITY: usize = 64;

/// One observable hardware action.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SurfaceEvent {
    Gate { channel: usize, asserted: bool },
    TimerStarted,
    TimerStopped,
}

/// A [`SurfaceEvent`] stamped with the virtual time it occurred at.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimedEvent {
    /// Absolute virtual time in timer ticks.
    pub at_ticks: u64,
    pub event: SurfaceEvent,
}

/// Virtual-time implementation of [`TriacSurface`].
pub struct RecordingSurface {
    now: u64,
    counter_origin: u64,
    armed: Option<u32>,
    running: bool,
    gates: [bool; crate::config::MAX_TRIAC_CHANNELS],
    events: Vec<TimedEvent, EVENT_CAPACITY>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            now: 0,
            counter_origin: 0,
            armed: None,
            running: false,
            gates: [false; crate::config::MAX_TRIAC_CHANNELS],
            events: Vec::new(),
        }
    }

    /// Current virtual time in ticks.
    pub const fn now_ticks(&self) -> u64 {
        self.now
    }

    /// Moves virtual time forward without delivering a compare event.
    ///
    /// Used to model a zero-cross edge arriving mid-cycle.
    pub fn advance(&mut self, ticks: u64) {
        self.now += ticks;
    }

    /// Absolute deadline of the armed compare event, if the timer is running.
    pub fn next_compare_at(&self) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.armed
            .map(|ticks| self.counter_origin + u64::from(ticks))
    }

    /// Delivers the armed compare event: jumps virtual time to the deadline
    /// and wraps the counter origin there, mirroring the hardware timer.
    ///
    /// Returns `false` when nothing is armed or the timer is stopped; the
    /// caller then knows the cycle has run to completion.
    pub fn fire_compare(&mut self) -> bool {
        let Some(deadline) = self.next_compare_at() else {
            return false;
        };
        self.armed = None;
        self.now = deadline;
        self.counter_origin = deadline;
        true
    }

    /// Current level of one gate line.
    pub fn gate(&self, channel: usize) -> bool {
        self.gates.get(channel).copied().unwrap_or(false)
    }

    /// Whether the compare timer is running.
    pub const fn timer_running(&self) -> bool {
        self.running
    }

    /// Recorded events since the last drain.
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Drains and returns the recorded events.
    pub fn take_events(&mut self) -> Vec<TimedEvent, EVENT_CAPACITY> {
        core::mem::take(&mut self.events)
    }

    fn record(&mut self, event: SurfaceEvent) {
        let pushed = self.events.push(TimedEvent {
            at_ticks: self.now,
            event,
        });
        debug_assert!(pushed.is_ok(), "event log overflow, drain between cycles");
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TriacSurface for RecordingSurface {
    fn set_gate(&mut self, channel: usize, asserted: bool) {
        if let Some(gate) = self.gates.get_mut(channel) {
            // Record edges only; redundant writes are not observable.
            if *gate != asserted {
                *gate = asserted;
                self.record(SurfaceEvent::Gate { channel, asserted });
            }
        }
    }

    fn arm_compare(&mut self, ticks: u32) {
        self.armed = Some(ticks);
    }

    fn reset_counter(&mut self) {
        self.counter_origin = self.now;
    }

    fn start_timer(&mut self) {
        if !self.running {
            self.running = true;
            self.record(SurfaceEvent::TimerStarted);
        }
    }

    fn stop_timer(&mut self) {
        if self.running {
            self.running = false;
            self.record(SurfaceEvent::TimerStopped);
        }
    }
}
