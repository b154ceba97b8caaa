//! Committed per-channel power and firing delay.
//!
//! A channel's commanded power and its derived delay form one logical unit:
//! the firing engine must never observe a power from one commit and a delay
//! from another. The pair is therefore packed into a single 32-bit word and
//! stored through one atomic slot per channel, so the background context can
//! rewrite it at any moment without the zero-cross or compare handlers ever
//! seeing a torn value.

use portable_atomic::{AtomicU32, Ordering};

use crate::config::{MAX_TRIAC_CHANNELS, PhaseConfig};
use crate::delay::firing_delay;

/// Committed state of one triac channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelCommand {
    /// Commanded power percentage, `0..=100`.
    pub power: u8,
    /// Firing delay derived from `power`, in compare-timer ticks.
    pub delay_ticks: u32,
}

impl ChannelCommand {
    /// The all-off command: zero power, delay parked at the packed maximum.
    pub const OFF: Self = Self {
        power: 0,
        delay_ticks: TICKS_MASK,
    };

    /// Returns `true` when this command will assert the gate.
    pub const fn fires(&self) -> bool {
        self.power > 0
    }
}

// Power lives in the top byte, ticks in the low 24 bits. The longest delay
// (10 ms at 10 ticks/us) needs 100_000 ticks, well inside 24 bits.
const TICKS_MASK: u32 = 0x00ff_ffff;

const fn pack(command: ChannelCommand) -> u32 {
    ((command.power as u32) << 24) | (command.delay_ticks & TICKS_MASK)
}

const fn unpack(word: u32) -> ChannelCommand {
    ChannelCommand {
        power: (word >> 24) as u8,
        delay_ticks: word & TICKS_MASK,
    }
}

/// Atomic slots holding the committed command for every channel.
///
/// One writer context calls [`set_power`](ChannelBank::set_power) and
/// [`clear_all`](ChannelBank::clear_all); the firing context reads with
/// [`command`](ChannelBank::command) when a zero-cross latches the cycle.
pub struct ChannelBank {
    config: PhaseConfig,
    slots: [AtomicU32; MAX_TRIAC_CHANNELS],
}

impl ChannelBank {
    /// Creates a bank with every channel committed to the all-off command.
    pub const fn new(config: PhaseConfig) -> Self {
        Self {
            config,
            slots: [const { AtomicU32::new(pack(ChannelCommand::OFF)) }; MAX_TRIAC_CHANNELS],
        }
    }

    /// Returns the timing configuration the bank commits against.
    pub const fn config(&self) -> &PhaseConfig {
        &self.config
    }

    /// Commits a power percentage for one channel.
    ///
    /// Clamps `percent` to `0..=100`, recomputes the firing delay, and stores
    /// the (power, delay) pair in one atomic word. A channel index outside
    /// the configured count is a defined no-op. Idempotent: recommitting the
    /// same power yields the same stored word.
    pub fn set_power(&self, channel: usize, percent: u8) {
        if !self.config.has_channel(channel) {
            return;
        }
        let power = percent.min(100);
        let command = ChannelCommand {
            power,
            delay_ticks: firing_delay(power, &self.config).ticks,
        };
        self.slots[channel].store(pack(command), Ordering::Release);
    }

    /// Reads the committed command for one channel.
    ///
    /// A channel index outside the configured count reads as all-off.
    pub fn command(&self, channel: usize) -> ChannelCommand {
        if !self.config.has_channel(channel) {
            return ChannelCommand::OFF;
        }
        unpack(self.slots[channel].load(Ordering::Acquire))
    }

    /// Zeroes every channel so the next half-cycle fires nothing.
    pub fn clear_all(&self) {
        for channel in 0..self.config.channels() {
            self.set_power(channel, 0);
        }
    }
}
