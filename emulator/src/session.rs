//! Interactive emulator session around the shared firing engine.
//!
//! The session owns a channel bank, a firing sequencer, and the recording
//! surface from `phase-core`, and replays AC half-cycles against them on
//! request. Compare events are delivered up to the end of the simulated
//! half-cycle only; anything armed beyond that point is clipped by the next
//! zero-cross, exactly as on hardware.

use phase_core::channel::ChannelBank;
use phase_core::config::{ControlConfig, LineFrequency, PhaseConfig};
use phase_core::mapper::power_from_sample;
use phase_core::sequencer::{FiringSequencer, FiringStep};
use phase_core::sim::{RecordingSurface, SurfaceEvent};

const HELP_LINES: &[&str] = &[
    "power <ch> <pct>   - commit a power percentage for one channel",
    "joystick <sample>  - map a raw 0-1023 sample and broadcast it",
    "cycle [n]          - simulate n AC half-cycles (default 1)",
    "plan               - show the pulse timeline the committed state implies",
    "status             - show committed powers and the sequencer step",
    "stop               - emergency stop: all gates low, powers zeroed",
    "help               - this text",
    "exit               - quit the emulator",
];

pub struct Session {
    bank: ChannelBank,
    sequencer: FiringSequencer,
    surface: RecordingSurface,
    control: ControlConfig,
    cycle_index: u64,
}

impl Session {
    pub fn new(line: LineFrequency, channels: usize) -> Self {
        let config = PhaseConfig::new(line, channels);
        Self {
            bank: ChannelBank::new(config),
            sequencer: FiringSequencer::new(config),
            surface: RecordingSurface::new(),
            control: ControlConfig::DEFAULT,
            cycle_index: 0,
        }
    }

    pub fn handle_command(&mut self, input: &str) -> Vec<String> {
        let mut parts = input.split_whitespace();
        let Some(command) = parts.next() else {
            return Vec::new();
        };
        let args: Vec<&str> = parts.collect();

        match command.to_ascii_lowercase().as_str() {
            "help" => HELP_LINES.iter().map(ToString::to_string).collect(),
            "status" => self.status(),
            "plan" => self.plan(),
            "power" => self.power(&args),
            "joystick" => self.joystick(&args),
            "cycle" => self.cycle(&args),
            "stop" => self.stop(),
            other => vec![format!("unknown command `{other}`; try `help`")],
        }
    }

    fn status(&self) -> Vec<String> {
        let config = self.sequencer.config();
        let mut lines = vec![format!(
            "mains half-cycle {} us, {} channels, step {:?}",
            config.half_cycle_us,
            config.channels(),
            self.sequencer.step()
        )];
        for channel in 0..config.channels() {
            let command = self.bank.command(channel);
            lines.push(format!(
                "  channel {}: {:>3} % power, delay {} us",
                channel,
                command.power,
                command.delay_ticks / config.ticks_per_us
            ));
        }
        lines
    }

    fn plan(&self) -> Vec<String> {
        let ticks_per_us = self.sequencer.config().ticks_per_us;
        self.sequencer
            .firing_plan(&self.bank)
            .iter()
            .map(|pulse| {
                let start_us = pulse.start_ticks / ticks_per_us;
                let width_us = pulse.width_ticks / ticks_per_us;
                if pulse.asserts {
                    format!(
                        "  channel {}: gate high at +{start_us} us for {width_us} us",
                        pulse.channel
                    )
                } else {
                    format!(
                        "  channel {}: parked at +{start_us} us, no assertion",
                        pulse.channel
                    )
                }
            })
            .collect()
    }

    fn power(&mut self, args: &[&str]) -> Vec<String> {
        let (Some(channel), Some(percent)) = (args.first(), args.get(1)) else {
            return vec!["usage: power <ch> <pct>".to_string()];
        };
        let Ok(channel) = channel.parse::<usize>() else {
            return vec![format!("invalid channel `{channel}`")];
        };
        let Ok(percent) = percent.parse::<u8>() else {
            return vec![format!("invalid power `{percent}`")];
        };
        if !self.sequencer.config().has_channel(channel) {
            return vec![format!(
                "channel {channel} outside 0..{}; ignored",
                self.sequencer.config().channels()
            )];
        }
        self.bank.set_power(channel, percent);
        let command = self.bank.command(channel);
        vec![format!(
            "channel {channel} committed: {} % power, delay {} us",
            command.power,
            command.delay_ticks / self.sequencer.config().ticks_per_us
        )]
    }

    fn joystick(&mut self, args: &[&str]) -> Vec<String> {
        let Some(sample) = args.first() else {
            return vec!["usage: joystick <sample>".to_string()];
        };
        let Ok(sample) = sample.parse::<u16>() else {
            return vec![format!("invalid sample `{sample}`")];
        };
        let power = power_from_sample(sample, &self.control);
        for channel in 0..self.sequencer.config().channels() {
            self.bank.set_power(channel, power);
        }
        vec![format!("sample {sample} -> {power} % power on all channels")]
    }

    fn cycle(&mut self, args: &[&str]) -> Vec<String> {
        let count = match args.first() {
            None => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(count) if (1..=100).contains(&count) => count,
                _ => return vec![format!("invalid cycle count `{}`", args[0])],
            },
        };

        let mut lines = Vec::new();
        for _ in 0..count {
            lines.extend(self.run_half_cycle());
        }
        lines
    }

    fn run_half_cycle(&mut self) -> Vec<String> {
        let config = *self.sequencer.config();
        let half_cycle_ticks = u64::from(config.half_cycle_us * config.ticks_per_us);

        self.cycle_index += 1;
        let zero_cross_at = self.surface.now_ticks();
        let cycle_end = zero_cross_at + half_cycle_ticks;

        self.sequencer.on_zero_cross(&self.bank, &mut self.surface);
        while let Some(deadline) = self.surface.next_compare_at() {
            // Events armed past the half-cycle are clipped by the next edge.
            if deadline > cycle_end {
                break;
            }
            self.surface.fire_compare();
            self.sequencer.on_timer_compare(&mut self.surface);
        }
        let now = self.surface.now_ticks();
        if now < cycle_end {
            self.surface.advance(cycle_end - now);
        }

        let mut lines = vec![format!("cycle {}:", self.cycle_index)];
        let mut gate_seen = false;
        for timed in self.surface.take_events() {
            let offset_us = (timed.at_ticks - zero_cross_at) / u64::from(config.ticks_per_us);
            match timed.event {
                SurfaceEvent::Gate { channel, asserted } => {
                    gate_seen = true;
                    let edge = if asserted { "high" } else { "low" };
                    lines.push(format!("  +{offset_us} us: channel {channel} gate {edge}"));
                }
                SurfaceEvent::TimerStarted | SurfaceEvent::TimerStopped => {}
            }
        }
        if !gate_seen {
            lines.push("  no gate activity".to_string());
        }
        if self.sequencer.step() != FiringStep::Idle {
            lines.push("  sequence still in flight; next zero-cross will resync".to_string());
        }
        lines
    }

    fn stop(&mut self) -> Vec<String> {
        self.sequencer.emergency_stop(&self.bank, &mut self.surface);
        // Drop the gate-release edges from the log; stop output is explicit.
        let _ = self.surface.take_events();
        vec!["emergency stop: gates low, powers zeroed, timer halted".to_string()]
    }
}
