//! Fail-safe behavior when a zero-cross edge preempts an unfinished cycle.

use phase_core::channel::ChannelBank;
use phase_core::config::{LineFrequency, PhaseConfig};
use phase_core::sequencer::{FiringSequencer, FiringStep};
use phase_core::sim::{RecordingSurface, SurfaceEvent};

fn fixture(channels: usize) -> (ChannelBank, FiringSequencer, RecordingSurface) {
    let config = PhaseConfig::new(LineFrequency::Hz60, channels);
    (
        ChannelBank::new(config),
        FiringSequencer::new(config),
        RecordingSurface::new(),
    )
}

fn assertions_for(surface: &RecordingSurface, channel: usize) -> usize {
    surface
        .events()
        .iter()
        .filter(|timed| {
            matches!(
                timed.event,
                SurfaceEvent::Gate {
                    channel: ch,
                    asserted: true,
                } if ch == channel
            )
        })
        .count()
}

#[test]
fn zero_cross_mid_pulse_sacrifices_the_straggler() {
    let (bank, mut sequencer, mut surface) = fixture(2);
    bank.set_power(0, 100);
    bank.set_power(1, 100);

    sequencer.on_zero_cross(&bank, &mut surface);
    assert!(surface.fire_compare());
    sequencer.on_timer_compare(&mut surface); // Fire(0): gate 0 goes high
    assert!(surface.gate(0));
    assert_eq!(sequencer.step(), FiringStep::Hold(0));

    // The next edge arrives before the pulse ends (starved compare).
    surface.advance(100);
    sequencer.on_zero_cross(&bank, &mut surface);

    assert!(!surface.gate(0), "interrupted pulse must be released");
    assert_eq!(sequencer.step(), FiringStep::Fire(0));
    assert!(surface.timer_running());
}

#[test]
fn resynced_cycle_never_double_fires_a_channel() {
    let (bank, mut sequencer, mut surface) = fixture(2);
    bank.set_power(0, 100);
    bank.set_power(1, 100);

    // Run the first cycle only as far as channel 0's pulse.
    sequencer.on_zero_cross(&bank, &mut surface);
    assert!(surface.fire_compare());
    sequencer.on_timer_compare(&mut surface);
    assert_eq!(assertions_for(&surface, 0), 1);

    // Preempt, then let the new cycle run to completion.
    surface.advance(1_000);
    sequencer.on_zero_cross(&bank, &mut surface);
    while surface.fire_compare() {
        sequencer.on_timer_compare(&mut surface);
    }

    // One assertion per cycle reached, none carried over from the
    // interrupted one.
    assert_eq!(assertions_for(&surface, 0), 2);
    assert_eq!(assertions_for(&surface, 1), 1);
    assert_eq!(sequencer.step(), FiringStep::Idle);
}

#[test]
fn preemption_works_from_every_active_state() {
    for events_before_preempt in 0..4 {
        let (bank, mut sequencer, mut surface) = fixture(2);
        bank.set_power(0, 80);
        bank.set_power(1, 80);

        sequencer.on_zero_cross(&bank, &mut surface);
        for _ in 0..events_before_preempt {
            assert!(surface.fire_compare());
            sequencer.on_timer_compare(&mut surface);
        }

        surface.advance(10);
        sequencer.on_zero_cross(&bank, &mut surface);
        assert_eq!(sequencer.step(), FiringStep::Fire(0));
        assert!(!surface.gate(0));
        assert!(!surface.gate(1));

        // The new cycle still runs cleanly to idle.
        while surface.fire_compare() {
            sequencer.on_timer_compare(&mut surface);
        }
        assert_eq!(sequencer.step(), FiringStep::Idle);
    }
}

#[test]
fn commits_landing_mid_cycle_take_effect_next_zero_cross() {
    let (bank, mut sequencer, mut surface) = fixture(1);
    bank.set_power(0, 100);

    sequencer.on_zero_cross(&bank, &mut surface);
    // The background context rewrites the channel while the cycle is armed.
    bank.set_power(0, 0);

    while surface.fire_compare() {
        sequencer.on_timer_compare(&mut surface);
    }
    // The latched command still fires this cycle.
    assert_eq!(assertions_for(&surface, 0), 1);

    // From the next zero-cross on, the zero-power commit holds.
    sequencer.on_zero_cross(&bank, &mut surface);
    while surface.fire_compare() {
        sequencer.on_timer_compare(&mut surface);
    }
    assert_eq!(assertions_for(&surface, 0), 1);
}
