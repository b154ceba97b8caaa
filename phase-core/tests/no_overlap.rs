//! Pulse ordering and separation across channels.

use phase_core::channel::ChannelBank;
use phase_core::config::{LineFrequency, PhaseConfig};
use phase_core::sequencer::FiringSequencer;
use phase_core::sim::{RecordingSurface, SurfaceEvent};

fn fixture(channels: usize) -> (ChannelBank, FiringSequencer, RecordingSurface) {
    let config = PhaseConfig::new(LineFrequency::Hz60, channels);
    (
        ChannelBank::new(config),
        FiringSequencer::new(config),
        RecordingSurface::new(),
    )
}

/// Observed pulse intervals as (channel, high_at, low_at) tuples, in the
/// order the edges occurred.
fn observed_pulses(surface: &RecordingSurface) -> Vec<(usize, u64, u64)> {
    let mut pulses = Vec::new();
    let mut open: Option<(usize, u64)> = None;
    for timed in surface.events() {
        if let SurfaceEvent::Gate { channel, asserted } = timed.event {
            if asserted {
                assert!(open.is_none(), "overlapping gate assertion");
                open = Some((channel, timed.at_ticks));
            } else if let Some((open_channel, high_at)) = open.take() {
                assert_eq!(open_channel, channel, "interleaved gate pulses");
                pulses.push((channel, high_at, timed.at_ticks));
            }
        }
    }
    assert!(open.is_none(), "pulse left open at end of cycle");
    pulses
}

fn run_cycle(sequencer: &mut FiringSequencer, bank: &ChannelBank, surface: &mut RecordingSurface) {
    sequencer.on_zero_cross(bank, surface);
    while surface.fire_compare() {
        sequencer.on_timer_compare(surface);
    }
}

#[test]
fn three_channel_pulses_are_ordered_and_disjoint() {
    let (bank, mut sequencer, mut surface) = fixture(3);
    bank.set_power(0, 100);
    bank.set_power(1, 50);
    bank.set_power(2, 25);

    run_cycle(&mut sequencer, &bank, &mut surface);
    let pulses = observed_pulses(&surface);
    assert_eq!(pulses.len(), 3);

    for window in pulses.windows(2) {
        let (earlier_channel, _, earlier_low) = window[0];
        let (later_channel, later_high, _) = window[1];
        assert!(earlier_channel < later_channel, "channel order violated");
        assert!(earlier_low <= later_high, "pulse intervals intersect");
    }
}

#[test]
fn equal_powers_still_fire_sequentially() {
    let (bank, mut sequencer, mut surface) = fixture(3);
    for channel in 0..3 {
        bank.set_power(channel, 100);
    }

    run_cycle(&mut sequencer, &bank, &mut surface);
    let pulses = observed_pulses(&surface);
    assert_eq!(
        pulses.iter().map(|p| p.0).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    // Each pulse starts a full firing delay after the previous one ended.
    for window in pulses.windows(2) {
        assert_eq!(window[1].1 - window[0].2, 5_000);
    }
}

#[test]
fn firing_plan_matches_the_simulated_timeline() {
    let (bank, mut sequencer, mut surface) = fixture(3);
    bank.set_power(0, 100);
    bank.set_power(1, 50);
    bank.set_power(2, 25);

    let plan = sequencer.firing_plan(&bank);
    let zero_cross_at = surface.now_ticks();
    run_cycle(&mut sequencer, &bank, &mut surface);
    let pulses = observed_pulses(&surface);

    for (planned, (channel, high_at, low_at)) in plan.iter().zip(&pulses) {
        assert!(planned.asserts);
        assert_eq!(planned.channel, *channel);
        assert_eq!(u64::from(planned.start_ticks), high_at - zero_cross_at);
        assert_eq!(u64::from(planned.width_ticks), low_at - high_at);
    }
}
