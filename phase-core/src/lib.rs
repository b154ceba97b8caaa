#![no_std]

// Shared logic for the triac phase-angle controller.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library. Everything timing-critical lives here: the power
// mapper, the delay calculator, the committed per-channel state, and the
// zero-cross-synchronized firing state machine, all expressed against an
// abstract hardware surface so the same code drives real gate outputs on the
// MCU and a simulated timeline in tests and the emulator.

pub mod channel;
pub mod config;
pub mod delay;
pub mod mapper;
pub mod sequencer;
pub mod sim;
