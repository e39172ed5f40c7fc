//! FishFeeder firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod clock;
pub mod config;
pub mod display;
pub mod fsm;
pub mod safety;
pub mod scheduler;

pub mod error;
pub mod pins;

// Hardware-facing modules compile on the host too; the register-level
// pieces are stubbed out behind cfg attributes inside.
pub mod adapters;
pub mod drivers;
