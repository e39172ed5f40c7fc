//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the feeder: the poll-cycle
//! orchestration, the console command set, and the events the core emits.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
