//! Device drivers, hardware initialisation, and peripheral helpers.

pub mod button;
pub mod buzzer;
pub mod ds3231;
pub mod feeder;
pub mod hw_init;
pub mod lcd;
pub mod watchdog;
