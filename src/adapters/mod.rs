//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                       |
//! |------------|---------------|-----------------------------------|
//! | `hardware` | HardwarePort  | ESP32 GPIO, `esp_timer`           |
//! | `lcd_sink` | DisplaySink   | 20x4 HD44780 over I2C             |
//! | `log_sink` | EventSink     | Serial log output                 |
//! |            | DisplaySink   | Frame mirror at `debug`           |
//! | `console`  | (none)        | UART bytes → command lines        |
//! | `sim`      | HardwarePort  | In-memory pins for host runs      |
//!
//! The RTC clock adapter lives with its driver in
//! [`drivers::ds3231`](crate::drivers::ds3231); the software fallback is
//! [`clock::SoftClock`](crate::clock::SoftClock).

pub mod console;
pub mod hardware;
pub mod lcd_sink;
pub mod log_sink;
pub mod sim;
