//! Hardware adapter: bridges real GPIO and the system timer to
//! [`HardwarePort`].
//!
//! - **`target_os = "espidf"`**: raw GPIO via [`hw_init`], ticks from
//!   `esp_timer_get_time()`, delays yield to FreeRTOS.
//! - **`not(target_os = "espidf")`**: GPIO calls are the `hw_init`
//!   stubs and time comes from `std::time::Instant`, so the binary's
//!   wiring can be exercised on the host.
//!
//! This is the only adapter that touches pins directly.

use crate::app::ports::HardwarePort;
use crate::drivers::hw_init;

pub struct EspHardware {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for EspHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl EspHardware {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a read of the high-resolution timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl HardwarePort for EspHardware {
    fn read_pin(&mut self, pin: i32) -> bool {
        hw_init::gpio_read(pin)
    }

    fn write_pin(&mut self, pin: i32, high: bool) {
        hw_init::gpio_write(pin, high);
    }

    /// Truncation to `u32` is the intended wrap (~49.7 days).
    fn now_ms(&self) -> u32 {
        (self.uptime_us() / 1000) as u32
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
