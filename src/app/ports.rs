//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (GPIO, RTC, display, event log) implement these traits.
//! The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly and every
//! state machine can be driven from tests with a fake clock and fake pins.

use crate::clock::DateTime;
use crate::display::Paint;
use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Hardware port (GPIO + monotonic tick)
// ───────────────────────────────────────────────────────────────

/// Raw pin and tick access.
///
/// `now_ms` is a free-running millisecond counter that wraps at
/// `u32::MAX`; consumers only ever compute `now.wrapping_sub(then)`.
pub trait HardwarePort {
    /// Electrical level of an input pin (`true` = HIGH).
    fn read_pin(&mut self, pin: i32) -> bool;

    /// Drive an output pin.
    fn write_pin(&mut self, pin: i32, high: bool);

    /// Monotonic milliseconds since boot, wrapping.
    fn now_ms(&self) -> u32;

    /// Busy-wait.  Only the console test routines call this.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Clock port (RTC or software clock)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source.
pub trait ClockPort {
    /// Current date and time.  Never fails; a faulty source returns its
    /// last good reading.
    fn now(&mut self) -> DateTime;

    /// Set the clock.  Rejects dates outside the supported calendar with
    /// [`Error::InvalidDate`](crate::error::Error::InvalidDate).
    fn adjust(&mut self, dt: DateTime) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Display sink (domain → character display / log)
// ───────────────────────────────────────────────────────────────

/// Stateless paint requests.  The core makes no assumption about the
/// display technology behind it.
pub trait DisplaySink {
    fn paint(&mut self, paint: &Paint);
}

/// Fan a paint out to two sinks (e.g. LCD + log mirror).
impl<A: DisplaySink, B: DisplaySink> DisplaySink for (A, B) {
    fn paint(&mut self, paint: &Paint) {
        self.0.paint(paint);
        self.1.paint(paint);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
