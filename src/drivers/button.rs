//! Polled, debounced button driver with press, long-press and auto-repeat.
//!
//! ## Hardware
//!
//! Four active-low momentary switches on internal pull-ups.  No ISR: the
//! main loop samples every pin once per cycle through
//! [`HardwarePort::read_pin`] and feeds the level into [`ButtonChannel::poll`].
//!
//! ## Per-channel state machine
//!
//! ```text
//!            press (≥ debounce since release)
//!  Released ───────────────────────────────▶ Pressed
//!     ▲                                         │ held > long_press
//!     │ release (≥ debounce since press)        ▼
//!     ├────────────────────────────────── LongPressed
//!     │                                         │ first repeat tick
//!     │                                         ▼
//!     └────────────────────────────────── Repeating
//! ```
//!
//! | Query              | Kind                | Fires                         |
//! |--------------------|---------------------|-------------------------------|
//! | `take_press`       | read-and-clear      | once per accepted press       |
//! | `take_long_press`  | read-and-clear      | once per hold past threshold  |
//! | `is_repeating`     | read-and-advance    | every `repeat_ms` while held  |
//! | `is_pressed`       | level               | any number of times           |

use log::debug;

use crate::app::ports::HardwarePort;
use crate::config::SystemConfig;

/// Logical buttons, in panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ButtonId {
    Select = 0,
    Up = 1,
    Down = 2,
    Confirm = 3,
}

impl ButtonId {
    pub const COUNT: usize = 4;
    pub const ALL: [Self; Self::COUNT] = [Self::Select, Self::Up, Self::Down, Self::Confirm];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Confirm => "CONFIRM",
        }
    }
}

/// Debounce / long-press / repeat thresholds in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTiming {
    pub debounce_ms: u32,
    pub long_press_ms: u32,
    pub repeat_ms: u32,
}

impl ButtonTiming {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            debounce_ms: config.debounce_ms,
            long_press_ms: config.long_press_ms,
            repeat_ms: config.repeat_ms,
        }
    }
}

impl Default for ButtonTiming {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

/// Debounced state of one channel.  Timestamps are wrapping `u32` ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// `since` is the last accepted release; `None` until the first one.
    Released { since: Option<u32> },
    Pressed { since: u32 },
    /// Long press fired; repeat armed from `last_tick`.
    LongPressed { since: u32, last_tick: u32 },
    /// At least one repeat tick delivered.
    Repeating { since: u32, last_tick: u32 },
}

// ---------------------------------------------------------------------------
// Single channel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ButtonChannel {
    id: ButtonId,
    timing: ButtonTiming,
    state: ButtonState,
    press_latched: bool,
    long_latched: bool,
}

impl ButtonChannel {
    pub fn new(id: ButtonId, timing: ButtonTiming) -> Self {
        Self {
            id,
            timing,
            state: ButtonState::Released { since: None },
            press_latched: false,
            long_latched: false,
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Advance the state machine with the raw (already polarity-corrected)
    /// switch level.
    pub fn poll(&mut self, raw_pressed: bool, now: u32) {
        let t = self.timing;
        match self.state {
            ButtonState::Released { since } => {
                let settled = since.is_none_or(|r| now.wrapping_sub(r) >= t.debounce_ms);
                if raw_pressed && settled {
                    self.state = ButtonState::Pressed { since: now };
                    self.press_latched = true;
                    debug!("button {}: pressed", self.id.name());
                }
            }
            ButtonState::Pressed { since } => {
                let held = now.wrapping_sub(since);
                if !raw_pressed {
                    if held >= t.debounce_ms {
                        self.release(now);
                    }
                } else if held > t.long_press_ms {
                    self.state = ButtonState::LongPressed {
                        since,
                        last_tick: now,
                    };
                    self.long_latched = true;
                    debug!("button {}: long press", self.id.name());
                }
            }
            ButtonState::LongPressed { since, .. } | ButtonState::Repeating { since, .. } => {
                if !raw_pressed && now.wrapping_sub(since) >= t.debounce_ms {
                    self.release(now);
                }
            }
        }
    }

    fn release(&mut self, now: u32) {
        // A pending press survives so a short tap still yields it; the
        // long-press edge belongs to this hold only.
        self.long_latched = false;
        self.state = ButtonState::Released { since: Some(now) };
        debug!("button {}: released", self.id.name());
    }

    /// One-shot press edge.
    pub fn take_press(&mut self) -> bool {
        core::mem::take(&mut self.press_latched)
    }

    /// One-shot long-press edge.
    pub fn take_long_press(&mut self) -> bool {
        core::mem::take(&mut self.long_latched)
    }

    pub fn is_pressed(&self) -> bool {
        !matches!(self.state, ButtonState::Released { .. })
    }

    /// Repeat tick: true once more than `repeat_ms` has passed since the
    /// last tick, while held past the long-press threshold.  Each true
    /// return restarts the interval.
    pub fn is_repeating(&mut self, now: u32) -> bool {
        match self.state {
            ButtonState::LongPressed { since, last_tick }
            | ButtonState::Repeating { since, last_tick }
                if now.wrapping_sub(last_tick) > self.timing.repeat_ms =>
            {
                self.state = ButtonState::Repeating {
                    since,
                    last_tick: now,
                };
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-cycle edge snapshot
// ---------------------------------------------------------------------------

/// Every edge of every button taken in one cycle.
///
/// Draining all latches once per cycle keeps the navigator the single
/// consumer and stops an unread edge leaking into a later screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonEdges {
    pub pressed: [bool; ButtonId::COUNT],
    pub long_pressed: [bool; ButtonId::COUNT],
    pub repeated: [bool; ButtonId::COUNT],
}

impl ButtonEdges {
    pub fn tapped(&self, id: ButtonId) -> bool {
        self.pressed[id as usize]
    }

    pub fn long(&self, id: ButtonId) -> bool {
        self.long_pressed[id as usize]
    }

    /// Press or auto-repeat: one value step.
    pub fn stepped(&self, id: ButtonId) -> bool {
        self.pressed[id as usize] || self.repeated[id as usize]
    }

    pub fn any(&self) -> bool {
        self.pressed
            .iter()
            .chain(&self.long_pressed)
            .chain(&self.repeated)
            .any(|&e| e)
    }

    /// Builder used by tests and the console.
    #[must_use]
    pub fn with_tap(mut self, id: ButtonId) -> Self {
        self.pressed[id as usize] = true;
        self
    }

    #[must_use]
    pub fn with_long(mut self, id: ButtonId) -> Self {
        self.long_pressed[id as usize] = true;
        self
    }

    #[must_use]
    pub fn with_repeat(mut self, id: ButtonId) -> Self {
        self.repeated[id as usize] = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Bank of four
// ---------------------------------------------------------------------------

pub struct ButtonBank {
    channels: [ButtonChannel; ButtonId::COUNT],
    pins: [i32; ButtonId::COUNT],
    active_low: bool,
}

impl ButtonBank {
    pub fn new(timing: ButtonTiming, pins: [i32; ButtonId::COUNT], active_low: bool) -> Self {
        Self {
            channels: ButtonId::ALL.map(|id| ButtonChannel::new(id, timing)),
            pins,
            active_low,
        }
    }

    /// Sample every pin and advance every channel.
    pub fn poll(&mut self, hw: &mut impl HardwarePort, now: u32) {
        for (channel, &pin) in self.channels.iter_mut().zip(&self.pins) {
            let pressed = hw.read_pin(pin) != self.active_low;
            channel.poll(pressed, now);
        }
    }

    /// Take every latch and repeat tick for this cycle.
    pub fn drain(&mut self, now: u32) -> ButtonEdges {
        let mut edges = ButtonEdges::default();
        for (i, channel) in self.channels.iter_mut().enumerate() {
            edges.pressed[i] = channel.take_press();
            edges.long_pressed[i] = channel.take_long_press();
            edges.repeated[i] = channel.is_repeating(now);
        }
        edges
    }

    pub fn channel(&self, id: ButtonId) -> &ButtonChannel {
        &self.channels[id as usize]
    }

    // ── Index-based queries (out of range reads as released) ─────

    pub fn is_pressed(&self, idx: usize) -> bool {
        self.channels.get(idx).is_some_and(ButtonChannel::is_pressed)
    }

    pub fn take_press(&mut self, idx: usize) -> bool {
        self.channels.get_mut(idx).is_some_and(ButtonChannel::take_press)
    }

    pub fn take_long_press(&mut self, idx: usize) -> bool {
        self.channels
            .get_mut(idx)
            .is_some_and(ButtonChannel::take_long_press)
    }

    pub fn is_repeating(&mut self, idx: usize, now: u32) -> bool {
        self.channels
            .get_mut(idx)
            .is_some_and(|c| c.is_repeating(now))
    }
}
