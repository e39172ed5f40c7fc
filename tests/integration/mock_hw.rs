//! Mock adapters for integration tests.
//!
//! Records every output write, paint and event so tests can assert on
//! the full history without touching real GPIO or I2C.

use std::collections::HashMap;

use fishfeeder::app::events::AppEvent;
use fishfeeder::app::ports::{ClockPort, DisplaySink, EventSink, HardwarePort};
use fishfeeder::app::service::AppService;
use fishfeeder::clock::DateTime;
use fishfeeder::config::SystemConfig;
use fishfeeder::display::{self, Frame, Paint};
use fishfeeder::error::{Error, Result};
use fishfeeder::pins;

// ── MockHw ────────────────────────────────────────────────────

pub struct MockHw {
    pub now_ms: u32,
    inputs: HashMap<i32, bool>,
    outputs: HashMap<i32, bool>,
    pub writes: Vec<(i32, bool)>,
    pub delayed_ms: u32,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            writes: Vec::new(),
            delayed_ms: 0,
        }
    }

    /// Hold an active-low button down.
    pub fn hold(&mut self, pin: i32) {
        self.inputs.insert(pin, false);
    }

    pub fn let_go(&mut self, pin: i32) {
        self.inputs.insert(pin, true);
    }

    pub fn output(&self, pin: i32) -> bool {
        self.outputs.get(&pin).copied().unwrap_or(false)
    }

    pub fn relays_closed(&self) -> usize {
        pins::RELAY_GPIOS.iter().filter(|&&p| self.output(p)).count()
    }
}

impl Default for MockHw {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwarePort for MockHw {
    fn read_pin(&mut self, pin: i32) -> bool {
        self.inputs.get(&pin).copied().unwrap_or(true)
    }

    fn write_pin(&mut self, pin: i32, high: bool) {
        self.outputs.insert(pin, high);
        self.writes.push((pin, high));
    }

    fn now_ms(&self) -> u32 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(ms);
        self.delayed_ms += ms;
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Wall clock that only moves when the test advances it.
pub struct MockClock {
    pub now: DateTime,
    sub_ms: u32,
    pub adjusted: Vec<DateTime>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            now: DateTime {
                hour,
                minute,
                second,
                ..DateTime::DEFAULT
            },
            sub_ms: 0,
            adjusted: Vec::new(),
        }
    }

    pub fn advance_ms(&mut self, ms: u32) {
        let total = self.sub_ms + ms;
        self.now = self.now.add_seconds(total / 1000);
        self.sub_ms = total % 1000;
    }
}

impl ClockPort for MockClock {
    fn now(&mut self) -> DateTime {
        self.now
    }

    fn adjust(&mut self, dt: DateTime) -> Result<()> {
        if !dt.is_valid() {
            return Err(Error::InvalidDate);
        }
        self.now = dt;
        self.sub_ms = 0;
        self.adjusted.push(dt);
        Ok(())
    }
}

// ── RecordingDisplay ──────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    pub paints: Vec<Paint>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn last_frame(&self) -> Frame {
        self.paints.last().map(display::render).unwrap_or_default()
    }
}

impl DisplaySink for RecordingDisplay {
    fn paint(&mut self, paint: &Paint) {
        self.paints.push(*paint);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn saw(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Bench: service + mocks ────────────────────────────────────

pub const TICK_MS: u32 = 100;

pub struct Bench {
    pub app: AppService,
    pub hw: MockHw,
    pub clock: MockClock,
    pub display: RecordingDisplay,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Bench {
    pub fn at(hour: u8, minute: u8, second: u8) -> Self {
        Self::with_config(SystemConfig::default(), hour, minute, second)
    }

    pub fn with_config(config: SystemConfig, hour: u8, minute: u8, second: u8) -> Self {
        let mut bench = Self {
            app: AppService::new(config),
            hw: MockHw::new(),
            clock: MockClock::at(hour, minute, second),
            display: RecordingDisplay::default(),
            sink: RecordingSink::default(),
        };
        bench.app.start(
            &mut bench.hw,
            &mut bench.clock,
            &mut bench.display,
            &mut bench.sink,
        );
        bench
    }

    /// Run whole poll cycles covering `ms`.
    pub fn run_ms(&mut self, ms: u32) {
        for _ in 0..ms / TICK_MS {
            self.step(TICK_MS);
        }
    }

    /// Move both clocks by `ms`, then run one cycle.
    pub fn step(&mut self, ms: u32) {
        self.hw.now_ms = self.hw.now_ms.wrapping_add(ms);
        self.clock.advance_ms(ms);
        self.app
            .tick(&mut self.hw, &mut self.clock, &mut self.display, &mut self.sink);
    }

    /// Short press: down for one cycle, up, then let the debounce settle.
    pub fn tap(&mut self, pin: i32) {
        self.hw.hold(pin);
        self.run_ms(TICK_MS);
        self.hw.let_go(pin);
        self.run_ms(2 * TICK_MS);
    }

    /// Hold past the long-press threshold, then release.
    pub fn long_press(&mut self, pin: i32) {
        self.hw.hold(pin);
        self.run_ms(1_200);
        self.hw.let_go(pin);
        self.run_ms(2 * TICK_MS);
    }

    pub fn console(&mut self, line: &str) -> (Result<()>, String) {
        let mut out = String::new();
        let r = self.app.handle_line(
            line,
            &mut self.hw,
            &mut self.clock,
            &mut self.sink,
            &mut out,
        );
        (r, out)
    }
}
