//! FishFeeder Firmware: Main Entry Point
//!
//! Hexagonal architecture with one cooperative poll loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  EspHardware      Ds3231 / SoftClock   LcdDisplay + LogDisplay │
//! │  (HardwarePort)   (ClockPort)          (DisplaySink)           │
//! │  LogEventSink     UART LineReader                              │
//! │  (EventSink)      (console text)                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Buttons · Menu FSM · Scheduler · Feeder · Safety      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_svc::hal::delay::{Ets, NON_BLOCK};
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::uart::{UartConfig, UartDriver};

use fishfeeder::adapters::console::LineReader;
use fishfeeder::adapters::hardware::EspHardware;
use fishfeeder::adapters::lcd_sink::LcdDisplay;
use fishfeeder::adapters::log_sink::{LogDisplay, LogEventSink};
use fishfeeder::app::ports::{ClockPort, DisplaySink, HardwarePort};
use fishfeeder::app::service::AppService;
use fishfeeder::clock::{DateTime, SoftClock};
use fishfeeder::config::SystemConfig;
use fishfeeder::display::{COLS, Paint};
use fishfeeder::drivers::ds3231::Ds3231;
use fishfeeder::drivers::hw_init;
use fishfeeder::drivers::lcd::Lcd;
use fishfeeder::drivers::watchdog::Watchdog;
use fishfeeder::error;
use fishfeeder::pins;

// ── Board-level port wrappers ─────────────────────────────────
//
// The RTC and the LCD are both optional at runtime: the feeder keeps
// running on the software clock and the log mirror if either is absent.

enum BoardClock<I2C: embedded_hal::i2c::I2c> {
    Rtc(Ds3231<I2C>),
    Soft(SoftClock),
}

impl<I2C: embedded_hal::i2c::I2c> BoardClock<I2C> {
    fn sync(&mut self, now_ms: u32) {
        if let Self::Soft(clock) = self {
            clock.sync(now_ms);
        }
    }
}

impl<I2C: embedded_hal::i2c::I2c> ClockPort for BoardClock<I2C> {
    fn now(&mut self) -> DateTime {
        match self {
            Self::Rtc(rtc) => rtc.now(),
            Self::Soft(clock) => clock.now(),
        }
    }

    fn adjust(&mut self, dt: DateTime) -> error::Result<()> {
        match self {
            Self::Rtc(rtc) => rtc.adjust(dt),
            Self::Soft(clock) => clock.adjust(dt),
        }
    }
}

enum Panel<I2C, D> {
    Lcd(LcdDisplay<I2C, D>),
    Headless,
}

impl<I2C: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs> DisplaySink for Panel<I2C, D> {
    fn paint(&mut self, paint: &Paint) {
        if let Self::Lcd(lcd) = self {
            lcd.paint(paint);
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  FishFeeder v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1b. GPIO: buttons in, relays/LED/buzzer out and LOW ───
    if let Err(e) = hw_init::init_peripherals() {
        // Outputs may be floating; the relays must not be left to chance.
        error!("HAL init failed ({}), halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = Watchdog::default();

    // ── 2. Config ─────────────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;

    let peripherals = Peripherals::take()?;
    let mut hw = EspHardware::new();

    // ── 3. Clock: DS3231, or the software clock if absent ─────
    let rtc_bus = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(100.kHz().into()),
    )?;
    let mut rtc = Ds3231::new(rtc_bus, pins::RTC_I2C_ADDR);
    let mut clock = match rtc.init(DateTime::DEFAULT) {
        Ok(_) => BoardClock::Rtc(rtc),
        Err(e) => {
            warn!("RTC init failed ({}), running on the software clock", e);
            BoardClock::Soft(SoftClock::new(DateTime::DEFAULT, hw.now_ms()))
        }
    };

    // ── 4. Display: LCD with a log mirror ─────────────────────
    let lcd_bus = I2cDriver::new(
        peripherals.i2c1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        &I2cConfig::new().baudrate(100.kHz().into()),
    )?;
    let mut lcd = Lcd::new(lcd_bus, Ets, pins::LCD_I2C_ADDR, COLS as u8);
    let panel = match lcd.init() {
        Ok(()) => Panel::Lcd(LcdDisplay::new(lcd)),
        Err(e) => {
            warn!("LCD init failed ({:?}), display mirrored to log only", e);
            Panel::Headless
        }
    };
    let mut display = (panel, LogDisplay::new());

    // ── 5. Serial console (UART0, the USB-serial bridge) ──────
    let uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(115_200)),
    )?;
    let mut reader = LineReader::new();
    let mut rx = [0u8; 32];

    // ── 6. App service ────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config.clone());
    app.start(&mut hw, &mut clock, &mut display, &mut sink);

    info!("System ready. Type 'help' on the console.");

    // ── 7. Poll loop ──────────────────────────────────────────
    loop {
        clock.sync(hw.now_ms());
        app.tick(&mut hw, &mut clock, &mut display, &mut sink);

        match uart.read(&mut rx, NON_BLOCK) {
            Ok(n) if n > 0 => reader.extend(&rx[..n], |line| {
                let mut reply = String::new();
                // Errors are already in the reply text.
                let _ = app.handle_line(line, &mut hw, &mut clock, &mut sink, &mut reply);
                print!("{}", reply);
            }),
            Ok(_) => {}
            Err(e) => warn!("UART read failed: {}", e),
        }

        watchdog.feed();
        hw.delay_ms(config.loop_interval_ms);
    }
}
