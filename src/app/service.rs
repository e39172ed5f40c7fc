//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the button bank, schedule resolver, feed actuator,
//! buzzer and menu FSM.  All I/O flows through port traits injected at
//! call sites, so the whole feeder can be driven from tests with a fake
//! clock and fake pins.
//!
//! ```text
//!  HardwarePort ──▶ ┌───────────────────────────┐ ──▶ DisplaySink
//!                   │        AppService         │
//!     ClockPort ◀──▶│ Buttons · FSM · Schedule  │ ──▶ EventSink
//!                   │ Feeder · Safety · Buzzer  │
//!  console text ──▶ └───────────────────────────┘ ──▶ reply text
//! ```

use core::fmt::{self, Write};

use log::{info, warn};

use crate::clock::DateTime;
use crate::config::SystemConfig;
use crate::display::Paint;
use crate::drivers::button::{ButtonBank, ButtonEdges, ButtonTiming};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::feeder::{FeedActuator, FeedStop};
use crate::error::{Error, Result};
use crate::fsm::context::{EditSession, FeedStatus, Feedback, MenuCommand, MenuContext};
use crate::fsm::states::build_screen_table;
use crate::fsm::{Fsm, Screen};
use crate::pins;
use crate::scheduler::{ENTRY_COUNT, Scheduler};

use super::commands::{AppCommand, Target};
use super::events::{AppEvent, FeedSource, StatusReport};
use super::ports::{ClockPort, DisplaySink, EventSink, HardwarePort};

/// `test relay` hold time.
const RELAY_TEST_MS: u32 = 3_000;
/// `test led` blink count and half-period.
const LED_TEST_BLINKS: u8 = 5;
const LED_TEST_PERIOD_MS: u32 = 300;

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const HELP: &str = "\
Commands:
  help | ?          this list
  time              current date and time
  schedules         list feed times
  status            system summary
  feed              feed now
  stop              emergency stop
  next              next scheduled feed
  set X HH:MM       set entry X (1-4), enables it
  set X off         disable entry X
  enable X|all      enable entry X or all
  disable X|all     disable entry X or all
  test relay        close relays for 3 s
  test led          blink status LED";

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    buttons: ButtonBank,
    scheduler: Scheduler,
    feeder: FeedActuator,
    buzzer: Buzzer,
    fsm: Fsm,
    ctx: MenuContext,
    last_refresh_ms: u32,
    last_time_log_ms: u32,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch hardware: call [`start`](Self::start) next.
    /// The config is expected to have passed [`SystemConfig::validate`].
    pub fn new(config: SystemConfig) -> Self {
        let buttons = ButtonBank::new(
            ButtonTiming::from_config(&config),
            pins::BUTTON_GPIOS,
            config.buttons_active_low,
        );
        let scheduler = Scheduler::new(config.default_schedules);
        let feeder = FeedActuator::new(config.feed_duration_secs, config.relay_mask);
        let fsm = Fsm::new(build_screen_table(), Screen::Clock, config.menu_timeout_ms);
        let ctx = MenuContext::new(config.default_schedules);

        Self {
            config,
            buttons,
            scheduler,
            feeder,
            buzzer: Buzzer::new(),
            fsm,
            ctx,
            last_refresh_ms: 0,
            last_time_log_ms: 0,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive outputs safe, enter the CLOCK screen and paint it.
    pub fn start(
        &mut self,
        hw: &mut impl HardwarePort,
        clock: &mut impl ClockPort,
        display: &mut impl DisplaySink,
        sink: &mut impl EventSink,
    ) {
        self.feeder.init_outputs(hw);
        hw.write_pin(pins::BUZZER_GPIO, false);

        let now_ms = hw.now_ms();
        self.ctx.now_ms = now_ms;
        self.ctx.now = clock.now();
        self.refresh_snapshots(now_ms);
        self.fsm.start(&mut self.ctx);

        self.last_time_log_ms = now_ms;
        self.repaint(display, now_ms);

        sink.emit(&AppEvent::Started(self.fsm.current_screen()));
        info!(
            "AppService started at {} with {}/{} schedules enabled",
            self.ctx.now,
            self.scheduler.enabled_count(),
            ENTRY_COUNT
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one poll cycle.
    ///
    /// Order is fixed: clock → buttons → menu (idle timeout, then the
    /// current screen) → menu side effects → schedule → feed timer →
    /// buzzer → display → periodic time report.
    pub fn tick(
        &mut self,
        hw: &mut impl HardwarePort,
        clock: &mut impl ClockPort,
        display: &mut impl DisplaySink,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let prev_screen = self.fsm.current_screen();

        // 1. Clock
        let now_ms = hw.now_ms();
        let now = clock.now();
        self.ctx.now_ms = now_ms;
        self.ctx.now = now;

        // 2. Buttons
        self.buttons.poll(hw, now_ms);
        self.ctx.input = self.buttons.drain(now_ms);

        // 3–4. Menu, with fresh snapshots
        self.refresh_snapshots(now_ms);
        self.fsm.tick(&mut self.ctx);
        self.ctx.input = ButtonEdges::default();

        // 5. Menu side effects
        self.apply_menu_commands(hw, clock, now_ms, sink);
        self.apply_feedback(now_ms, sink);

        // 6. Schedule, regardless of screen
        if let Some(entry) = self.scheduler.resolve_feed_trigger(&now) {
            // Rejection is reported through the sink.
            let _ = self.start_feed(hw, now_ms, FeedSource::Schedule(entry), sink);
        }

        // 7. Feed timer and safety ceiling
        if let Some(stop) = self.feeder.update(hw, now_ms) {
            self.ctx.repaint = true;
            sink.emit(&AppEvent::FeedStopped(stop));
        }

        // 8. Buzzer
        let level = self.buzzer.tick(now_ms);
        hw.write_pin(pins::BUZZER_GPIO, level);

        let screen = self.fsm.current_screen();
        if screen != prev_screen {
            sink.emit(&AppEvent::ScreenChanged {
                from: prev_screen,
                to: screen,
            });
        }

        // 9. Display: coalesced, plus the once-a-second refresh on live screens
        let live = matches!(screen, Screen::Clock | Screen::Feeding | Screen::Status);
        let refresh_due =
            live && now_ms.wrapping_sub(self.last_refresh_ms) >= self.config.display_refresh_ms;
        if self.ctx.repaint || refresh_due {
            self.repaint(display, now_ms);
        }

        // 10. Periodic time report
        if now_ms.wrapping_sub(self.last_time_log_ms) >= self.config.time_log_interval_ms {
            self.last_time_log_ms = now_ms;
            sink.emit(&AppEvent::TimeReport(now));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Parse and execute one console line, writing the reply to `out`.
    pub fn handle_line(
        &mut self,
        line: &str,
        hw: &mut impl HardwarePort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
        out: &mut impl Write,
    ) -> Result<()> {
        match AppCommand::parse(line) {
            Ok(Some(cmd)) => self.handle_command(cmd, hw, clock, sink, out),
            Ok(None) => Ok(()),
            Err(e) => {
                let _ = writeln!(out, "Error: {e}");
                Err(e.into())
            }
        }
    }

    /// Execute a console command.
    ///
    /// The reply always goes to `out`, success or not.  A rejected
    /// operation also comes back as `Err` and leaves state unchanged.
    /// Reply writes are best-effort.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl HardwarePort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
        out: &mut impl Write,
    ) -> Result<()> {
        let now_ms = hw.now_ms();
        let now = clock.now();

        let result = match cmd {
            AppCommand::Help => {
                let _ = writeln!(out, "{HELP}");
                Ok(())
            }
            AppCommand::Time => {
                let _ = writeln!(out, "Time: {} {}", weekday_name(&now), now);
                Ok(())
            }
            AppCommand::Schedules => {
                self.write_schedules(out);
                Ok(())
            }
            AppCommand::Status => {
                let report = self.report(now, now_ms);
                let _ = write_status(out, &report);
                Ok(())
            }
            AppCommand::Feed => match self.start_feed(hw, now_ms, FeedSource::Console, sink) {
                Ok(()) => {
                    let _ = writeln!(
                        out,
                        "Feeding started ({} s)",
                        self.feeder.duration_secs()
                    );
                    Ok(())
                }
                Err(e) => {
                    let _ = writeln!(
                        out,
                        "Already feeding, {} s left",
                        self.feeder.remaining_secs(now_ms)
                    );
                    Err(e)
                }
            },
            AppCommand::Stop => {
                if self.feeder.emergency_stop(hw) {
                    sink.emit(&AppEvent::FeedStopped(FeedStop::Cancelled));
                    let _ = writeln!(out, "Emergency stop: feed cancelled");
                } else {
                    let _ = writeln!(out, "Emergency stop: relays off (no feed was active)");
                }
                Ok(())
            }
            AppCommand::Next => {
                match self.scheduler.next_upcoming(&now) {
                    Some(next) => {
                        let _ = writeln!(
                            out,
                            "Next feed: H{} at {:02}:{:02}, in {} h {} min",
                            next.entry,
                            next.hour,
                            next.minute,
                            next.minutes_away / 60,
                            next.minutes_away % 60
                        );
                    }
                    None => {
                        let _ = writeln!(out, "No schedules enabled");
                    }
                }
                Ok(())
            }
            AppCommand::SetTime {
                entry,
                hour,
                minute,
            } => self.scheduler.set_entry(entry, hour, minute).map(|()| {
                let _ = writeln!(out, "H{entry} set to {hour:02}:{minute:02} (enabled)");
            }),
            AppCommand::SetOff { entry } => self.scheduler.set_enabled(entry, false).map(|()| {
                let _ = writeln!(out, "H{entry} disabled");
            }),
            AppCommand::Enable(target) => self.set_target(target, true, out),
            AppCommand::Disable(target) => self.set_target(target, false, out),
            AppCommand::TestRelay => match self.feeder.test_relays(hw, RELAY_TEST_MS) {
                Ok(()) => {
                    let _ = writeln!(out, "Relay test complete");
                    Ok(())
                }
                Err(e) => {
                    let _ = writeln!(out, "Relay test refused: feeding in progress");
                    Err(e)
                }
            },
            AppCommand::TestLed => {
                self.feeder
                    .test_led(hw, LED_TEST_BLINKS, LED_TEST_PERIOD_MS);
                let _ = writeln!(out, "LED test complete");
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("Command {:?} rejected: {}", cmd, e);
            if !matches!(e, Error::AlreadyFeeding) {
                let _ = writeln!(out, "Error: {e}");
            }
        }

        // Console may have changed schedules or feed state under the menu.
        self.refresh_snapshots(hw.now_ms());
        self.ctx.repaint = true;
        result
    }

    // ── Queries ───────────────────────────────────────────────

    /// Point-in-time summary for the STATUS screen and the console.
    pub fn status(&self, clock: &mut impl ClockPort) -> StatusReport {
        self.report(clock.now(), self.ctx.now_ms)
    }

    /// The paint request for the current screen.
    pub fn paint_for(&self, now_ms: u32) -> Paint {
        let now = self.ctx.now;
        match self.fsm.current_screen() {
            Screen::Clock => Paint::Clock {
                now,
                feeding: self
                    .feeder
                    .is_active()
                    .then(|| self.feeder.remaining_secs(now_ms)),
                next: self.scheduler.next_upcoming(&now),
            },
            Screen::MainMenu => Paint::MainMenu {
                selected: self.ctx.selected,
            },
            Screen::Feeding => Paint::Feeding {
                remaining_secs: self.feeder.remaining_secs(now_ms),
            },
            Screen::Status => Paint::Status(self.report(now, now_ms)),
            Screen::EditSchedule | Screen::TimeAdjust | Screen::ViewSchedules => {
                match self.ctx.session {
                    EditSession::Schedule { entry, editor } => Paint::ScheduleEditor {
                        entry,
                        draft: *editor.draft(),
                        cursor: editor.field(),
                    },
                    EditSession::Time(editor) => Paint::TimeAdjust {
                        draft: *editor.draft(),
                        cursor: editor.field(),
                    },
                    EditSession::None => Paint::Schedules {
                        entries: *self.scheduler.entries(),
                        next: self.scheduler.next_upcoming(&now).map(|n| n.entry),
                    },
                }
            }
        }
    }

    /// Current menu screen.
    pub fn screen(&self) -> Screen {
        self.fsm.current_screen()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn feeder(&self) -> &FeedActuator {
        &self.feeder
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Poll cycles executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn refresh_snapshots(&mut self, now_ms: u32) {
        self.ctx.schedules = *self.scheduler.entries();
        self.ctx.feed = FeedStatus {
            active: self.feeder.is_active(),
            remaining_secs: self.feeder.remaining_secs(now_ms),
        };
    }

    fn repaint(&mut self, display: &mut impl DisplaySink, now_ms: u32) {
        display.paint(&self.paint_for(now_ms));
        self.ctx.repaint = false;
        self.last_refresh_ms = now_ms;
    }

    fn report(&self, now: DateTime, now_ms: u32) -> StatusReport {
        StatusReport {
            now,
            feeding: self.feeder.is_active(),
            remaining_secs: self.feeder.remaining_secs(now_ms),
            relays_on: self.feeder.relay_mask() != 0,
            enabled_count: self.scheduler.enabled_count(),
            next: self.scheduler.next_upcoming(&now),
        }
    }

    fn start_feed(
        &mut self,
        hw: &mut impl HardwarePort,
        now_ms: u32,
        source: FeedSource,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match self.feeder.start(hw, now_ms) {
            Ok(()) => {
                self.ctx.repaint = true;
                sink.emit(&AppEvent::FeedStarted(source));
                Ok(())
            }
            Err(reason) => {
                warn!("Feed from {:?} rejected: {}", source, reason);
                sink.emit(&AppEvent::FeedRejected { source, reason });
                Err(reason)
            }
        }
    }

    /// Execute the navigator's queued side effects, in order.
    fn apply_menu_commands(
        &mut self,
        hw: &mut impl HardwarePort,
        clock: &mut impl ClockPort,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) {
        let commands = core::mem::take(&mut self.ctx.commands);
        for cmd in commands {
            match cmd {
                MenuCommand::StartFeed => {
                    let _ = self.start_feed(hw, now_ms, FeedSource::Button, sink);
                }
                MenuCommand::StopFeed => match self.feeder.stop(hw) {
                    Ok(()) => sink.emit(&AppEvent::FeedStopped(FeedStop::Cancelled)),
                    Err(e) => warn!("Menu stop ignored: {}", e),
                },
                MenuCommand::SaveSchedule {
                    entry,
                    hour,
                    minute,
                    enabled,
                } => {
                    let saved = self.scheduler.set_entry(entry, hour, minute).and_then(|()| {
                        if enabled {
                            Ok(())
                        } else {
                            self.scheduler.set_enabled(entry, false)
                        }
                    });
                    match saved {
                        Ok(()) => sink.emit(&AppEvent::ScheduleUpdated {
                            entry,
                            hour,
                            minute,
                            enabled,
                        }),
                        Err(e) => {
                            warn!("Schedule H{} not saved: {}", entry, e);
                            sink.emit(&AppEvent::SaveFailed(e));
                        }
                    }
                }
                MenuCommand::AdjustClock(dt) => match clock.adjust(dt) {
                    Ok(()) => {
                        info!("Clock set to {}", dt);
                        self.ctx.now = dt;
                        sink.emit(&AppEvent::ClockAdjusted(dt));
                    }
                    Err(e) => {
                        warn!("Clock not adjusted: {}", e);
                        sink.emit(&AppEvent::SaveFailed(e));
                    }
                },
            }
            self.ctx.repaint = true;
        }
    }

    fn apply_feedback(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        let feedback = core::mem::take(&mut self.ctx.feedback);
        for item in feedback {
            match item {
                Feedback::Tone(tone) => self.buzzer.play(tone, now_ms),
                Feedback::Notice(notice) => sink.emit(&AppEvent::Notice(notice)),
            }
        }
    }

    fn set_target(&mut self, target: Target, enabled: bool, out: &mut impl Write) -> Result<()> {
        let verb = if enabled { "enabled" } else { "disabled" };
        match target {
            Target::All => {
                if enabled {
                    self.scheduler.enable_all();
                } else {
                    self.scheduler.disable_all();
                }
                let _ = writeln!(out, "All schedules {verb}");
                Ok(())
            }
            Target::Entry(entry) => self.scheduler.set_enabled(entry, enabled).map(|()| {
                let _ = writeln!(out, "H{entry} {verb}");
            }),
        }
    }

    fn write_schedules(&self, out: &mut impl Write) {
        let _ = writeln!(out, "Feed schedules:");
        for (i, entry) in self.scheduler.entries().iter().enumerate() {
            let _ = writeln!(
                out,
                "  H{}: {:02}:{:02} {}",
                i + 1,
                entry.hour,
                entry.minute,
                if entry.enabled { "enabled" } else { "disabled" }
            );
        }
        let _ = writeln!(out, "Feed duration: {} s", self.feeder.duration_secs());
    }
}

fn weekday_name(dt: &DateTime) -> &'static str {
    WEEKDAYS.get(dt.weekday() as usize).copied().unwrap_or("?")
}

fn write_status(out: &mut impl Write, s: &StatusReport) -> fmt::Result {
    writeln!(out, "Time: {}", s.now)?;
    writeln!(out, "Relays: {}", if s.relays_on { "ON" } else { "OFF" })?;
    if s.feeding {
        writeln!(out, "Feeding: {} s left", s.remaining_secs)?;
    }
    writeln!(out, "Schedules enabled: {}/{}", s.enabled_count, ENTRY_COUNT)?;
    match s.next {
        Some(n) => writeln!(
            out,
            "Next feed: H{} at {:02}:{:02}",
            n.entry, n.hour, n.minute
        ),
        None => writeln!(out, "Next feed: none"),
    }
}
