//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; the shipped one logs to serial.

use crate::clock::DateTime;
use crate::drivers::feeder::FeedStop;
use crate::error::Error;
use crate::fsm::Screen;
use crate::fsm::context::Notice;
use crate::scheduler::Upcoming;

/// Who asked for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// Schedule entry 1..=4 fired.
    Schedule(u8),
    /// CLOCK screen CONFIRM or menu "feed now".
    Button,
    /// `feed` console command.
    Console,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries initial screen).
    Started(Screen),

    /// The menu moved between screens.
    ScreenChanged { from: Screen, to: Screen },

    FeedStarted(FeedSource),
    FeedStopped(FeedStop),

    /// A requested feed was refused (usually `AlreadyFeeding`).
    FeedRejected { source: FeedSource, reason: Error },

    ScheduleUpdated {
        entry: u8,
        hour: u8,
        minute: u8,
        enabled: bool,
    },

    ClockAdjusted(DateTime),

    /// Clock write or schedule write from the menu failed.
    SaveFailed(Error),

    /// User-facing message raised by the menu.
    Notice(Notice),

    /// Periodic wall-clock report.
    TimeReport(DateTime),
}

/// Point-in-time summary for the STATUS screen and the `status` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub now: DateTime,
    pub feeding: bool,
    pub remaining_secs: u8,
    pub relays_on: bool,
    pub enabled_count: u8,
    pub next: Option<Upcoming>,
}
