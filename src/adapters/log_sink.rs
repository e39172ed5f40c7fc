//! Log-based adapters.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing structured
//! application events to the ESP-IDF logger (UART / USB-CDC in
//! production).  [`LogDisplay`] mirrors every rendered LCD frame at
//! `debug`, which is how the menu is followed with no panel attached.

use log::{debug, error, info, warn};

use crate::app::events::{AppEvent, FeedSource};
use crate::app::ports::{DisplaySink, EventSink};
use crate::display::{self, Paint};
use crate::drivers::feeder::FeedStop;
use crate::fsm::context::Notice;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(screen) => {
                info!("START | screen={:?}", screen);
            }
            AppEvent::ScreenChanged { from, to } => {
                info!("MENU | {:?} -> {:?}", from, to);
            }
            AppEvent::FeedStarted(source) => match source {
                FeedSource::Schedule(entry) => info!("FEED | start, schedule H{}", entry),
                FeedSource::Button => info!("FEED | start, manual (button)"),
                FeedSource::Console => info!("FEED | start, manual (console)"),
            },
            AppEvent::FeedStopped(stop) => match stop {
                FeedStop::Completed => info!("FEED | complete"),
                FeedStop::Cancelled => info!("FEED | stopped by user"),
                FeedStop::SafetyCeiling => error!("FEED | safety ceiling, relays forced off"),
            },
            AppEvent::FeedRejected { source, reason } => {
                warn!("FEED | {:?} rejected: {}", source, reason);
            }
            AppEvent::ScheduleUpdated {
                entry,
                hour,
                minute,
                enabled,
            } => {
                info!(
                    "SCHED | H{} = {:02}:{:02} {}",
                    entry,
                    hour,
                    minute,
                    if *enabled { "enabled" } else { "disabled" }
                );
            }
            AppEvent::ClockAdjusted(dt) => {
                info!("CLOCK | set to {}", dt);
            }
            AppEvent::SaveFailed(e) => {
                warn!("SAVE | failed: {}", e);
            }
            AppEvent::Notice(notice) => {
                info!("NOTICE | {}", notice_text(*notice));
            }
            AppEvent::TimeReport(dt) => {
                info!("TIME | {}", dt);
            }
        }
    }
}

pub fn notice_text(notice: Notice) -> &'static str {
    match notice {
        Notice::FeedingManually => "feeding manually",
        Notice::AlreadyFeeding => "already feeding",
        Notice::FeedCompleted => "feeding completed",
        Notice::FeedStopped => "feeding stopped",
        Notice::ScheduleSaved => "schedule saved",
        Notice::EditCancelled => "edit cancelled",
        Notice::ClockAdjusted => "clock adjusted",
        Notice::AdjustCancelled => "clock adjust cancelled",
        Notice::InvalidDate => "invalid date",
        Notice::ReturnedToClock => "menu timeout, back to clock",
    }
}

/// Display sink that logs the rendered 20x4 frame.
#[derive(Debug, Default)]
pub struct LogDisplay {
    frames: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self { frames: 0 }
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl DisplaySink for LogDisplay {
    fn paint(&mut self, paint: &Paint) {
        self.frames = self.frames.wrapping_add(1);
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let frame = display::render(paint);
        for (i, row) in frame.rows.iter().enumerate() {
            debug!("LCD{} |{:<20}|", i, row.as_str());
        }
    }
}
