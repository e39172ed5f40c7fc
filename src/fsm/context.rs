//! Shared mutable context threaded through every menu handler.
//!
//! `MenuContext` is the single struct that screen handlers read from and
//! write to.  The service fills the inputs (clock, button edges, schedule
//! and feed snapshots) before each tick and drains the outputs (commands,
//! feedback, repaint flag) after it.  Think of it as the "blackboard" in a
//! blackboard architecture.

use heapless::Vec;
use log::warn;

use crate::clock::DateTime;
use crate::drivers::button::ButtonEdges;
use crate::drivers::buzzer::Tone;
use crate::scheduler::{ENTRY_COUNT, ScheduleEntry};

use super::editor::{ScheduleEditor, TimeEditor};

// ---------------------------------------------------------------------------
// Main menu actions
// ---------------------------------------------------------------------------

/// The nine main-menu entries, in display order (options 1..=9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ViewSchedules,
    /// Edit schedule entry 1..=4.
    EditSchedule(u8),
    FeedNow,
    ViewStatus,
    AdjustTime,
    Exit,
}

impl MenuAction {
    pub const COUNT: usize = 9;
    pub const ALL: [Self; Self::COUNT] = [
        Self::ViewSchedules,
        Self::EditSchedule(1),
        Self::EditSchedule(2),
        Self::EditSchedule(3),
        Self::EditSchedule(4),
        Self::FeedNow,
        Self::ViewStatus,
        Self::AdjustTime,
        Self::Exit,
    ];

    /// 1-based menu position.
    pub fn option(self) -> u8 {
        match self {
            Self::ViewSchedules => 1,
            Self::EditSchedule(n) => 1 + n.clamp(1, ENTRY_COUNT as u8),
            Self::FeedNow => 6,
            Self::ViewStatus => 7,
            Self::AdjustTime => 8,
            Self::Exit => 9,
        }
    }

    pub fn from_option(option: u8) -> Option<Self> {
        Self::ALL.get((option as usize).checked_sub(1)?).copied()
    }

    /// DOWN: next entry, 9 wraps to 1.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[self.option() as usize % Self::COUNT]
    }

    /// UP: previous entry, 1 wraps to 9.
    #[must_use]
    pub fn prev(self) -> Self {
        Self::ALL[(self.option() as usize + Self::COUNT - 2) % Self::COUNT]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ViewSchedules => "View schedules",
            Self::EditSchedule(1) => "Edit schedule 1",
            Self::EditSchedule(2) => "Edit schedule 2",
            Self::EditSchedule(3) => "Edit schedule 3",
            Self::EditSchedule(_) => "Edit schedule 4",
            Self::FeedNow => "Feed now",
            Self::ViewStatus => "View status",
            Self::AdjustTime => "Adjust time",
            Self::Exit => "Exit",
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs (written by handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Side effects the navigator requests.  Applied after the tick, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    StartFeed,
    StopFeed,
    SaveSchedule {
        entry: u8,
        hour: u8,
        minute: u8,
        enabled: bool,
    },
    AdjustClock(DateTime),
}

/// User-visible messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    FeedingManually,
    AlreadyFeeding,
    FeedCompleted,
    FeedStopped,
    ScheduleSaved,
    EditCancelled,
    ClockAdjusted,
    AdjustCancelled,
    InvalidDate,
    ReturnedToClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Tone(Tone),
    Notice(Notice),
}

// ---------------------------------------------------------------------------
// Inputs (written by the service before each tick)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStatus {
    pub active: bool,
    pub remaining_secs: u8,
}

/// The one live edit sub-session, tied to the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSession {
    None,
    Schedule { entry: u8, editor: ScheduleEditor },
    Time(TimeEditor),
}

// ---------------------------------------------------------------------------
// MenuContext
// ---------------------------------------------------------------------------

const OUTBOX_CAPACITY: usize = 4;

pub struct MenuContext {
    // --- Inputs ---
    pub now_ms: u32,
    pub now: DateTime,
    pub input: ButtonEdges,
    pub schedules: [ScheduleEntry; ENTRY_COUNT],
    pub feed: FeedStatus,

    // --- Session ---
    pub selected: MenuAction,
    /// Entry the next EDIT_SCHEDULE visit opens.
    pub edit_target: u8,
    pub session: EditSession,

    // --- Outputs ---
    /// Set whenever the screen or a draft changed; cleared by the painter.
    pub repaint: bool,
    pub commands: Vec<MenuCommand, OUTBOX_CAPACITY>,
    pub feedback: Vec<Feedback, OUTBOX_CAPACITY>,
}

impl MenuContext {
    pub fn new(schedules: [ScheduleEntry; ENTRY_COUNT]) -> Self {
        Self {
            now_ms: 0,
            now: DateTime::DEFAULT,
            input: ButtonEdges::default(),
            schedules,
            feed: FeedStatus::default(),
            selected: MenuAction::ViewSchedules,
            edit_target: 1,
            session: EditSession::None,
            repaint: true,
            commands: Vec::new(),
            feedback: Vec::new(),
        }
    }

    pub fn command(&mut self, cmd: MenuCommand) {
        if self.commands.push(cmd).is_err() {
            warn!("Menu command outbox full, dropped {:?}", cmd);
        }
    }

    pub fn tone(&mut self, tone: Tone) {
        // Feedback overflow only loses a beep or a log line.
        let _ = self.feedback.push(Feedback::Tone(tone));
    }

    pub fn notice(&mut self, notice: Notice) {
        let _ = self.feedback.push(Feedback::Notice(notice));
    }
}
