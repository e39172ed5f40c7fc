//! Paint requests and the 20x4 text renderer.
//!
//! The core only ever emits a [`Paint`]: which screen, plus the minimum
//! data needed to draw it.  [`render`] turns a paint into four 20-column
//! rows; the LCD adapter and the log mirror both consume that frame, so
//! both show the same text.

use core::fmt::Write;

use heapless::String;

use crate::app::events::StatusReport;
use crate::clock::DateTime;
use crate::fsm::context::MenuAction;
use crate::fsm::editor::{ScheduleDraft, ScheduleField, TimeDraft, TimeField};
use crate::scheduler::{ENTRY_COUNT, ScheduleEntry, Upcoming};

pub const COLS: usize = 20;
pub const ROWS: usize = 4;

pub type Line = String<COLS>;

/// Stateless paint request, keyed by screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Clock {
        now: DateTime,
        /// Remaining seconds while feeding.
        feeding: Option<u8>,
        next: Option<Upcoming>,
    },
    MainMenu {
        selected: MenuAction,
    },
    Schedules {
        entries: [ScheduleEntry; ENTRY_COUNT],
        /// Entry marked as next to fire.
        next: Option<u8>,
    },
    ScheduleEditor {
        entry: u8,
        draft: ScheduleDraft,
        cursor: ScheduleField,
    },
    Feeding {
        remaining_secs: u8,
    },
    Status(StatusReport),
    TimeAdjust {
        draft: TimeDraft,
        cursor: TimeField,
    },
}

/// Four rendered rows, each at most [`COLS`] characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub rows: [Line; ROWS],
}

impl Frame {
    pub fn row(&self, idx: usize) -> &str {
        self.rows.get(idx).map_or("", |r| r.as_str())
    }
}

/// Render a paint request to text.  Text past column 20 is dropped.
pub fn render(paint: &Paint) -> Frame {
    let mut f = Frame::default();
    let [r0, r1, r2, r3] = &mut f.rows;

    // Writes into a full `Line` fail; every layout below fits in 20 columns.
    match *paint {
        Paint::Clock { now, feeding, next } => {
            center(r0, "FISH FEEDER");
            let mut time: Line = String::new();
            let _ = write!(time, "{:02}:{:02}:{:02}", now.hour, now.minute, now.second);
            center(r1, &time);
            let mut date: Line = String::new();
            let _ = write!(date, "{:02}/{:02}/{}", now.day, now.month, now.year);
            center(r2, &date);
            match (feeding, next) {
                (Some(secs), _) => {
                    let _ = write!(r3, "  FEEDING {}s", secs);
                }
                (None, Some(n)) => {
                    let _ = write!(r3, "Next: {:02}:{:02} (H{})", n.hour, n.minute, n.entry);
                }
                (None, None) => {
                    let _ = r3.push_str("  No schedules");
                }
            }
        }

        Paint::MainMenu { selected } => {
            let _ = r0.push_str("====== MENU ======");
            // Three-line window around the selection, clamped to 1..=9.
            let sel = selected.option() as usize;
            let start = sel.saturating_sub(1).clamp(1, MenuAction::COUNT - 2);
            for (row, option) in [r1, r2, r3].into_iter().zip(start..) {
                if let Some(action) = MenuAction::ALL.get(option - 1) {
                    let marker = if option == sel { '>' } else { ' ' };
                    let _ = write!(row, "{}{}", marker, action.label());
                }
            }
        }

        Paint::Schedules { entries, next } => {
            for (i, (row, entry)) in [r0, r1, r2, r3].into_iter().zip(entries.iter()).enumerate() {
                let id = i as u8 + 1;
                let _ = write!(
                    row,
                    "H{}: {:02}:{:02} {}",
                    id,
                    entry.hour,
                    entry.minute,
                    if entry.enabled { "ON " } else { "OFF" }
                );
                if next == Some(id) {
                    let _ = row.push_str(" <");
                }
            }
        }

        Paint::ScheduleEditor {
            entry,
            draft,
            cursor,
        } => {
            let _ = write!(r0, "=== EDIT H{} ===", entry);
            let _ = r1.push_str("Hour: ");
            field(r1, draft.hour, cursor == ScheduleField::Hour);
            let _ = r1.push(':');
            field(r1, draft.minute, cursor == ScheduleField::Minute);
            let _ = r2.push_str("State: ");
            field(
                r2,
                if draft.enabled { "ON" } else { "OFF" },
                cursor == ScheduleField::Enabled,
            );
            hints(r3, cursor == ScheduleField::Save);
        }

        Paint::Feeding { remaining_secs } => {
            let _ = r0.push_str("==== FEEDING ====");
            let _ = write!(r2, "  Time left: {}s", remaining_secs);
            let _ = r3.push_str("  SELECT: stop");
        }

        Paint::Status(s) => {
            let _ = r0.push_str("===== STATUS =====");
            let _ = write!(
                r1,
                "Time: {:02}:{:02}:{:02}",
                s.now.hour, s.now.minute, s.now.second
            );
            if s.feeding {
                let _ = write!(r2, "Feeding: {}s left", s.remaining_secs);
            } else {
                let _ = write!(r2, "Relays: {}", if s.relays_on { "ON" } else { "OFF" });
            }
            let _ = write!(r3, "Active: {}/{}", s.enabled_count, ENTRY_COUNT);
            if let Some(n) = s.next {
                let _ = write!(r3, " next H{}", n.entry);
            }
        }

        Paint::TimeAdjust { draft, cursor } => {
            let _ = r0.push_str("=== ADJUST TIME ===");
            let _ = r1.push_str("Time: ");
            field(r1, draft.hour, cursor == TimeField::Hour);
            let _ = r1.push(':');
            field(r1, draft.minute, cursor == TimeField::Minute);
            let _ = r2.push_str("Date: ");
            field(r2, draft.day, cursor == TimeField::Day);
            let _ = r2.push('/');
            field(r2, draft.month, cursor == TimeField::Month);
            let _ = r2.push('/');
            field(r2, draft.year, cursor == TimeField::Year);
            hints(r3, cursor == TimeField::Save);
        }
    }
    f
}

/// Write a value, bracketed when under the cursor.  Numbers get two digits.
fn field(row: &mut Line, value: impl FieldText, selected: bool) {
    if selected {
        let _ = row.push('[');
    }
    value.write_to(row);
    if selected {
        let _ = row.push(']');
    }
}

trait FieldText {
    fn write_to(&self, row: &mut Line);
}

impl FieldText for u8 {
    fn write_to(&self, row: &mut Line) {
        let _ = write!(row, "{:02}", self);
    }
}

impl FieldText for u16 {
    fn write_to(&self, row: &mut Line) {
        let _ = write!(row, "{}", self);
    }
}

impl FieldText for &str {
    fn write_to(&self, row: &mut Line) {
        let _ = row.push_str(self);
    }
}

fn hints(row: &mut Line, at_save: bool) {
    let _ = row.push_str(if at_save { "CONFIRM: save" } else { "UP/DN SEL CONF" });
}

fn center(row: &mut Line, text: &str) {
    let pad = COLS.saturating_sub(text.len()) / 2;
    for _ in 0..pad {
        let _ = row.push(' ');
    }
    let _ = row.push_str(text);
}
