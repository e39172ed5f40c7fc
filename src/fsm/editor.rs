//! Generic field-by-field editor shared by the schedule and time screens.
//!
//! A form is a plain `Copy` draft plus a static table of field accessors.
//! The cursor walks the table in order and then lands on a virtual SAVE
//! slot before wrapping:
//!
//! ```text
//!   field 0 → field 1 → … → field N-1 → SAVE → field 0
//! ```
//!
//! UP/DOWN call the current field's `increment`/`decrement`; both are
//! no-ops on SAVE.  Cross-field rules (day vs. month length) belong in
//! [`EditForm::validate`], checked once when the user saves.

use crate::clock::{self, DateTime, MAX_YEAR, MIN_YEAR};
use crate::error::{Error, Result};
use crate::scheduler::ScheduleEntry;

/// One editable field.
pub struct FieldSpec<D, F> {
    pub id: F,
    pub increment: fn(&mut D),
    pub decrement: fn(&mut D),
}

/// A draft that can be edited with [`FieldEditor`].
pub trait EditForm: Copy + 'static {
    type Field: Copy + PartialEq + core::fmt::Debug;

    /// Editable fields in cursor order.
    const FIELDS: &'static [FieldSpec<Self, Self::Field>];
    /// Identity reported when the cursor sits on the save slot.
    const SAVE: Self::Field;

    fn validate(&self) -> Result<()>;
}

/// Cursor + draft.  Dropped without effect on cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEditor<D> {
    draft: D,
    cursor: usize,
}

impl<D: EditForm> FieldEditor<D> {
    pub fn new(draft: D) -> Self {
        Self { draft, cursor: 0 }
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn field(&self) -> D::Field {
        D::FIELDS.get(self.cursor).map_or(D::SAVE, |spec| spec.id)
    }

    pub fn at_save(&self) -> bool {
        self.cursor == D::FIELDS.len()
    }

    /// Move to the next field, wrapping from SAVE back to the first.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % (D::FIELDS.len() + 1);
    }

    pub fn increment(&mut self) {
        if let Some(spec) = D::FIELDS.get(self.cursor) {
            (spec.increment)(&mut self.draft);
        }
    }

    pub fn decrement(&mut self) {
        if let Some(spec) = D::FIELDS.get(self.cursor) {
            (spec.decrement)(&mut self.draft);
        }
    }

    /// The validated draft, ready to commit.
    pub fn finish(&self) -> Result<D> {
        self.draft.validate()?;
        Ok(self.draft)
    }
}

// ---------------------------------------------------------------------------
// Rollover helpers
// ---------------------------------------------------------------------------

fn wrap_up<T>(v: T, min: T, max: T) -> T
where
    T: Copy + PartialOrd + core::ops::Add<Output = T> + From<u8>,
{
    if v >= max { min } else { v + T::from(1) }
}

fn wrap_down<T>(v: T, min: T, max: T) -> T
where
    T: Copy + PartialOrd + core::ops::Sub<Output = T> + From<u8>,
{
    if v <= min { max } else { v - T::from(1) }
}

// ---------------------------------------------------------------------------
// Schedule entry form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleField {
    Hour,
    Minute,
    Enabled,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub hour: u8,
    pub minute: u8,
    pub enabled: bool,
}

impl From<ScheduleEntry> for ScheduleDraft {
    fn from(e: ScheduleEntry) -> Self {
        Self {
            hour: e.hour,
            minute: e.minute,
            enabled: e.enabled,
        }
    }
}

fn toggle_enabled(d: &mut ScheduleDraft) {
    d.enabled = !d.enabled;
}

const SCHEDULE_FIELDS: [FieldSpec<ScheduleDraft, ScheduleField>; 3] = [
    FieldSpec {
        id: ScheduleField::Hour,
        increment: |d| d.hour = wrap_up(d.hour, 0, 23),
        decrement: |d| d.hour = wrap_down(d.hour, 0, 23),
    },
    FieldSpec {
        id: ScheduleField::Minute,
        increment: |d| d.minute = wrap_up(d.minute, 0, 59),
        decrement: |d| d.minute = wrap_down(d.minute, 0, 59),
    },
    FieldSpec {
        id: ScheduleField::Enabled,
        increment: toggle_enabled,
        decrement: toggle_enabled,
    },
];

impl EditForm for ScheduleDraft {
    type Field = ScheduleField;
    const FIELDS: &'static [FieldSpec<Self, ScheduleField>] = &SCHEDULE_FIELDS;
    const SAVE: ScheduleField = ScheduleField::Save;

    fn validate(&self) -> Result<()> {
        if self.hour < 24 && self.minute < 60 {
            Ok(())
        } else {
            Err(Error::InvalidSchedule)
        }
    }
}

// ---------------------------------------------------------------------------
// Date/time form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Hour,
    Minute,
    Day,
    Month,
    Year,
    Save,
}

/// Clock draft.  Seconds are not editable; the commit writes `:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDraft {
    pub hour: u8,
    pub minute: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl TimeDraft {
    pub fn to_datetime(self) -> DateTime {
        DateTime {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: 0,
        }
    }
}

impl From<DateTime> for TimeDraft {
    fn from(dt: DateTime) -> Self {
        Self {
            hour: dt.hour,
            minute: dt.minute,
            day: dt.day,
            month: dt.month,
            year: dt.year.clamp(MIN_YEAR, MAX_YEAR),
        }
    }
}

const TIME_FIELDS: [FieldSpec<TimeDraft, TimeField>; 5] = [
    FieldSpec {
        id: TimeField::Hour,
        increment: |d| d.hour = wrap_up(d.hour, 0, 23),
        decrement: |d| d.hour = wrap_down(d.hour, 0, 23),
    },
    FieldSpec {
        id: TimeField::Minute,
        increment: |d| d.minute = wrap_up(d.minute, 0, 59),
        decrement: |d| d.minute = wrap_down(d.minute, 0, 59),
    },
    // Day rolls over the full 1..=31; month length is checked on save.
    FieldSpec {
        id: TimeField::Day,
        increment: |d| d.day = wrap_up(d.day, 1, 31),
        decrement: |d| d.day = wrap_down(d.day, 1, 31),
    },
    FieldSpec {
        id: TimeField::Month,
        increment: |d| d.month = wrap_up(d.month, 1, 12),
        decrement: |d| d.month = wrap_down(d.month, 1, 12),
    },
    FieldSpec {
        id: TimeField::Year,
        increment: |d| d.year = wrap_up(d.year, MIN_YEAR, MAX_YEAR),
        decrement: |d| d.year = wrap_down(d.year, MIN_YEAR, MAX_YEAR),
    },
];

impl EditForm for TimeDraft {
    type Field = TimeField;
    const FIELDS: &'static [FieldSpec<Self, TimeField>] = &TIME_FIELDS;
    const SAVE: TimeField = TimeField::Save;

    fn validate(&self) -> Result<()> {
        if clock::is_valid_date(self.year, self.month, self.day)
            && self.hour < 24
            && self.minute < 60
        {
            Ok(())
        } else {
            Err(Error::InvalidDate)
        }
    }
}

pub type ScheduleEditor = FieldEditor<ScheduleDraft>;
pub type TimeEditor = FieldEditor<TimeDraft>;
