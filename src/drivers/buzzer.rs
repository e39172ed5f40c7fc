//! Non-blocking buzzer tone engine.
//!
//! The main loop calls [`Buzzer::tick`] every cycle and writes the returned
//! level to the buzzer pin.  A tone is a fixed list of alternating on/off
//! segments; starting a new tone replaces whatever is playing.
//!
//! | Tone     | Segments (ms)            | Used for                     |
//! |----------|--------------------------|------------------------------|
//! | Click    | 100                      | navigation step              |
//! | Confirm  | 50 on, 50 off, 50 on     | save, feed start             |
//! | Error    | 200 on, 100 off, 200 on  | cancel, invalid, busy        |
//!
//! Segment edges are only as precise as the loop cadence.

/// Tone identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Click,
    Confirm,
    Error,
}

impl Tone {
    /// Alternating on/off durations, starting with "on".
    pub fn segments(self) -> &'static [u32] {
        match self {
            Self::Click => &[100],
            Self::Confirm => &[50, 50, 50],
            Self::Error => &[200, 100, 200],
        }
    }

    pub fn total_ms(self) -> u32 {
        self.segments().iter().sum()
    }
}

#[derive(Debug, Default)]
pub struct Buzzer {
    playing: Option<(Tone, u32)>,
}

impl Buzzer {
    pub fn new() -> Self {
        Self { playing: None }
    }

    /// Start `tone` at `now_ms`, cutting off any tone in progress.
    pub fn play(&mut self, tone: Tone, now_ms: u32) {
        self.playing = Some((tone, now_ms));
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Output level for this instant.  Clears the tone once it has ended.
    pub fn tick(&mut self, now_ms: u32) -> bool {
        let Some((tone, started)) = self.playing else {
            return false;
        };
        let elapsed = now_ms.wrapping_sub(started);

        let mut edge = 0;
        for (i, &segment) in tone.segments().iter().enumerate() {
            edge += segment;
            if elapsed < edge {
                return i % 2 == 0;
            }
        }
        self.playing = None;
        false
    }
}
