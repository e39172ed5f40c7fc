//! Function-pointer finite state machine engine for the menu.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ScreenTable                                                │
//! │  ┌───────────────┬──────────┬──────────┬─────────────────┐  │
//! │  │ Screen        │ on_enter │ on_exit  │ on_update       │  │
//! │  ├───────────────┼──────────┼──────────┼─────────────────┤  │
//! │  │ Clock         │ fn(ctx)  │    -     │ fn(ctx)->Option │  │
//! │  │ MainMenu      │    -     │    -     │ fn(ctx)->Option │  │
//! │  │ ViewSchedules │    -     │    -     │ fn(ctx)->Option │  │
//! │  │ EditSchedule  │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->Option │  │
//! │  │ Feeding       │    -     │    -     │ fn(ctx)->Option │  │
//! │  │ Status        │    -     │    -     │ fn(ctx)->Option │  │
//! │  │ TimeAdjust    │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->Option │  │
//! │  └───────────────┴──────────┴──────────┴─────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine first applies the idle timeout, then calls
//! `on_update` for the **current** screen.  If it returns `Some(next)`,
//! the engine runs `on_exit` for the current screen, then `on_enter` for
//! the next.  Every transition and every button edge counts as activity;
//! any screen other than `Clock` idle for longer than the menu timeout is
//! forced back to `Clock`, which discards unsaved drafts via `on_exit`.

pub mod context;
pub mod editor;
pub mod states;

use context::{MenuContext, Notice};
use log::info;

use crate::drivers::buzzer::Tone;

// ---------------------------------------------------------------------------
// Screen identity
// ---------------------------------------------------------------------------

/// Enumeration of all menu screens.
/// Must stay in sync with the table built in [`states::build_screen_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Screen {
    Clock = 0,
    MainMenu = 1,
    ViewSchedules = 2,
    EditSchedule = 3,
    Feeding = 4,
    Status = 5,
    TimeAdjust = 6,
}

impl Screen {
    /// Total number of screens: used to size the table array.
    pub const COUNT: usize = 7;

    /// Convert a table index back to `Screen`.  Out of range falls back
    /// to `Clock`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            1 => Self::MainMenu,
            2 => Self::ViewSchedules,
            3 => Self::EditSchedule,
            4 => Self::Feeding,
            5 => Self::Status,
            6 => Self::TimeAdjust,
            0 => Self::Clock,
            _ => {
                debug_assert!(false, "invalid screen index: {idx}");
                Self::Clock
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type ScreenActionFn = fn(&mut MenuContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type ScreenUpdateFn = fn(&mut MenuContext) -> Option<Screen>;

/// Static descriptor for a single screen.
pub struct ScreenDescriptor {
    pub id: Screen,
    pub name: &'static str,
    pub on_enter: Option<ScreenActionFn>,
    pub on_exit: Option<ScreenActionFn>,
    pub on_update: ScreenUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `Screen as usize`.
    table: [ScreenDescriptor; Screen::COUNT],
    current: usize,
    menu_timeout_ms: u32,
    last_activity_ms: u32,
}

impl Fsm {
    pub fn new(
        table: [ScreenDescriptor; Screen::COUNT],
        initial: Screen,
        menu_timeout_ms: u32,
    ) -> Self {
        Self {
            table,
            current: initial as usize,
            menu_timeout_ms,
            last_activity_ms: 0,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut MenuContext) {
        info!("Menu starting on screen: {}", self.table[self.current].name);
        self.last_activity_ms = ctx.now_ms;
        ctx.repaint = true;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one poll cycle.
    ///
    /// 1. Button edges refresh the activity timestamp.
    /// 2. Off the clock screen and idle past the timeout: force `Clock`.
    /// 3. Otherwise call `on_update` and follow any transition it returns.
    pub fn tick(&mut self, ctx: &mut MenuContext) {
        if ctx.input.any() {
            self.last_activity_ms = ctx.now_ms;
        }

        if self.current != Screen::Clock as usize
            && ctx.now_ms.wrapping_sub(self.last_activity_ms) > self.menu_timeout_ms
        {
            info!("Menu idle timeout on {}", self.table[self.current].name);
            ctx.tone(Tone::Click);
            ctx.notice(Notice::ReturnedToClock);
            self.transition(Screen::Clock, ctx);
            return;
        }

        if let Some(next) = (self.table[self.current].on_update)(ctx) {
            if next as usize != self.current {
                self.transition(next, ctx);
            }
        }
    }

    /// Jump to `next` regardless of what `on_update` would return.
    pub fn force_transition(&mut self, next: Screen, ctx: &mut MenuContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_screen(&self) -> Screen {
        Screen::from_index(self.current)
    }

    /// Milliseconds since the last button edge or transition.
    pub fn idle_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_activity_ms)
    }

    fn transition(&mut self, next: Screen, ctx: &mut MenuContext) {
        let next_idx = next as usize;

        info!(
            "Menu: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.last_activity_ms = ctx.now_ms;
        ctx.repaint = true;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
