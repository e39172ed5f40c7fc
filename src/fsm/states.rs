//! Screen handler implementations and table builder.
//!
//! Each screen has up to three handlers:
//! - `on_enter` : called once when the screen becomes active.
//! - `on_exit`  : called once when leaving the screen.
//! - `on_update`: called every poll; returns `Some(next)` to transition.
//!
//! Handlers never touch hardware.  They read the button edges and the
//! snapshots in [`MenuContext`] and request side effects through
//! `ctx.command()`, `ctx.tone()` and `ctx.notice()`.

use super::context::{EditSession, MenuAction, MenuCommand, MenuContext, Notice};
use super::editor::{EditForm, FieldEditor, ScheduleDraft, TimeDraft};
use super::{Screen, ScreenDescriptor};
use crate::drivers::button::{ButtonEdges, ButtonId};
use crate::drivers::buzzer::Tone;

/// Build the screen table.  Order **must** match `Screen` discriminants.
pub fn build_screen_table() -> [ScreenDescriptor; Screen::COUNT] {
    [
        // 0: Clock
        ScreenDescriptor {
            id: Screen::Clock,
            name: "CLOCK",
            on_enter: Some(clock_enter),
            on_exit: None,
            on_update: clock_update,
        },
        // 1: MainMenu
        ScreenDescriptor {
            id: Screen::MainMenu,
            name: "MAIN_MENU",
            on_enter: None,
            on_exit: None,
            on_update: main_menu_update,
        },
        // 2: ViewSchedules
        ScreenDescriptor {
            id: Screen::ViewSchedules,
            name: "VIEW_SCHEDULES",
            on_enter: None,
            on_exit: None,
            on_update: read_only_update,
        },
        // 3: EditSchedule
        ScreenDescriptor {
            id: Screen::EditSchedule,
            name: "EDIT_SCHEDULE",
            on_enter: Some(edit_schedule_enter),
            on_exit: Some(close_session),
            on_update: edit_schedule_update,
        },
        // 4: Feeding
        ScreenDescriptor {
            id: Screen::Feeding,
            name: "FEEDING",
            on_enter: None,
            on_exit: None,
            on_update: feeding_update,
        },
        // 5: Status
        ScreenDescriptor {
            id: Screen::Status,
            name: "STATUS",
            on_enter: None,
            on_exit: None,
            on_update: read_only_update,
        },
        // 6: TimeAdjust
        ScreenDescriptor {
            id: Screen::TimeAdjust,
            name: "TIME_ADJUST",
            on_enter: Some(time_adjust_enter),
            on_exit: Some(close_session),
            on_update: time_adjust_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════
//  CLOCK
// ═══════════════════════════════════════════════════════════════

fn clock_enter(ctx: &mut MenuContext) {
    ctx.session = EditSession::None;
}

fn clock_update(ctx: &mut MenuContext) -> Option<Screen> {
    if ctx.input.tapped(ButtonId::Select) {
        ctx.selected = MenuAction::ViewSchedules;
        ctx.tone(Tone::Click);
        return Some(Screen::MainMenu);
    }
    if ctx.input.tapped(ButtonId::Confirm) {
        request_feed(ctx);
        ctx.repaint = true;
    }
    None
}

/// Manual feed request shared by CLOCK and the menu.  Returns whether a
/// feed was requested.
fn request_feed(ctx: &mut MenuContext) -> bool {
    if ctx.feed.active {
        ctx.tone(Tone::Error);
        ctx.notice(Notice::AlreadyFeeding);
        return false;
    }
    ctx.command(MenuCommand::StartFeed);
    ctx.tone(Tone::Confirm);
    ctx.notice(Notice::FeedingManually);
    true
}

// ═══════════════════════════════════════════════════════════════
//  MAIN_MENU
// ═══════════════════════════════════════════════════════════════

fn main_menu_update(ctx: &mut MenuContext) -> Option<Screen> {
    let input = ctx.input;

    if input.long(ButtonId::Select) {
        ctx.tone(Tone::Click);
        return Some(Screen::Clock);
    }
    if input.stepped(ButtonId::Up) {
        ctx.selected = ctx.selected.prev();
        ctx.tone(Tone::Click);
        ctx.repaint = true;
    }
    if input.stepped(ButtonId::Down) {
        ctx.selected = ctx.selected.next();
        ctx.tone(Tone::Click);
        ctx.repaint = true;
    }
    if input.tapped(ButtonId::Confirm) {
        return dispatch(ctx);
    }
    None
}

/// The single dispatch site for the nine menu actions.
fn dispatch(ctx: &mut MenuContext) -> Option<Screen> {
    match ctx.selected {
        MenuAction::ViewSchedules => {
            ctx.tone(Tone::Click);
            Some(Screen::ViewSchedules)
        }
        MenuAction::EditSchedule(entry) => {
            ctx.edit_target = entry;
            ctx.tone(Tone::Click);
            Some(Screen::EditSchedule)
        }
        MenuAction::FeedNow => request_feed(ctx).then_some(Screen::Feeding),
        MenuAction::ViewStatus => {
            ctx.tone(Tone::Click);
            Some(Screen::Status)
        }
        MenuAction::AdjustTime => {
            ctx.tone(Tone::Click);
            Some(Screen::TimeAdjust)
        }
        MenuAction::Exit => {
            ctx.tone(Tone::Click);
            Some(Screen::Clock)
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  VIEW_SCHEDULES / STATUS
// ═══════════════════════════════════════════════════════════════

fn read_only_update(ctx: &mut MenuContext) -> Option<Screen> {
    if ctx.input.tapped(ButtonId::Select) || ctx.input.tapped(ButtonId::Confirm) {
        ctx.tone(Tone::Click);
        return Some(Screen::MainMenu);
    }
    None
}

// ═══════════════════════════════════════════════════════════════
//  Shared editor driving
// ═══════════════════════════════════════════════════════════════

/// What one cycle of input did to an editor.
enum EditStep {
    Idle,
    Changed,
    Cancel,
    Save,
}

/// Apply one cycle of edges to `editor`.
///
/// SELECT-long cancels, UP/DOWN (and repeat) step the current field,
/// SELECT or CONFIRM advance the cursor, except CONFIRM on SAVE which
/// asks to commit.
fn drive_editor<D: EditForm>(editor: &mut FieldEditor<D>, input: &ButtonEdges) -> EditStep {
    if input.long(ButtonId::Select) {
        return EditStep::Cancel;
    }

    let mut changed = false;
    if input.stepped(ButtonId::Up) {
        editor.increment();
        changed = true;
    }
    if input.stepped(ButtonId::Down) {
        editor.decrement();
        changed = true;
    }
    if input.tapped(ButtonId::Confirm) && editor.at_save() {
        return EditStep::Save;
    }
    if input.tapped(ButtonId::Select) || input.tapped(ButtonId::Confirm) {
        editor.advance();
        changed = true;
    }

    if changed { EditStep::Changed } else { EditStep::Idle }
}

fn close_session(ctx: &mut MenuContext) {
    ctx.session = EditSession::None;
}

// ═══════════════════════════════════════════════════════════════
//  EDIT_SCHEDULE
// ═══════════════════════════════════════════════════════════════

fn edit_schedule_enter(ctx: &mut MenuContext) {
    let entry = ctx.edit_target;
    let Some(current) = ctx.schedules.get((entry as usize).wrapping_sub(1)).copied() else {
        ctx.session = EditSession::None;
        return;
    };
    ctx.session = EditSession::Schedule {
        entry,
        editor: FieldEditor::new(ScheduleDraft::from(current)),
    };
}

fn edit_schedule_update(ctx: &mut MenuContext) -> Option<Screen> {
    let EditSession::Schedule { entry, mut editor } = ctx.session else {
        // No session (bad target): nothing to edit.
        return Some(Screen::MainMenu);
    };

    let step = drive_editor(&mut editor, &ctx.input);
    ctx.session = EditSession::Schedule { entry, editor };

    match step {
        EditStep::Idle => None,
        EditStep::Changed => {
            ctx.tone(Tone::Click);
            ctx.repaint = true;
            None
        }
        EditStep::Cancel => {
            ctx.tone(Tone::Error);
            ctx.notice(Notice::EditCancelled);
            Some(Screen::MainMenu)
        }
        EditStep::Save => {
            let draft = editor.draft();
            ctx.command(MenuCommand::SaveSchedule {
                entry,
                hour: draft.hour,
                minute: draft.minute,
                enabled: draft.enabled,
            });
            ctx.tone(Tone::Confirm);
            ctx.notice(Notice::ScheduleSaved);
            Some(Screen::MainMenu)
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  FEEDING
// ═══════════════════════════════════════════════════════════════

fn feeding_update(ctx: &mut MenuContext) -> Option<Screen> {
    if ctx.input.tapped(ButtonId::Select) {
        ctx.command(MenuCommand::StopFeed);
        ctx.tone(Tone::Click);
        ctx.notice(Notice::FeedStopped);
        return Some(Screen::MainMenu);
    }
    if !ctx.feed.active {
        ctx.tone(Tone::Confirm);
        ctx.notice(Notice::FeedCompleted);
        return Some(Screen::MainMenu);
    }
    None
}

// ═══════════════════════════════════════════════════════════════
//  TIME_ADJUST
// ═══════════════════════════════════════════════════════════════

fn time_adjust_enter(ctx: &mut MenuContext) {
    ctx.session = EditSession::Time(FieldEditor::new(TimeDraft::from(ctx.now)));
}

fn time_adjust_update(ctx: &mut MenuContext) -> Option<Screen> {
    let EditSession::Time(mut editor) = ctx.session else {
        return Some(Screen::MainMenu);
    };

    let step = drive_editor(&mut editor, &ctx.input);
    ctx.session = EditSession::Time(editor);

    match step {
        EditStep::Idle => None,
        EditStep::Changed => {
            ctx.tone(Tone::Click);
            ctx.repaint = true;
            None
        }
        EditStep::Cancel => {
            ctx.tone(Tone::Error);
            ctx.notice(Notice::AdjustCancelled);
            Some(Screen::MainMenu)
        }
        EditStep::Save => match editor.finish() {
            Ok(draft) => {
                ctx.command(MenuCommand::AdjustClock(draft.to_datetime()));
                ctx.tone(Tone::Confirm);
                ctx.notice(Notice::ClockAdjusted);
                Some(Screen::MainMenu)
            }
            Err(_) => {
                // Keep the draft on screen for correction.
                ctx.tone(Tone::Error);
                ctx.notice(Notice::InvalidDate);
                ctx.repaint = true;
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::Fsm;
    use super::super::context::{Feedback, FeedStatus};
    use super::*;
    use crate::clock::DateTime;
    use crate::config::SystemConfig;
    use crate::fsm::editor::{ScheduleField, TimeField};

    fn setup(screen: Screen) -> (Fsm, MenuContext) {
        let mut fsm = Fsm::new(build_screen_table(), Screen::Clock, 30_000);
        let mut ctx = MenuContext::new(SystemConfig::default().default_schedules);
        fsm.start(&mut ctx);
        fsm.force_transition(screen, &mut ctx);
        ctx.feedback.clear();
        (fsm, ctx)
    }

    /// One cycle; feedback from earlier cycles is discarded like the
    /// service does after every tick.
    fn press(fsm: &mut Fsm, ctx: &mut MenuContext, input: ButtonEdges) {
        ctx.feedback.clear();
        ctx.input = input;
        fsm.tick(ctx);
        ctx.input = ButtonEdges::default();
    }

    fn tap(id: ButtonId) -> ButtonEdges {
        ButtonEdges::default().with_tap(id)
    }

    fn long(id: ButtonId) -> ButtonEdges {
        ButtonEdges::default().with_long(id)
    }

    fn schedule_field(ctx: &MenuContext) -> ScheduleField {
        match ctx.session {
            EditSession::Schedule { editor, .. } => editor.field(),
            other => panic!("no schedule session: {other:?}"),
        }
    }

    #[test]
    fn table_order_matches_discriminants() {
        for (i, row) in build_screen_table().iter().enumerate() {
            assert_eq!(row.id as usize, i, "row {} ({})", i, row.name);
        }
    }

    #[test]
    fn menu_cycles_with_wraparound_including_repeat() {
        let (mut fsm, mut ctx) = setup(Screen::MainMenu);
        ctx.selected = MenuAction::ViewSchedules;
        press(&mut fsm, &mut ctx, tap(ButtonId::Up));
        assert_eq!(ctx.selected, MenuAction::Exit);
        press(&mut fsm, &mut ctx, ButtonEdges::default().with_repeat(ButtonId::Down));
        assert_eq!(ctx.selected, MenuAction::ViewSchedules);
        press(&mut fsm, &mut ctx, tap(ButtonId::Down));
        assert_eq!(ctx.selected, MenuAction::EditSchedule(1));
    }

    #[test]
    fn menu_dispatches_each_action() {
        let cases = [
            (MenuAction::ViewSchedules, Screen::ViewSchedules),
            (MenuAction::EditSchedule(4), Screen::EditSchedule),
            (MenuAction::FeedNow, Screen::Feeding),
            (MenuAction::ViewStatus, Screen::Status),
            (MenuAction::AdjustTime, Screen::TimeAdjust),
            (MenuAction::Exit, Screen::Clock),
        ];
        for (action, expected) in cases {
            let (mut fsm, mut ctx) = setup(Screen::MainMenu);
            ctx.selected = action;
            press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));
            assert_eq!(fsm.current_screen(), expected, "{action:?}");
        }
    }

    #[test]
    fn menu_select_long_exits_to_clock() {
        let (mut fsm, mut ctx) = setup(Screen::MainMenu);
        press(&mut fsm, &mut ctx, long(ButtonId::Select));
        assert_eq!(fsm.current_screen(), Screen::Clock);
    }

    #[test]
    fn feed_now_while_feeding_stays_in_menu() {
        let (mut fsm, mut ctx) = setup(Screen::MainMenu);
        ctx.selected = MenuAction::FeedNow;
        ctx.feed = FeedStatus {
            active: true,
            remaining_secs: 5,
        };
        press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));
        assert_eq!(fsm.current_screen(), Screen::MainMenu);
        assert!(ctx.commands.is_empty());
        assert!(ctx.feedback.contains(&Feedback::Notice(Notice::AlreadyFeeding)));
    }

    #[test]
    fn clock_confirm_while_feeding_is_refused() {
        let (mut fsm, mut ctx) = setup(Screen::Clock);
        ctx.feed.active = true;
        press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));
        assert!(ctx.commands.is_empty());
        assert!(ctx.feedback.contains(&Feedback::Tone(Tone::Error)));
    }

    #[test]
    fn read_only_screens_return_to_menu() {
        for screen in [Screen::ViewSchedules, Screen::Status] {
            for button in [ButtonId::Select, ButtonId::Confirm] {
                let (mut fsm, mut ctx) = setup(screen);
                press(&mut fsm, &mut ctx, tap(button));
                assert_eq!(fsm.current_screen(), Screen::MainMenu);
            }
            let (mut fsm, mut ctx) = setup(screen);
            press(&mut fsm, &mut ctx, tap(ButtonId::Up));
            assert_eq!(fsm.current_screen(), screen);
        }
    }

    #[test]
    fn edit_entry_3_saves_incremented_hour() {
        let (mut fsm, mut ctx) = setup(Screen::MainMenu);
        ctx.selected = MenuAction::EditSchedule(3);
        press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));
        assert_eq!(fsm.current_screen(), Screen::EditSchedule);
        assert_eq!(schedule_field(&ctx), ScheduleField::Hour);

        press(&mut fsm, &mut ctx, tap(ButtonId::Up));
        press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        assert_eq!(schedule_field(&ctx), ScheduleField::Save);
        press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));

        assert_eq!(fsm.current_screen(), Screen::MainMenu);
        assert_eq!(ctx.session, EditSession::None);
        assert_eq!(
            ctx.commands.as_slice(),
            &[MenuCommand::SaveSchedule {
                entry: 3,
                hour: 19,
                minute: 0,
                enabled: true
            }]
        );
    }

    #[test]
    fn confirm_advances_until_save() {
        let (mut fsm, mut ctx) = setup(Screen::MainMenu);
        ctx.selected = MenuAction::EditSchedule(1);
        press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));
        for _ in 0..3 {
            press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));
        }
        assert_eq!(schedule_field(&ctx), ScheduleField::Save);
        assert!(ctx.commands.is_empty());
    }

    #[test]
    fn edit_cancel_commits_nothing() {
        let (mut fsm, mut ctx) = setup(Screen::MainMenu);
        ctx.selected = MenuAction::EditSchedule(3);
        press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));
        press(&mut fsm, &mut ctx, tap(ButtonId::Up));
        press(&mut fsm, &mut ctx, long(ButtonId::Select));
        assert_eq!(fsm.current_screen(), Screen::MainMenu);
        assert_eq!(ctx.session, EditSession::None);
        assert!(ctx.commands.is_empty());
        assert!(ctx.feedback.contains(&Feedback::Notice(Notice::EditCancelled)));
    }

    #[test]
    fn feeding_select_stops_and_returns() {
        let (mut fsm, mut ctx) = setup(Screen::Feeding);
        ctx.feed.active = true;
        press(&mut fsm, &mut ctx, ButtonEdges::default());
        assert_eq!(fsm.current_screen(), Screen::Feeding);
        press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        assert_eq!(fsm.current_screen(), Screen::MainMenu);
        assert_eq!(ctx.commands.as_slice(), &[MenuCommand::StopFeed]);
    }

    #[test]
    fn feeding_returns_when_actuator_finishes() {
        let (mut fsm, mut ctx) = setup(Screen::Feeding);
        ctx.feed.active = false;
        press(&mut fsm, &mut ctx, ButtonEdges::default());
        assert_eq!(fsm.current_screen(), Screen::MainMenu);
        assert!(ctx.feedback.contains(&Feedback::Notice(Notice::FeedCompleted)));
    }

    #[test]
    fn time_adjust_rejects_invalid_date_and_keeps_draft() {
        let (mut fsm, mut ctx) = setup(Screen::Clock);
        ctx.now = DateTime::new(2023, 1, 29, 10, 15, 30).unwrap();
        fsm.force_transition(Screen::TimeAdjust, &mut ctx);

        // HOUR -> MINUTE -> DAY -> MONTH, bump month to February.
        for _ in 0..3 {
            press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        }
        press(&mut fsm, &mut ctx, tap(ButtonId::Up));
        press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));

        assert_eq!(fsm.current_screen(), Screen::TimeAdjust);
        assert!(ctx.commands.is_empty());
        assert!(ctx.feedback.contains(&Feedback::Notice(Notice::InvalidDate)));
        let EditSession::Time(editor) = ctx.session else {
            panic!("time session dropped");
        };
        assert_eq!(editor.field(), TimeField::Save);
        assert_eq!((editor.draft().day, editor.draft().month), (29, 2));

        // Back to DAY (wrap through HOUR, MINUTE), step down to 28, save.
        for _ in 0..3 {
            press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        }
        press(&mut fsm, &mut ctx, tap(ButtonId::Down));
        for _ in 0..3 {
            press(&mut fsm, &mut ctx, tap(ButtonId::Select));
        }
        press(&mut fsm, &mut ctx, tap(ButtonId::Confirm));

        assert_eq!(fsm.current_screen(), Screen::MainMenu);
        assert_eq!(
            ctx.commands.as_slice(),
            &[MenuCommand::AdjustClock(
                DateTime::new(2023, 2, 28, 10, 15, 0).unwrap()
            )]
        );
    }
}
