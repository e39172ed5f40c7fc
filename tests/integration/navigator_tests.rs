//! Menu navigation driven through real button pin levels.

use super::mock_hw::Bench;

use fishfeeder::app::events::AppEvent;
use fishfeeder::clock::DateTime;
use fishfeeder::fsm::Screen;
use fishfeeder::fsm::context::Notice;
use fishfeeder::pins::{
    BUTTON_CONFIRM_GPIO as CONFIRM, BUTTON_DOWN_GPIO as DOWN, BUTTON_SELECT_GPIO as SELECT,
    BUTTON_UP_GPIO as UP,
};
use fishfeeder::scheduler::ScheduleEntry;

fn open_menu(bench: &mut Bench) {
    bench.tap(SELECT);
    assert_eq!(bench.app.screen(), Screen::MainMenu);
}

/// From a fresh menu (cursor on option 1), open the editor for entry 3.
fn open_editor_3(bench: &mut Bench) {
    open_menu(bench);
    for _ in 0..3 {
        bench.tap(DOWN);
    }
    bench.tap(CONFIRM);
    assert_eq!(bench.app.screen(), Screen::EditSchedule);
}

#[test]
fn select_opens_menu_and_paints_it() {
    let mut bench = Bench::at(10, 0, 0);
    open_menu(&mut bench);
    let frame = bench.display.last_frame();
    assert!(frame.row(0).contains("MENU"));
    assert!(bench.sink.saw(&AppEvent::ScreenChanged {
        from: Screen::Clock,
        to: Screen::MainMenu,
    }));
}

#[test]
fn edit_entry_3_save_flow() {
    let mut bench = Bench::at(10, 0, 0);
    open_editor_3(&mut bench);
    assert!(bench.display.last_frame().row(0).contains("EDIT H3"));

    bench.tap(UP); // hour 18 -> 19
    for _ in 0..3 {
        bench.tap(SELECT); // minute, state, save
    }
    bench.tap(CONFIRM);

    assert_eq!(bench.app.screen(), Screen::MainMenu);
    assert_eq!(bench.app.scheduler().entry(3), Some(ScheduleEntry::new(19, 0)));
    assert!(bench.sink.saw(&AppEvent::ScheduleUpdated {
        entry: 3,
        hour: 19,
        minute: 0,
        enabled: true,
    }));
    assert!(bench.sink.saw(&AppEvent::Notice(Notice::ScheduleSaved)));
}

#[test]
fn edit_entry_3_long_select_cancels() {
    let mut bench = Bench::at(10, 0, 0);
    open_editor_3(&mut bench);
    bench.tap(UP);
    bench.long_press(SELECT);

    assert_eq!(bench.app.screen(), Screen::MainMenu);
    assert_eq!(bench.app.scheduler().entry(3), Some(ScheduleEntry::new(18, 0)));
    assert_eq!(
        bench.sink.count(|e| matches!(e, AppEvent::ScheduleUpdated { .. })),
        0
    );
    assert!(bench.sink.saw(&AppEvent::Notice(Notice::EditCancelled)));
}

#[test]
fn disabling_an_entry_from_the_editor() {
    let mut bench = Bench::at(10, 0, 0);
    open_editor_3(&mut bench);
    bench.tap(SELECT);
    bench.tap(SELECT);
    bench.tap(DOWN); // state ON -> OFF
    bench.tap(SELECT);
    bench.tap(CONFIRM);

    let entry = bench.app.scheduler().entry(3);
    assert_eq!(entry.map(|e| e.enabled), Some(false));
    assert_eq!(bench.app.scheduler().enabled_count(), 3);
}

#[test]
fn view_screen_times_out_to_clock() {
    let mut bench = Bench::at(10, 0, 0);
    open_menu(&mut bench);
    bench.tap(CONFIRM); // option 1: view schedules
    assert_eq!(bench.app.screen(), Screen::ViewSchedules);

    bench.run_ms(29_000);
    assert_eq!(bench.app.screen(), Screen::ViewSchedules);
    bench.run_ms(2_000);
    assert_eq!(bench.app.screen(), Screen::Clock);
    assert!(bench.sink.saw(&AppEvent::Notice(Notice::ReturnedToClock)));
}

#[test]
fn editor_timeout_discards_the_draft() {
    let mut bench = Bench::at(10, 0, 0);
    open_editor_3(&mut bench);
    bench.tap(UP);
    bench.run_ms(31_000);

    assert_eq!(bench.app.screen(), Screen::Clock);
    assert_eq!(bench.app.scheduler().entry(3), Some(ScheduleEntry::new(18, 0)));
}

#[test]
fn held_button_keeps_menu_alive() {
    let mut bench = Bench::at(10, 0, 0);
    open_menu(&mut bench);
    // Auto-repeat on DOWN counts as activity.
    bench.hw.hold(DOWN);
    bench.run_ms(40_000);
    bench.hw.let_go(DOWN);
    bench.run_ms(200);
    assert_eq!(bench.app.screen(), Screen::MainMenu);
}

#[test]
fn adjust_time_from_menu() {
    let mut bench = Bench::at(12, 0, 0);
    open_menu(&mut bench);
    bench.tap(UP); // 1 -> 9 (exit)
    bench.tap(UP); // 9 -> 8 (adjust time)
    bench.tap(CONFIRM);
    assert_eq!(bench.app.screen(), Screen::TimeAdjust);

    bench.tap(UP); // hour 12 -> 13
    for _ in 0..5 {
        bench.tap(SELECT); // minute, day, month, year, save
    }
    bench.tap(CONFIRM);

    let expected = DateTime {
        hour: 13,
        minute: 0,
        second: 0,
        ..DateTime::DEFAULT
    };
    assert_eq!(bench.app.screen(), Screen::MainMenu);
    assert_eq!(bench.clock.adjusted, vec![expected]);
    assert!(bench.sink.saw(&AppEvent::ClockAdjusted(expected)));
}
