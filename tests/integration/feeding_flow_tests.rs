//! Feed actuation end to end: schedule, buttons, console, safety stop.

use super::mock_hw::Bench;

use fishfeeder::app::events::{AppEvent, FeedSource};
use fishfeeder::drivers::feeder::FeedStop;
use fishfeeder::error::Error;
use fishfeeder::fsm::Screen;
use fishfeeder::fsm::context::Notice;
use fishfeeder::pins::{
    self, BUTTON_CONFIRM_GPIO as CONFIRM, BUTTON_DOWN_GPIO as DOWN, BUTTON_SELECT_GPIO as SELECT,
};

fn scheduled_starts(bench: &Bench, entry: u8) -> usize {
    bench
        .sink
        .count(|e| *e == AppEvent::FeedStarted(FeedSource::Schedule(entry)))
}

#[test]
fn schedule_fires_once_at_its_minute() {
    let mut bench = Bench::at(7, 59, 50);
    bench.run_ms(9_900);
    assert!(!bench.app.feeder().is_active());

    bench.run_ms(200);
    assert!(bench.app.feeder().is_active());
    assert_eq!(bench.hw.relays_closed(), 4);
    assert!(bench.hw.output(pins::STATUS_LED_GPIO));

    bench.run_ms(10_000);
    assert!(!bench.app.feeder().is_active());
    assert_eq!(bench.hw.relays_closed(), 0);
    assert!(!bench.hw.output(pins::STATUS_LED_GPIO));
    assert!(bench.sink.saw(&AppEvent::FeedStopped(FeedStop::Completed)));

    // Rest of 08:00 passes without a second trigger.
    bench.run_ms(60_000);
    assert_eq!(scheduled_starts(&bench, 1), 1);
}

#[test]
fn disabled_entry_never_fires() {
    let mut bench = Bench::at(7, 59, 50);
    let _ = bench.console("set 1 off");
    bench.run_ms(30_000);
    assert_eq!(scheduled_starts(&bench, 1), 0);
    assert!(!bench.app.feeder().is_active());
}

#[test]
fn double_start_keeps_the_original_timer() {
    let mut bench = Bench::at(10, 0, 0);
    let (r, _) = bench.console("feed");
    assert!(r.is_ok());

    bench.run_ms(5_000);
    let (r, out) = bench.console("feed");
    assert_eq!(r, Err(Error::AlreadyFeeding));
    assert!(out.contains("5 s left"));

    bench.run_ms(4_900);
    assert!(bench.app.feeder().is_active());
    bench.run_ms(100);
    assert!(!bench.app.feeder().is_active());
}

#[test]
fn schedule_during_manual_feed_is_rejected_not_queued() {
    let mut bench = Bench::at(7, 59, 55);
    let _ = bench.console("feed");
    bench.run_ms(10_000);

    assert!(bench.sink.saw(&AppEvent::FeedRejected {
        source: FeedSource::Schedule(1),
        reason: Error::AlreadyFeeding,
    }));
    bench.run_ms(20_000);
    assert_eq!(scheduled_starts(&bench, 1), 0);
}

#[test]
fn stalled_loop_trips_the_safety_ceiling() {
    let mut bench = Bench::at(10, 0, 0);
    let _ = bench.console("feed");
    bench.step(31_000);

    assert!(!bench.app.feeder().is_active());
    assert_eq!(bench.hw.relays_closed(), 0);
    assert!(bench.sink.saw(&AppEvent::FeedStopped(FeedStop::SafetyCeiling)));
    assert!(!bench.sink.saw(&AppEvent::FeedStopped(FeedStop::Completed)));
}

#[test]
fn menu_feed_now_then_select_stops() {
    let mut bench = Bench::at(10, 0, 0);
    bench.tap(SELECT);
    for _ in 0..5 {
        bench.tap(DOWN); // option 1 -> 6, feed now
    }
    bench.tap(CONFIRM);
    assert_eq!(bench.app.screen(), Screen::Feeding);
    assert!(bench.sink.saw(&AppEvent::FeedStarted(FeedSource::Button)));
    assert!(bench.display.last_frame().row(0).contains("FEEDING"));

    bench.tap(SELECT);
    assert_eq!(bench.app.screen(), Screen::MainMenu);
    assert!(!bench.app.feeder().is_active());
    assert_eq!(bench.hw.relays_closed(), 0);
    assert!(bench.sink.saw(&AppEvent::FeedStopped(FeedStop::Cancelled)));
}

#[test]
fn feeding_screen_returns_to_menu_when_done() {
    let mut bench = Bench::at(10, 0, 0);
    bench.tap(SELECT);
    for _ in 0..5 {
        bench.tap(DOWN);
    }
    bench.tap(CONFIRM);
    bench.run_ms(10_500);

    assert_eq!(bench.app.screen(), Screen::MainMenu);
    assert!(bench.sink.saw(&AppEvent::Notice(Notice::FeedCompleted)));
}

#[test]
fn confirm_on_clock_while_feeding_sounds_error() {
    let mut bench = Bench::at(10, 0, 0);
    let _ = bench.console("feed");
    bench.tap(CONFIRM);

    assert!(bench.sink.saw(&AppEvent::Notice(Notice::AlreadyFeeding)));
    assert_eq!(
        bench
            .sink
            .count(|e| *e == AppEvent::FeedStarted(FeedSource::Button)),
        0
    );
}

#[test]
fn button_tone_drives_the_buzzer_pin() {
    let mut bench = Bench::at(10, 0, 0);
    bench.hw.hold(SELECT);
    bench.run_ms(100);
    assert!(bench.hw.output(pins::BUZZER_GPIO));
    bench.hw.let_go(SELECT);
    bench.run_ms(300);
    assert!(!bench.hw.output(pins::BUZZER_GPIO));
}

#[test]
fn console_feed_reports_start_and_completion() {
    let mut bench = Bench::at(10, 0, 0);
    let _ = bench.console("feed");
    bench.run_ms(10_500);

    let feed_events: Vec<_> = bench
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::FeedStarted(_) | AppEvent::FeedStopped(_)))
        .cloned()
        .collect();
    assert_eq!(
        feed_events,
        [
            AppEvent::FeedStarted(FeedSource::Console),
            AppEvent::FeedStopped(FeedStop::Completed),
        ]
    );
}

#[test]
fn console_stop_reports_cancel_only_when_feeding() {
    let mut bench = Bench::at(10, 0, 0);
    let _ = bench.console("stop");
    assert!(!bench.sink.saw(&AppEvent::FeedStopped(FeedStop::Cancelled)));

    let _ = bench.console("feed");
    let _ = bench.console("stop");
    bench.run_ms(11_000);
    assert_eq!(
        bench
            .sink
            .count(|e| matches!(e, AppEvent::FeedStopped(_))),
        1
    );
    assert!(bench.sink.saw(&AppEvent::FeedStopped(FeedStop::Cancelled)));
}
