//! Serial console: byte stream → lines → commands → replies.

use super::mock_hw::Bench;

use fishfeeder::adapters::console::LineReader;
use fishfeeder::app::commands::SET_USAGE;
use fishfeeder::error::{CommandError, Error};
use fishfeeder::pins;
use fishfeeder::scheduler::ScheduleEntry;

/// Push raw bytes through a line reader and collect the replies.
fn type_in(bench: &mut Bench, bytes: &[u8]) -> Vec<String> {
    let mut reader = LineReader::new();
    let mut replies = Vec::new();
    for &b in bytes {
        if let Some(line) = reader.push(b) {
            let (_, out) = bench.console(&line);
            replies.push(out);
        }
    }
    replies
}

#[test]
fn crlf_session_runs_each_command_once() {
    let mut bench = Bench::at(10, 0, 0);
    let replies = type_in(&mut bench, b"set 2 09:15\r\nschedules\r\n");
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], "H2 set to 09:15 (enabled)\n");
    assert!(replies[1].contains("H2: 09:15 enabled"));
    assert!(replies[1].contains("Feed duration: 10 s"));
}

#[test]
fn time_reports_weekday_and_date() {
    let mut bench = Bench::at(12, 0, 0);
    let (r, out) = bench.console("time");
    assert!(r.is_ok());
    assert_eq!(out, "Time: Monday 01/01/2024 12:00:00\n");
}

#[test]
fn help_lists_every_command() {
    let mut bench = Bench::at(10, 0, 0);
    let (_, out) = bench.console("?");
    for word in [
        "help", "time", "schedules", "status", "feed", "stop", "next", "set X HH:MM", "set X off",
        "enable", "disable", "test relay", "test led",
    ] {
        assert!(out.contains(word), "missing {word}");
    }
}

#[test]
fn set_rejects_bad_input_without_change() {
    let mut bench = Bench::at(10, 0, 0);
    let before = *bench.app.scheduler().entries();

    let (r, out) = bench.console("set 2 7:30");
    assert_eq!(r, Err(Error::Command(CommandError::InvalidTimeFormat)));
    assert!(out.starts_with("Error: "));

    let (r, _) = bench.console("set 2 24:00");
    assert_eq!(r, Err(Error::Command(CommandError::InvalidTimeFormat)));

    let (r, _) = bench.console("set 5 08:00");
    assert_eq!(r, Err(Error::Command(CommandError::InvalidEntry)));

    let (r, _) = bench.console("set 2");
    assert_eq!(r, Err(Error::Command(CommandError::Usage(SET_USAGE))));

    assert_eq!(*bench.app.scheduler().entries(), before);
}

#[test]
fn unknown_command_is_reported() {
    let mut bench = Bench::at(10, 0, 0);
    let (r, out) = bench.console("dance");
    assert_eq!(r, Err(Error::Command(CommandError::Unknown)));
    assert!(out.contains("unknown command"));
}

#[test]
fn set_force_enables_a_disabled_entry() {
    let mut bench = Bench::at(10, 0, 0);
    let _ = bench.console("set 4 off");
    assert_eq!(bench.app.scheduler().enabled_count(), 3);
    let _ = bench.console("set 4 21:45");
    assert_eq!(bench.app.scheduler().entry(4), Some(ScheduleEntry::new(21, 45)));
    assert_eq!(bench.app.scheduler().enabled_count(), 4);
}

#[test]
fn next_wraps_past_midnight() {
    let mut bench = Bench::at(23, 30, 0);
    let (_, out) = bench.console("next");
    assert_eq!(out, "Next feed: H1 at 08:00, in 8 h 30 min\n");
}

#[test]
fn status_while_feeding() {
    let mut bench = Bench::at(10, 0, 0);
    let _ = bench.console("feed");
    bench.run_ms(3_000);
    let (_, out) = bench.console("status");
    assert!(out.contains("Relays: ON"));
    assert!(out.contains("Feeding: 7 s left"));
    assert!(out.contains("Schedules enabled: 4/4"));
    assert!(out.contains("Next feed: H2 at 12:55"));
}

#[test]
fn relay_test_blocks_then_opens() {
    let mut bench = Bench::at(10, 0, 0);
    let (r, out) = bench.console("test relay");
    assert!(r.is_ok());
    assert_eq!(out, "Relay test complete\n");
    assert_eq!(bench.hw.delayed_ms, 3_000);
    assert_eq!(bench.hw.relays_closed(), 0);
    let closed = bench
        .hw
        .writes
        .iter()
        .filter(|&&(pin, high)| pins::RELAY_GPIOS.contains(&pin) && high)
        .count();
    assert_eq!(closed, 4);
}

#[test]
fn led_test_blinks_five_times() {
    let mut bench = Bench::at(10, 0, 0);
    let _ = bench.console("test led");
    let blinks = bench
        .hw
        .writes
        .iter()
        .filter(|&&w| w == (pins::STATUS_LED_GPIO, true))
        .count();
    assert_eq!(blinks, 5);
    assert_eq!(bench.hw.delayed_ms, 5 * 2 * 300);
    assert!(!bench.hw.output(pins::STATUS_LED_GPIO));
}

#[test]
fn console_change_repaints_clock() {
    let mut bench = Bench::at(10, 0, 0);
    let before = bench.display.paints.len();
    let _ = bench.console("disable all");
    bench.step(100);
    assert_eq!(bench.display.paints.len(), before + 1);
    assert!(bench.display.last_frame().row(3).contains("No schedules"));
}
