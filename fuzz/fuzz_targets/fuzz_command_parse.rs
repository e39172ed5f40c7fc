//! Fuzz target: `AppCommand::parse`
//!
//! Arbitrary UTF-8 lines must parse to a command, an empty result, or a
//! typed error. Accepted entry numbers must be in range.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use fishfeeder::app::commands::{AppCommand, Target};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    match AppCommand::parse(line) {
        Ok(Some(AppCommand::SetTime { entry, hour, minute })) => {
            assert!((1..=4).contains(&entry));
            assert!(hour < 24 && minute < 60);
        }
        Ok(Some(AppCommand::SetOff { entry }))
        | Ok(Some(AppCommand::Enable(Target::Entry(entry))))
        | Ok(Some(AppCommand::Disable(Target::Entry(entry)))) => {
            assert!((1..=4).contains(&entry));
        }
        Ok(None) => assert!(line.trim().is_empty()),
        _ => {}
    }
});
