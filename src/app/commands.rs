//! Inbound console commands.
//!
//! A serial line is parsed into an [`AppCommand`] here and executed by
//! [`AppService::handle_command`](super::service::AppService::handle_command).
//! Parsing is pure: no clock, no pins, no allocation.

use crate::error::CommandError;
use crate::scheduler::ENTRY_COUNT;

/// Schedule selector for `enable` / `disable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Entry(u8),
}

/// Commands the serial console can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Help,
    Time,
    Schedules,
    Status,
    /// Manual feed.
    Feed,
    /// Emergency stop.
    Stop,
    Next,
    SetTime { entry: u8, hour: u8, minute: u8 },
    SetOff { entry: u8 },
    Enable(Target),
    Disable(Target),
    /// Close all relays for 3 s.  Blocks.
    TestRelay,
    /// Blink the status LED.  Blocks.
    TestLed,
}

pub const SET_USAGE: &str = "set X HH:MM | set X off";
pub const ENABLE_USAGE: &str = "enable X|all";
pub const DISABLE_USAGE: &str = "disable X|all";
pub const TEST_USAGE: &str = "test relay | test led";

impl AppCommand {
    /// Parse one console line.  Case-insensitive, surrounding whitespace
    /// ignored.  A blank line is `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg1 = words.next();
        let arg2 = words.next();
        let extra = words.next().is_some();

        let is = |word: &str, name: &str| word.eq_ignore_ascii_case(name);
        let bare = |cmd: Self| {
            if arg1.is_none() {
                Ok(Some(cmd))
            } else {
                Err(CommandError::Unknown)
            }
        };

        if is(head, "help") || head == "?" {
            return bare(Self::Help);
        }
        if is(head, "time") {
            return bare(Self::Time);
        }
        if is(head, "schedules") {
            return bare(Self::Schedules);
        }
        if is(head, "status") {
            return bare(Self::Status);
        }
        if is(head, "feed") {
            return bare(Self::Feed);
        }
        if is(head, "stop") {
            return bare(Self::Stop);
        }
        if is(head, "next") {
            return bare(Self::Next);
        }

        if is(head, "set") {
            let (Some(entry), Some(value), false) = (arg1, arg2, extra) else {
                return Err(CommandError::Usage(SET_USAGE));
            };
            let entry = parse_entry(entry)?;
            if is(value, "off") {
                return Ok(Some(Self::SetOff { entry }));
            }
            let (hour, minute) = parse_hhmm(value)?;
            return Ok(Some(Self::SetTime {
                entry,
                hour,
                minute,
            }));
        }

        if is(head, "enable") || is(head, "disable") {
            let enable = is(head, "enable");
            let usage = if enable { ENABLE_USAGE } else { DISABLE_USAGE };
            let (Some(which), None) = (arg1, arg2) else {
                return Err(CommandError::Usage(usage));
            };
            let target = if is(which, "all") {
                Target::All
            } else {
                Target::Entry(parse_entry(which)?)
            };
            return Ok(Some(if enable {
                Self::Enable(target)
            } else {
                Self::Disable(target)
            }));
        }

        if is(head, "test") {
            return match (arg1, arg2) {
                (Some(what), None) if is(what, "relay") => Ok(Some(Self::TestRelay)),
                (Some(what), None) if is(what, "led") => Ok(Some(Self::TestLed)),
                _ => Err(CommandError::Usage(TEST_USAGE)),
            };
        }

        Err(CommandError::Unknown)
    }
}

fn parse_entry(word: &str) -> Result<u8, CommandError> {
    match word.parse::<u8>() {
        Ok(n) if (1..=ENTRY_COUNT as u8).contains(&n) => Ok(n),
        _ => Err(CommandError::InvalidEntry),
    }
}

/// Strict `HH:MM`: five characters, colon at index 2, both halves in range.
fn parse_hhmm(word: &str) -> Result<(u8, u8), CommandError> {
    let bytes = word.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(CommandError::InvalidTimeFormat);
    }
    let two_digits = |hi: u8, lo: u8| -> Option<u8> {
        if hi.is_ascii_digit() && lo.is_ascii_digit() {
            Some((hi - b'0') * 10 + (lo - b'0'))
        } else {
            None
        }
    };
    match (two_digits(bytes[0], bytes[1]), two_digits(bytes[3], bytes[4])) {
        (Some(h), Some(m)) if h < 24 && m < 60 => Ok((h, m)),
        _ => Err(CommandError::InvalidTimeFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(line: &str) -> AppCommand {
        AppCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(AppCommand::parse(""), Ok(None));
        assert_eq!(AppCommand::parse("   \t "), Ok(None));
    }

    #[test]
    fn simple_commands_ignore_case_and_padding() {
        assert_eq!(ok("help"), AppCommand::Help);
        assert_eq!(ok("?"), AppCommand::Help);
        assert_eq!(ok("  TIME  "), AppCommand::Time);
        assert_eq!(ok("Schedules"), AppCommand::Schedules);
        assert_eq!(ok("status"), AppCommand::Status);
        assert_eq!(ok("FEED"), AppCommand::Feed);
        assert_eq!(ok("stop"), AppCommand::Stop);
        assert_eq!(ok("next"), AppCommand::Next);
        assert_eq!(ok("Test Relay"), AppCommand::TestRelay);
        assert_eq!(ok("test LED"), AppCommand::TestLed);
    }

    #[test]
    fn set_time_and_off() {
        assert_eq!(
            ok("set 2 07:30"),
            AppCommand::SetTime {
                entry: 2,
                hour: 7,
                minute: 30
            }
        );
        assert_eq!(ok("SET 4 OFF"), AppCommand::SetOff { entry: 4 });
    }

    #[test]
    fn set_rejects_bad_arguments() {
        assert_eq!(
            AppCommand::parse("set 5 07:30"),
            Err(CommandError::InvalidEntry)
        );
        assert_eq!(
            AppCommand::parse("set 0 off"),
            Err(CommandError::InvalidEntry)
        );
        assert_eq!(
            AppCommand::parse("set 1 7:30"),
            Err(CommandError::InvalidTimeFormat)
        );
        assert_eq!(
            AppCommand::parse("set 1 24:00"),
            Err(CommandError::InvalidTimeFormat)
        );
        assert_eq!(
            AppCommand::parse("set 1 12-30"),
            Err(CommandError::InvalidTimeFormat)
        );
        assert_eq!(
            AppCommand::parse("set 1"),
            Err(CommandError::Usage(SET_USAGE))
        );
        assert_eq!(
            AppCommand::parse("set 1 12:00 now"),
            Err(CommandError::Usage(SET_USAGE))
        );
    }

    #[test]
    fn enable_and_disable_targets() {
        assert_eq!(ok("enable all"), AppCommand::Enable(Target::All));
        assert_eq!(ok("disable 3"), AppCommand::Disable(Target::Entry(3)));
        assert_eq!(ok("DISABLE ALL"), AppCommand::Disable(Target::All));
        assert_eq!(
            AppCommand::parse("enable"),
            Err(CommandError::Usage(ENABLE_USAGE))
        );
        assert_eq!(
            AppCommand::parse("disable 9"),
            Err(CommandError::InvalidEntry)
        );
    }

    #[test]
    fn unknown_words_are_rejected() {
        assert_eq!(AppCommand::parse("dance"), Err(CommandError::Unknown));
        assert_eq!(AppCommand::parse("feed now"), Err(CommandError::Unknown));
        assert_eq!(
            AppCommand::parse("test motor"),
            Err(CommandError::Usage(TEST_USAGE))
        );
    }
}
