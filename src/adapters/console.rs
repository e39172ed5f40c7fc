//! Serial console line assembly.
//!
//! Bytes arrive from the UART one at a time with no framing beyond the
//! line terminator.  [`LineReader`] buffers them into a bounded line and
//! hands out complete lines on CR, LF, or CRLF.  A line that overflows
//! the buffer is dropped whole: the rest of it is discarded up to the
//! next terminator so the tail is never run as a command.

use heapless::String;
use log::warn;

/// Longest accepted command line, terminator excluded.
pub const LINE_CAPACITY: usize = 64;

pub type CommandLine = String<LINE_CAPACITY>;

#[derive(Debug, Default)]
pub struct LineReader {
    buf: CommandLine,
    overflowed: bool,
    last_was_cr: bool,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte.  Returns the completed line when `byte` ends one.
    ///
    /// Empty lines are returned too; the command parser ignores them.
    pub fn push(&mut self, byte: u8) -> Option<CommandLine> {
        let after_cr = core::mem::replace(&mut self.last_was_cr, byte == b'\r');
        match byte {
            b'\n' if after_cr => None,
            b'\r' | b'\n' => self.finish(),
            // Backspace / DEL from interactive terminals.
            0x08 | 0x7F => {
                let _ = self.buf.pop();
                None
            }
            b if b.is_ascii_graphic() || b == b' ' || b == b'\t' => {
                if !self.overflowed && self.buf.push(b as char).is_err() {
                    warn!("console line longer than {} bytes, discarded", LINE_CAPACITY);
                    self.overflowed = true;
                }
                None
            }
            _ => None,
        }
    }

    /// Feed a chunk, calling `on_line` for every completed line.
    pub fn extend(&mut self, bytes: &[u8], mut on_line: impl FnMut(&str)) {
        for &b in bytes {
            if let Some(line) = self.push(b) {
                on_line(&line);
            }
        }
    }

    /// Bytes buffered for the line in progress.
    pub fn pending(&self) -> &str {
        &self.buf
    }

    fn finish(&mut self) -> Option<CommandLine> {
        let line = core::mem::take(&mut self.buf);
        if core::mem::take(&mut self.overflowed) {
            return None;
        }
        Some(line)
    }
}
