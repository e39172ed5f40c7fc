//! Fuzz target: `LineReader::push`
//!
//! Any byte stream must yield lines that fit the buffer and contain no
//! terminators, and the pending buffer must stay bounded.
//!
//! cargo fuzz run fuzz_line_reader

#![no_main]

use fishfeeder::adapters::console::{LineReader, LINE_CAPACITY};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = LineReader::new();
    for &b in data {
        if let Some(line) = reader.push(b) {
            assert!(line.len() <= LINE_CAPACITY);
            assert!(!line.contains(['\r', '\n']));
        }
        assert!(reader.pending().len() <= LINE_CAPACITY);
    }
});
