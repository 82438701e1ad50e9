//! Fuzz target for ServerEvent::decode
//!
//! This fuzzer tests broker event decoding with arbitrary text to find:
//! - Parser crashes or panics
//! - Unbounded recursion in nested JSON
//! - Tag handling bugs that bypass validation
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_proto::ServerEvent;

fuzz_target!(|data: &[u8]| {
    // Attempt to decode arbitrary text as a broker event
    // This should never panic, only return Err for invalid data
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = ServerEvent::decode(text);
    }
});
