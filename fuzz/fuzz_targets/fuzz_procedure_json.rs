//! Fuzz target for recorded-procedure JSON parsing.
//!
//! Arbitrary input must parse or error, never panic; whatever parses must
//! survive series conversion.

#![no_main]

use kinseg_core::procedure::RecordedProcedure;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(procedure) = serde_json::from_slice::<RecordedProcedure>(data) {
        let _ = procedure.to_series();
    }
});
