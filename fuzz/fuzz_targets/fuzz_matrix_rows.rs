//! Fuzz target for the whitespace row-label matrix text form.
//!
//! Parsing arbitrary text must never panic, only return None.

#![no_main]

use kinseg_core::matrix::LabeledMatrix;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Some(matrix) = LabeledMatrix::from_rows_text(text) {
            // Whatever parses must re-serialize into a parseable form.
            // (NaN rows parse but are not self-equal, so no equality here.)
            let round = LabeledMatrix::from_rows_text(&matrix.to_rows_text());
            assert!(round.is_some());
        }
    }
});
