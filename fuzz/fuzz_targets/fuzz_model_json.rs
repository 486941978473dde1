//! Fuzz target for model snapshot JSON parsing and validation.

#![no_main]

use kinseg_core::model::ModelSnapshot;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = serde_json::from_slice::<ModelSnapshot>(data) {
        // Validation rejects inconsistent artifacts; it must not panic.
        let _ = snapshot.validate();
    }
});
