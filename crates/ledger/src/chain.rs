//! Chain lineage diagnostics.
//!
//! A key's history forms a chain: each record's `previous_quantity` must
//! equal its predecessor's `new_quantity`, and the first record must start
//! from a zero balance. Admin deletes can break that chain; this module
//! reports the breaks instead of repairing them.

use serde::{Deserialize, Serialize};

use stockbook_core::MovementId;
use stockbook_movements::MovementRecord;

/// One point where a key's lineage does not line up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBreak {
    /// Index of the offending record within the key's chronological history.
    pub position: usize,
    pub movement_id: MovementId,
    /// What the record's `previous_quantity` should have been.
    pub expected_previous: i64,
    /// What it actually says.
    pub actual_previous: i64,
}

/// Walk a chronological history and report every break.
///
/// The caller is expected to pass one key's full ascending history;
/// `expected_previous` for the first record is 0 (a line that starts
/// mid-flight indicates a deleted or missing head).
pub fn find_breaks(history: &[MovementRecord]) -> Vec<ChainBreak> {
    let mut breaks = Vec::new();
    let mut expected = 0i64;

    for (position, record) in history.iter().enumerate() {
        if record.previous_quantity() != expected {
            breaks.push(ChainBreak {
                position,
                movement_id: record.id(),
                expected_previous: expected,
                actual_previous: record.previous_quantity(),
            });
        }
        expected = record.new_quantity();
    }

    breaks
}
