//! Batch audit for externally-imported records.
//!
//! Imported batches bypass the mutator's invariant checks (they arrive via
//! deserialization), so they must be audited before they are trusted.

use serde::Serialize;

use stockbook_movements::{MovementRecord, RecordViolation};

/// One rejected record with its position and every violation found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidRecord {
    /// Index within the audited batch.
    pub index: usize,
    pub record: MovementRecord,
    pub violations: Vec<RecordViolation>,
}

/// Partition of a batch into trusted and rejected records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: Vec<MovementRecord>,
    pub invalid: Vec<InvalidRecord>,
    /// Operator-facing messages, one per violation.
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Audit a batch against the record invariants.
///
/// Total over any input: a malformed record lands in `invalid` with named
/// violations, it never aborts the audit.
pub fn validate(records: &[MovementRecord]) -> ValidationReport {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let violations = record.violations();
        if violations.is_empty() {
            valid.push(record.clone());
        } else {
            for violation in &violations {
                errors.push(format!("record {index} ({}): {violation}", record.id()));
            }
            invalid.push(InvalidRecord {
                index,
                record: record.clone(),
                violations,
            });
        }
    }

    ValidationReport {
        valid,
        invalid,
        errors,
    }
}
