//! Process-wide redaction ledger.
//!
//! Every redactor stage records the rewrites it performs here. The ledger is
//! indexed both by redactor name and by file path; the two indices are
//! updated under one lock so a snapshot can never observe an entry in one
//! index but not the other.
//!
//! Appends are synchronous, so by the time a stage's output reader reports
//! EOF every redaction that stage performed is already visible to
//! [`RedactionLedger::snapshot`]. Snapshots taken while streams are still
//! being consumed see some consistent prefix of the final contents.

use crate::redaction::{Redaction, RedactionList};
use once_cell::sync::Lazy;
use std::sync::Mutex;
use tracing::debug;

/// Concurrency-safe store of recorded redactions.
///
/// One process-wide instance backs [`crate::redaction_list`] and
/// [`crate::reset_redaction_list`]; separate instances are only constructed
/// in tests.
#[derive(Debug, Default)]
pub struct RedactionLedger {
    inner: Mutex<RedactionList>,
}

static GLOBAL: Lazy<RedactionLedger> = Lazy::new(RedactionLedger::default);

/// The process-wide ledger shared by all redactor stages.
pub fn global() -> &'static RedactionLedger {
    &GLOBAL
}

impl RedactionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a redaction to both indices.
    pub fn record(&self, redaction: Redaction) {
        debug!(
            redactor = %redaction.redactor_name,
            file = %redaction.file,
            line = redaction.line,
            "redaction recorded"
        );
        let mut list = self.inner.lock().expect("ledger lock poisoned");
        list.by_redactor
            .entry(redaction.redactor_name.clone())
            .or_default()
            .push(redaction.clone());
        list.by_file
            .entry(redaction.file.clone())
            .or_default()
            .push(redaction);
    }

    /// Return a consistent copy of both indices.
    pub fn snapshot(&self) -> RedactionList {
        self.inner.lock().expect("ledger lock poisoned").clone()
    }

    /// Clear both indices atomically.
    ///
    /// Callers must ensure no redactor stages are still running.
    pub fn reset(&self) {
        let mut list = self.inner.lock().expect("ledger lock poisoned");
        *list = RedactionList::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn entry(name: &str, file: &str) -> Redaction {
        Redaction {
            redactor_name: name.to_string(),
            characters_removed: 3,
            line: 1,
            file: file.to_string(),
            is_default_redactor: false,
        }
    }

    #[test]
    fn test_record_updates_both_indices() {
        let ledger = RedactionLedger::new();
        ledger.record(entry("r1", "f1"));
        ledger.record(entry("r1", "f2"));

        let snap = ledger.snapshot();
        assert_eq!(snap.by_redactor["r1"].len(), 2);
        assert_eq!(snap.by_file["f1"].len(), 1);
        assert_eq!(snap.by_file["f2"].len(), 1);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let ledger = RedactionLedger::new();
        ledger.record(entry("r1", "f1"));

        let snap = ledger.snapshot();
        ledger.record(entry("r1", "f1"));

        assert_eq!(snap.by_redactor["r1"].len(), 1);
        assert_eq!(ledger.snapshot().by_redactor["r1"].len(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let ledger = RedactionLedger::new();
        ledger.record(entry("r1", "f1"));
        ledger.reset();

        let snap = ledger.snapshot();
        assert!(snap.is_empty());
        assert!(snap.by_file.is_empty());
    }

    #[test]
    fn test_concurrent_records_all_land() {
        let ledger = Arc::new(RedactionLedger::new());
        let mut handles = Vec::new();
        for t in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    ledger.record(entry(&format!("r{}", t), "shared"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let snap = ledger.snapshot();
        assert_eq!(snap.len(), 800);
        assert_eq!(snap.by_file["shared"].len(), 800);
    }
}
