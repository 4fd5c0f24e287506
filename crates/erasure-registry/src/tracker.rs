use std::sync::Mutex;

use tracing::debug;

use erasure_core::{BinaryVersion, IncompatibilityTracker};

/// An incompatible binary container seen during mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompatibleClass {
    pub internal_name: String,
    pub version: BinaryVersion,
}

/// [`IncompatibilityTracker`] collecting records for later reporting.
///
/// Each container is recorded once.
#[derive(Debug, Default)]
pub struct IncompatibleClassLog {
    records: Mutex<Vec<IncompatibleClass>>,
}

impl IncompatibleClassLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records, in recording order.
    pub fn records(&self) -> Vec<IncompatibleClass> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().map(|r| r.is_empty()).unwrap_or(true)
    }
}

impl IncompatibilityTracker for IncompatibleClassLog {
    fn record(&self, container_internal_name: &str, version: BinaryVersion) {
        let Ok(mut records) = self.records.lock() else {
            return;
        };
        if records.iter().any(|r| r.internal_name == container_internal_name) {
            return;
        }
        debug!(container = container_internal_name, %version, "incompatible binary container");
        records.push(IncompatibleClass {
            internal_name: container_internal_name.to_string(),
            version,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_each_container_once() {
        let log = IncompatibleClassLog::new();
        assert!(log.is_empty());
        log.record("foo/Bar", BinaryVersion::new(2, 0, 0));
        log.record("foo/Bar", BinaryVersion::new(2, 0, 0));
        log.record("foo/Baz", BinaryVersion::new(1, 9, 0));
        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].internal_name, "foo/Bar");
        assert_eq!(records[1].version, BinaryVersion::new(1, 9, 0));
    }
}
