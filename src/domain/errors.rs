//! Per-run error accumulation (C5 "Error" half).
//!
//! Fatal errors abort the pipeline; non-fatal ones (message-level transform
//! failures, checkpoint write failures) are recorded here and surfaced in
//! the run summary without stopping anything.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::data::types::Phase;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub phase: Phase,
    pub message: String,
    pub details: Option<JsonValue>,
    pub fatal: bool,
    pub timestamp: String,
}

/// Accumulates `ErrorRecord`s for the lifetime of a run. Mutated only on
/// the driver thread (or behind the context's single-writer mutex).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ErrorLogger {
    records: Vec<ErrorRecord>,
}

impl ErrorLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        details: Option<JsonValue>,
        fatal: bool,
    ) {
        self.records.push(ErrorRecord {
            phase,
            message: message.into(),
            details,
            fatal,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn fatal_count(&self) -> usize {
        self.records.iter().filter(|e| e.fatal).count()
    }

    pub fn non_fatal_count(&self) -> usize {
        self.records.iter().filter(|e| !e.fatal).count()
    }

    pub fn has_fatal(&self) -> bool {
        self.records.iter().any(|e| e.fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_split_by_severity() {
        let mut log = ErrorLogger::new();
        log.record(Phase::Transform, "bad poll body", None, false);
        log.record(Phase::Load, "constraint violation", None, true);

        assert_eq!(log.fatal_count(), 1);
        assert_eq!(log.non_fatal_count(), 1);
        assert!(log.has_fatal());
    }

    #[test]
    fn empty_logger_has_no_fatal() {
        let log = ErrorLogger::new();
        assert!(!log.has_fatal());
    }
}
