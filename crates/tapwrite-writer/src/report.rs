//! Record of a completed write attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tapwrite_core::WriteOutcome;
use uuid::Uuid;

/// What one write attempt produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReport {
    /// Random per-attempt identifier, also recorded on the attempt's span.
    pub attempt_id: Uuid,
    pub outcome: WriteOutcome,
    /// NDEF message length. Zero when nothing reached the tag.
    pub bytes_written: usize,
    pub completed_at: DateTime<Utc>,
}

impl WriteReport {
    pub fn new(attempt_id: Uuid, outcome: WriteOutcome, bytes_written: usize) -> Self {
        Self {
            attempt_id,
            outcome,
            bytes_written,
            completed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let report = WriteReport::new(Uuid::new_v4(), WriteOutcome::Success, 12);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["outcome"]["status"], "success");
        assert_eq!(json["bytes_written"], 12);
        assert!(json["attempt_id"].is_string());
        assert!(json["completed_at"].is_string());
    }

    #[test]
    fn test_failure_report() {
        let report = WriteReport::new(
            Uuid::new_v4(),
            WriteOutcome::Failure("Writing failed. Please try again.".into()),
            0,
        );
        assert!(!report.is_success());
        assert_eq!(report.outcome.message(), "Writing failed. Please try again.");
    }
}
