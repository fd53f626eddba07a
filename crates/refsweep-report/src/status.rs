//! Terminal status of a scan as shown to the user.

use refsweep_core::{ResourceStore, ScanError, ScanOutcome};

use crate::report::UnusedReport;

/// Message shown when a scan was cancelled.
pub const CANCELLED_MESSAGE: &str = "Operation cancelled";

/// Exactly one of: a usable report, a cancellation, or a failure.
#[derive(Debug, Clone)]
pub enum ScanStatus {
    Completed(UnusedReport),
    Cancelled,
    Failed(String),
}

impl ScanStatus {
    /// Classify the result of a scan run.
    pub fn from_result(result: Result<ScanOutcome, ScanError>, store: &dyn ResourceStore) -> Self {
        match result {
            Ok(ScanOutcome::Completed(unused)) => Self::Completed(UnusedReport::new(unused, store)),
            Ok(ScanOutcome::Cancelled) => Self::Cancelled,
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    /// Headline message for this status.
    pub fn message(&self) -> String {
        match self {
            Self::Completed(report) => report.summary(),
            Self::Cancelled => CANCELLED_MESSAGE.to_string(),
            Self::Failed(reason) => format!("Scan failed: {reason}"),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn report(&self) -> Option<&UnusedReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refsweep_core::{MemoryStore, ScanStats, TypeTag, UnusedResources};
    use std::time::Duration;

    #[test]
    fn test_messages() {
        let store = MemoryStore::new();

        let status = ScanStatus::from_result(Ok(ScanOutcome::Cancelled), &store);
        assert_eq!(status.message(), "Operation cancelled");
        assert!(status.report().is_none());

        let status = ScanStatus::from_result(Err(ScanError::store("no index")), &store);
        assert!(status.is_failed());
        assert_eq!(
            status.message(),
            "Scan failed: Resource store unavailable: no index"
        );

        let unused = UnusedResources {
            target_kind: TypeTag::audio(),
            resources: Vec::new(),
            stats: ScanStats::default(),
            scan_duration: Duration::ZERO,
        };
        let status = ScanStatus::from_result(Ok(ScanOutcome::Completed(unused)), &store);
        assert_eq!(status.message(), "No unused WAVs found");
        assert!(!status.is_failed());
    }
}
