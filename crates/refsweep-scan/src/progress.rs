//! Scan progress reporting.

use std::time::Duration;

use refsweep_core::ResourceIdentity;

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Jobs finished so far (successful or failed).
    pub completed: u64,
    /// Total jobs in the scan.
    pub total: u64,
    /// Candidates removed so far.
    pub removed: u64,
    /// Resource whose job produced this update.
    pub current: Option<ResourceIdentity>,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new(total: u64) -> Self {
        Self {
            completed: 0,
            total,
            removed: 0,
            current: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            self.completed as f64 / self.total as f64 * 100.0
        } else {
            100.0
        }
    }

    /// Calculate scan rate in resources per second.
    pub fn resources_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.completed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Check if every job has reported.
    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }

    /// Progress note, e.g. `Checking resource 100/2500`.
    pub fn note(&self) -> String {
        format!("Checking resource {}/{}", self.completed, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let mut progress = ScanProgress::new(200);
        assert_eq!(progress.percentage(), 0.0);
        progress.completed = 50;
        assert_eq!(progress.percentage(), 25.0);
        assert!(!progress.is_finished());
        assert_eq!(progress.note(), "Checking resource 50/200");
    }

    #[test]
    fn test_empty_scan_is_finished() {
        let progress = ScanProgress::new(0);
        assert!(progress.is_finished());
        assert_eq!(progress.percentage(), 100.0);
    }
}
