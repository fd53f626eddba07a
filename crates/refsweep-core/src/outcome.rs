//! Scan results and statistics.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identity::ResourceIdentity;
use crate::kind::TypeTag;

/// Counters collected over a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Resources enumerated for inspection.
    pub total_resources: u64,
    /// Resources whose job ran to completion (including failed loads).
    pub scanned: u64,
    /// Resources that could not be loaded.
    pub load_failures: u64,
    /// Script fragments or compiled scripts that failed to round-trip.
    pub script_failures: u64,
    /// References of the target kind found across all resources.
    pub references_found: u64,
    /// Candidates removed from the unused set.
    pub removed: u64,
    /// Size of the candidate set before the scan.
    pub initial_candidates: u64,
}

impl ScanStats {
    /// Check if any resource or script could not be inspected.
    pub fn has_failures(&self) -> bool {
        self.load_failures > 0 || self.script_failures > 0
    }
}

/// Resources of the target kind that no scanned resource references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedResources {
    /// Kind that was checked.
    pub target_kind: TypeTag,
    /// Unused resources, ordered by name (case-insensitive).
    pub resources: Vec<ResourceIdentity>,
    /// Scan counters.
    pub stats: ScanStats,
    /// Wall time of the scan.
    pub scan_duration: Duration,
}

impl UnusedResources {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn contains(&self, identity: &ResourceIdentity) -> bool {
        self.resources.iter().any(|r| r == identity)
    }
}

/// Terminal outcome of a scan that was able to start.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// All jobs ran; the result is usable.
    Completed(UnusedResources),
    /// The scan was cancelled; no partial result is produced.
    Cancelled,
}

impl ScanOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The result, if the scan completed.
    pub fn completed(self) -> Option<UnusedResources> {
        match self {
            Self::Completed(unused) => Some(unused),
            Self::Cancelled => None,
        }
    }
}
