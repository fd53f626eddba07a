//! Unused-resource reports.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::info;

use refsweep_core::{ResourceIdentity, ResourceStore, ScanStats, TypeTag, UnusedResources};

use crate::error::ReportError;

/// One unused resource with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub resource: ResourceIdentity,
    /// Label supplied by the store; empty when it has none.
    pub search_string: String,
}

impl ReportEntry {
    /// Line used in saved reports.
    pub fn line(&self) -> String {
        format!("File: {}  Name: {}", self.resource, self.search_string)
    }
}

/// Presentation of a completed scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedReport {
    pub target_kind: TypeTag,
    /// Entries ordered by resource name, ignoring case.
    pub entries: Vec<ReportEntry>,
    pub stats: ScanStats,
    pub scan_duration: Duration,
}

impl UnusedReport {
    /// Build a report, looking up each resource's label in `store`.
    pub fn new(unused: UnusedResources, store: &dyn ResourceStore) -> Self {
        let entries = unused
            .resources
            .into_iter()
            .sorted()
            .map(|resource| ReportEntry {
                search_string: store.search_string(&resource).unwrap_or_default(),
                resource,
            })
            .collect();

        Self {
            target_kind: unused.target_kind,
            entries,
            stats: unused.stats,
            scan_duration: unused.scan_duration,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `No unused ITMs found` or `3 unused ITMs found`.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            format!("No unused {}s found", self.target_kind)
        } else {
            format!("{} unused {}s found", self.len(), self.target_kind)
        }
    }

    /// Write the saved-report form: header, hit count, one line per entry.
    pub fn write_text<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "Result of {} usage check", self.target_kind)?;
        writeln!(out, "Number of hits: {}", self.len())?;
        for entry in &self.entries {
            writeln!(out, "{}", entry.line())?;
        }
        out.flush()
    }

    /// Save the report to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ReportError::io(path, source))?;
        self.write_text(BufWriter::new(file))
            .map_err(|source| ReportError::io(path, source))?;

        info!(path = %path.display(), entries = self.len(), "Report saved");
        Ok(())
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One-line counters, e.g. for a status bar.
    pub fn stats_line(&self) -> String {
        let stats = &self.stats;
        let mut parts = vec![
            format!("{} resources scanned", stats.scanned),
            format!("{} candidates", stats.initial_candidates),
            format!("{} referenced", stats.removed),
        ];
        if stats.load_failures > 0 {
            parts.push(format!("{} failed to load", stats.load_failures));
        }
        if stats.script_failures > 0 {
            parts.push(format!("{} script errors", stats.script_failures));
        }
        let elapsed = format_elapsed(self.scan_duration);
        format!("{} in {elapsed}", parts.join(", "))
    }
}

/// Format a scan duration for humans.
///
/// Shows milliseconds below one second, otherwise seconds with one decimal,
/// switching to minutes and seconds from one minute up.
pub fn format_elapsed(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        return format!("{millis}ms");
    }
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
