//! Result reporting for refsweep.
//!
//! Turns scan outcomes into something a person can read:
//!
//! - [`UnusedReport`] - sorted entries with display labels, a summary line,
//!   a saved-file form and JSON rendering
//! - [`ScanStatus`] - completed, cancelled or failed, with the matching message

mod error;
mod report;
mod status;

pub use error::ReportError;
pub use report::{ReportEntry, UnusedReport, format_elapsed};
pub use status::{CANCELLED_MESSAGE, ScanStatus};
