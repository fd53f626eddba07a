//! Unused-resource scanning engine for refsweep.
//!
//! This crate computes which resources of a target kind are never
//! referenced by any other resource in the corpus. Key features:
//!
//! - **Bounded parallelism** via a dedicated rayon pool with blocking admission
//! - **Uniform extraction** over structured records, script-bearing resources,
//!   compiled scripts and plain text
//! - **Cancellation** via a `CancellationToken`, checked before each job is
//!   submitted and between the stages of running jobs
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use refsweep_core::{CorpusManifest, LiteralScriptCompiler, ScanConfig, ScanOutcome};
//! use refsweep_scan::{CancellationToken, UnusedScanner};
//!
//! let (store, strings) = CorpusManifest::from_path("corpus.json").unwrap().into_parts();
//! let scanner = UnusedScanner::new(
//!     Arc::new(store),
//!     Arc::new(LiteralScriptCompiler::new()),
//!     Arc::new(strings),
//! );
//!
//! let config = ScanConfig::new("ITM");
//! match scanner.run(&config, &CancellationToken::new()).unwrap() {
//!     ScanOutcome::Completed(unused) => {
//!         for resource in &unused.resources {
//!             println!("{resource}");
//!         }
//!     }
//!     ScanOutcome::Cancelled => println!("Operation cancelled"),
//! }
//! ```

mod candidates;
mod extract;
mod progress;
mod resolver;
mod scanner;

pub use candidates::CandidateSet;
pub use extract::{Extraction, ReferenceExtractor};
pub use progress::ScanProgress;
pub use resolver::ScriptSymbolResolver;
pub use scanner::UnusedScanner;

pub use tokio_util::sync::CancellationToken;

// Re-export core types for convenience
pub use refsweep_core::{
    ExtractedReference, ResourceIdentity, ScanConfig, ScanError, ScanOutcome, ScanStats, TypeTag,
    UnusedResources,
};
