//! Core types and collaborator contracts for refsweep.
//!
//! This crate provides the data model shared by the scan engine and the
//! reporter: resource identities, decoded resource content, scan
//! configuration and outcomes, plus the traits through which the engine
//! reaches storage, the script toolchain and the string table.

mod collab;
mod config;
mod content;
mod error;
mod identity;
mod kind;
mod memory;
mod outcome;
mod script;

pub use collab::{Decompiled, ResourceStore, ScriptCompiler, StringTable};
pub use config::{ScanConfig, ScanConfigBuilder, ScanConfigBuilderError};
pub use content::{
    Field, ResourceContent, ScriptBearing, ScriptFragment, ScriptKind, Section, SectionKind,
    StructuredRecord, flatten_fields,
};
pub use error::{IdentityParseError, LoadError, ScanError, ScriptError};
pub use identity::{ExtractedReference, ResourceIdentity, ScanJob};
pub use kind::{AUDIO_KIND, CHECKABLE_KINDS, SCANNABLE_KINDS, TypeTag};
pub use memory::{
    CorpusManifest, ManifestError, ManifestResource, ManifestString, MemoryStore,
    MemoryStringTable,
};
pub use outcome::{ScanOutcome, ScanStats, UnusedResources};
pub use script::LiteralScriptCompiler;
