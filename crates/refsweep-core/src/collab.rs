//! Contracts of the services a scan consumes.
//!
//! Storage, binary decoding and the script toolchain live outside the scan
//! engine. These traits are the boundary the engine is written against.

use std::collections::HashSet;

use crate::content::{ResourceContent, ScriptKind};
use crate::error::{LoadError, ScanError, ScriptError};
use crate::identity::{ExtractedReference, ResourceIdentity};
use crate::kind::TypeTag;

/// Source of resources.
pub trait ResourceStore: Send + Sync {
    /// List every resource of `kind`, in a stable order.
    fn list_resources(&self, kind: &TypeTag) -> Result<Vec<ResourceIdentity>, ScanError>;

    /// Load and decode a resource.
    fn load(&self, identity: &ResourceIdentity) -> Result<ResourceContent, LoadError>;

    /// Human-readable label of a resource (e.g. an item's name), if any.
    fn search_string(&self, _identity: &ResourceIdentity) -> Option<String> {
        None
    }
}

/// Result of a successful decompilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decompiled {
    /// Recovered source text.
    pub source: String,
    /// Every resource the bytecode addresses, of any kind.
    pub references: HashSet<ExtractedReference>,
}

/// Script compiler and decompiler.
pub trait ScriptCompiler: Send + Sync {
    fn compile(&self, source: &str, kind: ScriptKind) -> Result<String, ScriptError>;

    fn decompile(&self, bytecode: &str, kind: ScriptKind) -> Result<Decompiled, ScriptError>;
}

/// Localized string table.
pub trait StringTable: Send + Sync {
    /// Name (without extension) of the audio resource attached to a string entry.
    fn resolve_audio(&self, index: i32) -> Option<String>;
}
