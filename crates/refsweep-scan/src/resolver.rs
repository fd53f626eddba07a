//! Recovery of symbolic references from scripts and the string table.

use std::collections::HashSet;
use std::sync::Arc;

use refsweep_core::{
    ExtractedReference, ScriptCompiler, ScriptError, ScriptKind, StringTable, TypeTag,
};

/// Resolves references that are not stored as typed fields.
///
/// Script fragments are compiled and immediately decompiled; the decompiler
/// reports every resource the bytecode addresses. String references are
/// looked up in the string table for an attached audio resource.
#[derive(Clone)]
pub struct ScriptSymbolResolver {
    compiler: Arc<dyn ScriptCompiler>,
    strings: Arc<dyn StringTable>,
}

impl ScriptSymbolResolver {
    pub fn new(compiler: Arc<dyn ScriptCompiler>, strings: Arc<dyn StringTable>) -> Self {
        Self { compiler, strings }
    }

    /// Compile `source` and decompile the result, returning every resource
    /// the script addresses.
    pub fn recover_references(
        &self,
        source: &str,
        kind: ScriptKind,
    ) -> Result<HashSet<ExtractedReference>, ScriptError> {
        let bytecode = self.compiler.compile(source, kind)?;
        self.decompile_references(&bytecode, kind)
    }

    /// Decompile already compiled code, returning every resource it addresses.
    pub fn decompile_references(
        &self,
        bytecode: &str,
        kind: ScriptKind,
    ) -> Result<HashSet<ExtractedReference>, ScriptError> {
        Ok(self.compiler.decompile(bytecode, kind)?.references)
    }

    /// Audio resource attached to a string entry. Negative indices are unset.
    pub fn resolve_audio(&self, index: i32) -> Option<ExtractedReference> {
        if index < 0 {
            return None;
        }
        self.strings
            .resolve_audio(index)
            .map(|name| ExtractedReference::new(name, TypeTag::audio()))
    }
}

impl std::fmt::Debug for ScriptSymbolResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptSymbolResolver").finish_non_exhaustive()
    }
}
