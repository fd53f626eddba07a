//! Extraction of outbound references from loaded resources.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use refsweep_core::{
    ExtractedReference, Field, ResourceContent, ResourceIdentity, ScriptBearing, ScriptKind,
    StructuredRecord, TypeTag,
};

use crate::resolver::ScriptSymbolResolver;

/// Tokens in free text that may name a resource.
static RESREF_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]{3,8}").unwrap());

/// References of the target kind found in one resource.
#[derive(Debug, Clone)]
pub struct Extraction {
    target_kind: TypeTag,
    /// Distinct references of the target kind.
    pub references: HashSet<ExtractedReference>,
    /// Script fragments or compiled scripts that failed to round-trip.
    pub script_failures: u64,
}

impl Extraction {
    fn new(target_kind: &TypeTag) -> Self {
        Self {
            target_kind: target_kind.clone(),
            references: HashSet::new(),
            script_failures: 0,
        }
    }

    fn push(&mut self, reference: ExtractedReference) {
        if reference.kind() == &self.target_kind {
            self.references.insert(reference);
        }
    }

    fn extend(&mut self, references: impl IntoIterator<Item = ExtractedReference>) {
        for reference in references {
            self.push(reference);
        }
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Produces the references a resource makes to resources of a target kind.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    resolver: ScriptSymbolResolver,
}

impl ReferenceExtractor {
    pub fn new(resolver: ScriptSymbolResolver) -> Self {
        Self { resolver }
    }

    /// Extract every reference of `target_kind` made by `content`.
    ///
    /// Script failures are logged and counted; the failing fragment simply
    /// contributes nothing.
    pub fn extract(
        &self,
        resource: &ResourceIdentity,
        content: &ResourceContent,
        target_kind: &TypeTag,
    ) -> Extraction {
        let mut extraction = Extraction::new(target_kind);
        match content {
            ResourceContent::Structured(record) => self.structured(record, &mut extraction),
            ResourceContent::ScriptBearing(bearing) => {
                self.script_bearing(resource, bearing, &mut extraction)
            }
            ResourceContent::CompiledScript { bytecode } => {
                self.compiled_script(resource, bytecode, &mut extraction)
            }
            ResourceContent::PlainText { text } => plain_text(text, &mut extraction),
        }
        extraction
    }

    fn structured(&self, record: &StructuredRecord, out: &mut Extraction) {
        let audio = out.target_kind.is_audio();
        for field in record.flatten_fields() {
            self.field(field, audio, out);
        }
    }

    fn script_bearing(
        &self,
        resource: &ResourceIdentity,
        bearing: &ScriptBearing,
        out: &mut Extraction,
    ) {
        for field in bearing.flatten_fields() {
            self.field(field, false, out);
        }

        for (index, fragment) in bearing.fragments.iter().enumerate() {
            match self.resolver.recover_references(&fragment.source, fragment.kind) {
                Ok(references) => out.extend(references),
                Err(err) => {
                    warn!(
                        resource = %resource,
                        fragment = index,
                        kind = %fragment.kind,
                        error = %err,
                        "Script fragment failed to round-trip"
                    );
                    out.script_failures += 1;
                }
            }
        }

        // Spoken lines hang off states and transitions only.
        let audio = out.target_kind.is_audio();
        for section in &bearing.sections {
            for field in section.flatten_fields() {
                self.field(field, audio, out);
            }
        }
    }

    fn compiled_script(&self, resource: &ResourceIdentity, bytecode: &str, out: &mut Extraction) {
        match self.resolver.decompile_references(bytecode, ScriptKind::Script) {
            Ok(references) => out.extend(references),
            Err(err) => {
                warn!(resource = %resource, error = %err, "Script failed to decompile");
                out.script_failures += 1;
            }
        }
    }

    fn field(&self, field: &Field, resolve_audio: bool, out: &mut Extraction) {
        let reference = match field.reference() {
            Some(reference) => Some(reference),
            None if resolve_audio => field
                .string_index()
                .and_then(|index| self.resolver.resolve_audio(index)),
            None => None,
        };
        if let Some(reference) = reference {
            out.push(reference);
        }
    }
}

/// Best-effort textual match: every identifier-like token is taken as a
/// name of the target kind.
fn plain_text(text: &str, out: &mut Extraction) {
    let kind = out.target_kind.clone();
    for token in RESREF_TOKEN.find_iter(text) {
        out.push(ExtractedReference::new(token.as_str(), kind.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use refsweep_core::{LiteralScriptCompiler, MemoryStringTable, ScriptFragment, Section};

    fn extractor() -> ReferenceExtractor {
        let mut strings = MemoryStringTable::new();
        strings
            .set_audio(10, "LINE10")
            .set_audio(20, "LINE20")
            .set_audio(30, "LINE30");
        ReferenceExtractor::new(ScriptSymbolResolver::new(
            Arc::new(LiteralScriptCompiler::new()),
            Arc::new(strings),
        ))
    }

    fn id(s: &str) -> ResourceIdentity {
        s.parse().unwrap()
    }

    fn names(extraction: &Extraction) -> Vec<String> {
        let mut names: Vec<_> = extraction
            .references
            .iter()
            .map(|r| r.to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_structured_matches_target_kind_only() {
        let content = ResourceContent::Structured(StructuredRecord::new(vec![
            Field::resource_ref("SW1H01", "ITM"),
            Field::resource_ref("SPWI101", "SPL"),
            Field::Group {
                label: "Item slot".into(),
                fields: vec![Field::resource_ref("RING01", "itm")],
            },
            Field::resource_ref("NONE", "ITM"),
            Field::StringRef(10),
        ]));

        let extraction = extractor().extract(&id("GUARD.CRE"), &content, &TypeTag::new("ITM"));
        assert_eq!(names(&extraction), vec!["RING01.ITM", "SW1H01.ITM"]);
    }

    #[test]
    fn test_structured_audio_through_string_table() {
        let content = ResourceContent::Structured(StructuredRecord::new(vec![
            Field::StringRef(10),
            Field::StringRef(-1),
            Field::StringRef(99),
            Field::resource_ref("BATTLE1", "WAV"),
        ]));

        let extraction = extractor().extract(&id("GUARD.CRE"), &content, &TypeTag::audio());
        assert_eq!(names(&extraction), vec!["BATTLE1.WAV", "LINE10.WAV"]);

        let extraction = extractor().extract(&id("GUARD.CRE"), &content, &TypeTag::new("ITM"));
        assert!(extraction.is_empty());
    }

    #[test]
    fn test_script_bearing() {
        let content = ResourceContent::ScriptBearing(ScriptBearing {
            fields: vec![Field::resource_ref("NEXTDLG", "DLG"), Field::StringRef(30)],
            fragments: vec![
                ScriptFragment::trigger("PartyHasItem(\"KEY01.ITM\")"),
                ScriptFragment::action("GiveItem(\"SCRL01.itm\",LastTalkedToBy)"),
                ScriptFragment::action("ApplySpellRES(\"heal.spl\",Myself)"),
            ],
            sections: vec![
                Section::state(vec![Field::StringRef(10)]),
                Section::transition(vec![
                    Field::StringRef(20),
                    Field::resource_ref("OTHER", "DLG"),
                ]),
            ],
        });

        let dialog = id("TALK.DLG");
        let extraction = extractor().extract(&dialog, &content, &TypeTag::new("ITM"));
        assert_eq!(names(&extraction), vec!["KEY01.ITM", "SCRL01.ITM"]);
        assert_eq!(extraction.script_failures, 0);

        let extraction = extractor().extract(&dialog, &content, &TypeTag::new("DLG"));
        assert_eq!(names(&extraction), vec!["NEXTDLG.DLG", "OTHER.DLG"]);

        // Top-level string refs are not spoken lines.
        let extraction = extractor().extract(&dialog, &content, &TypeTag::audio());
        assert_eq!(names(&extraction), vec!["LINE10.WAV", "LINE20.WAV"]);
    }

    #[test]
    fn test_failed_fragment_contributes_nothing() {
        let content = ResourceContent::ScriptBearing(ScriptBearing {
            fragments: vec![
                ScriptFragment::action("GiveItem(\"BROKEN.ITM\""),
                ScriptFragment::action("GiveItem(\"FINE.ITM\")"),
            ],
            ..Default::default()
        });

        let extraction = extractor().extract(&id("TALK.DLG"), &content, &TypeTag::new("ITM"));
        assert_eq!(names(&extraction), vec!["FINE.ITM"]);
        assert_eq!(extraction.script_failures, 1);
    }

    #[test]
    fn test_compiled_script() {
        let compiler = LiteralScriptCompiler::new();
        let bytecode = refsweep_core::ScriptCompiler::compile(
            &compiler,
            "IF\nTrue()\nTHEN\nRESPONSE #100\nCreateCreature(\"ogre01.CRE\",[1.1],0)\nEND",
            ScriptKind::Script,
        )
        .unwrap();
        let content = ResourceContent::CompiledScript { bytecode };

        let extraction = extractor().extract(&id("AREA01.BCS"), &content, &TypeTag::new("CRE"));
        assert_eq!(names(&extraction), vec!["ogre01.CRE"]);

        let garbage = ResourceContent::CompiledScript {
            bytecode: "not a script".into(),
        };
        let extraction = extractor().extract(&id("AREA02.BCS"), &garbage, &TypeTag::new("CRE"));
        assert!(extraction.is_empty());
        assert_eq!(extraction.script_failures, 1);
    }

    #[test]
    fn test_plain_text_tokens() {
        let content = ResourceContent::PlainText {
            text: "2DA V1.0\n*\n  RESREF\nrow1 SW1H01 ab longernameXYZ".into(),
        };
        let extraction = extractor().extract(&id("ITEMS.2DA"), &content, &TypeTag::new("ITM"));
        let names = names(&extraction);

        assert!(names.contains(&"SW1H01.ITM".to_string()));
        assert!(names.contains(&"RESREF.ITM".to_string()));
        assert!(names.contains(&"longerna.ITM".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("ab.")));
    }
}
