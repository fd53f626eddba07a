//! Decoded resource content.
//!
//! The store decodes each resource into one of a closed set of shapes. The
//! extractor dispatches on [`ResourceContent`] once per job.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::identity::ExtractedReference;
use crate::kind::TypeTag;

/// Resource reference names that mean "no resource".
const UNSET_NAMES: &[&str] = &["", "NONE"];

/// Loaded content of a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceContent {
    /// Record with typed fields (items, creatures, spells, ...).
    Structured(StructuredRecord),
    /// Resource embedding script fragments (dialogs).
    ScriptBearing(ScriptBearing),
    /// Stand-alone compiled script.
    CompiledScript { bytecode: String },
    /// Free-form text (tables, ini files).
    PlainText { text: String },
}

impl ResourceContent {
    /// Short name of the content shape, for logging.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Structured(_) => "structured",
            Self::ScriptBearing(_) => "script-bearing",
            Self::CompiledScript { .. } => "compiled-script",
            Self::PlainText { .. } => "plain-text",
        }
    }
}

/// A single field of a decoded resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Typed reference to another resource.
    ResourceRef { kind: TypeTag, name: CompactString },
    /// Index into the string table. Negative values mean "unset".
    StringRef(i32),
    /// Nested group of fields (e.g. an embedded effect block).
    Group { label: String, fields: Vec<Field> },
    /// Field with no reference semantics.
    Other,
}

impl Field {
    /// Create a resource reference field.
    pub fn resource_ref(name: impl AsRef<str>, kind: impl Into<TypeTag>) -> Self {
        Self::ResourceRef {
            kind: kind.into(),
            name: CompactString::new(name.as_ref().trim()),
        }
    }

    /// The reference this field points at, if it is a set resource reference.
    pub fn reference(&self) -> Option<ExtractedReference> {
        match self {
            Self::ResourceRef { kind, name } if !is_unset(name) => {
                Some(ExtractedReference::new(name, kind.clone()))
            }
            _ => None,
        }
    }

    /// The string-table index, if this is a string reference.
    pub fn string_index(&self) -> Option<i32> {
        match self {
            Self::StringRef(index) => Some(*index),
            _ => None,
        }
    }
}

fn is_unset(name: &str) -> bool {
    UNSET_NAMES
        .iter()
        .any(|unset| name.eq_ignore_ascii_case(unset))
}

/// Flatten a field list, descending into groups. Group fields themselves are
/// not part of the output.
pub fn flatten_fields(fields: &[Field]) -> Vec<&Field> {
    let mut flat = Vec::with_capacity(fields.len());
    collect_flat(fields, &mut flat);
    flat
}

fn collect_flat<'a>(fields: &'a [Field], out: &mut Vec<&'a Field>) {
    for field in fields {
        match field {
            Field::Group { fields, .. } => collect_flat(fields, out),
            leaf => out.push(leaf),
        }
    }
}

/// Record with a list of typed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRecord {
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl StructuredRecord {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// All leaf fields in declaration order.
    pub fn flatten_fields(&self) -> Vec<&Field> {
        flatten_fields(&self.fields)
    }
}

/// Which kind of script a fragment or compiled script holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Condition block.
    Trigger,
    /// Response block.
    Action,
    /// Complete script (conditions and responses).
    Script,
}

/// A script fragment embedded in a resource, stored as source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFragment {
    pub kind: ScriptKind,
    pub source: String,
}

impl ScriptFragment {
    pub fn trigger(source: impl Into<String>) -> Self {
        Self {
            kind: ScriptKind::Trigger,
            source: source.into(),
        }
    }

    pub fn action(source: impl Into<String>) -> Self {
        Self {
            kind: ScriptKind::Action,
            source: source.into(),
        }
    }
}

/// Kind of a nested sub-structure of a script-bearing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    State,
    Transition,
}

/// Nested sub-structure (dialog state or transition) with its own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Section {
    pub fn state(fields: Vec<Field>) -> Self {
        Self {
            kind: SectionKind::State,
            fields,
        }
    }

    pub fn transition(fields: Vec<Field>) -> Self {
        Self {
            kind: SectionKind::Transition,
            fields,
        }
    }

    pub fn flatten_fields(&self) -> Vec<&Field> {
        flatten_fields(&self.fields)
    }
}

/// Resource that embeds script fragments, such as a dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBearing {
    /// Top-level fields.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Embedded script fragments.
    #[serde(default)]
    pub fragments: Vec<ScriptFragment>,
    /// States and transitions.
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl ScriptBearing {
    pub fn flatten_fields(&self) -> Vec<&Field> {
        flatten_fields(&self.fields)
    }
}
