//! Resource type tags.

use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Kinds that may carry references to other resources.
///
/// Every resource of these kinds is loaded and inspected during a scan.
pub const SCANNABLE_KINDS: &[&str] = &[
    "2DA", "ARE", "BCS", "BS", "CHR", "CHU", "CRE", "DLG", "EFF", "INI", "ITM", "PRO", "SPL", "STO",
    "VEF", "VVC", "WED", "WMP",
];

/// Kinds that can be checked for unused resources.
pub const CHECKABLE_KINDS: &[&str] = &[
    "ARE", "BCS", "CRE", "DLG", "EFF", "ITM", "PRO", "SPL", "STO", "TIS", "VEF", "VVC", "WAV",
    "WED",
];

/// Extension of audio resources named through the string table.
pub const AUDIO_KIND: &str = "WAV";

/// Upper-case file extension identifying the type of a resource (`ITM`, `CRE`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeTag(CompactString);

impl TypeTag {
    /// Create a tag, normalizing to upper case.
    pub fn new(tag: impl AsRef<str>) -> Self {
        let tag = tag.as_ref().trim().trim_start_matches('.');
        Self(CompactString::from(tag.to_ascii_uppercase()))
    }

    /// The audio kind (`WAV`).
    pub fn audio() -> Self {
        Self::new(AUDIO_KIND)
    }

    /// Get the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the audio kind.
    pub fn is_audio(&self) -> bool {
        self.0 == AUDIO_KIND
    }

    /// Check if resources of this kind may be selected as a scan target.
    pub fn is_checkable(&self) -> bool {
        CHECKABLE_KINDS.contains(&self.as_str())
    }

    /// Check if resources of this kind are inspected for references.
    pub fn is_scannable(&self) -> bool {
        SCANNABLE_KINDS.contains(&self.as_str())
    }

    /// Check if this kind appears in either fixed kind list.
    pub fn is_known(&self) -> bool {
        self.is_scannable() || self.is_checkable()
    }

    /// All scannable kinds, in their fixed order.
    pub fn scannable() -> Vec<TypeTag> {
        SCANNABLE_KINDS.iter().map(TypeTag::new).collect()
    }

    /// All checkable kinds, in their fixed order.
    pub fn checkable() -> Vec<TypeTag> {
        CHECKABLE_KINDS.iter().map(TypeTag::new).collect()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for TypeTag {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.0.into_string()
    }
}
