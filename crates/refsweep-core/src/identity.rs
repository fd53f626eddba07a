//! Resource identities and the references extracted from resources.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::IdentityParseError;
use crate::kind::TypeTag;

/// Uniquely identifies a resource in the corpus.
///
/// Names compare case-insensitively; the original casing is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceIdentity {
    kind: TypeTag,
    name: CompactString,
}

impl ResourceIdentity {
    /// Create a new identity from a name (without extension) and a kind.
    pub fn new(name: impl AsRef<str>, kind: impl Into<TypeTag>) -> Self {
        Self {
            kind: kind.into(),
            name: CompactString::new(name.as_ref().trim()),
        }
    }

    /// The resource kind.
    pub fn kind(&self) -> &TypeTag {
        &self.kind
    }

    /// The resource name, without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full file name, `NAME.EXT`.
    pub fn file_name(&self) -> String {
        self.to_string()
    }

    /// Check whether this identity names the given file, ignoring case.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((name, ext)) => {
                name.eq_ignore_ascii_case(&self.name)
                    && ext.eq_ignore_ascii_case(self.kind.as_str())
            }
            None => false,
        }
    }
}

impl PartialEq for ResourceIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for ResourceIdentity {}

impl Hash for ResourceIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        for b in self.name.bytes() {
            state.write_u8(b.to_ascii_uppercase());
        }
    }
}

impl Ord for ResourceIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.name.bytes().map(|b| b.to_ascii_uppercase());
        let rhs = other.name.bytes().map(|b| b.to_ascii_uppercase());
        lhs.cmp(rhs).then_with(|| self.kind.cmp(&other.kind))
    }
}

impl PartialOrd for ResourceIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.kind)
    }
}

impl FromStr for ResourceIdentity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, ext) = s
            .rsplit_once('.')
            .ok_or_else(|| IdentityParseError::new(s, "missing extension"))?;
        if name.is_empty() {
            return Err(IdentityParseError::new(s, "empty name"));
        }
        if ext.is_empty() {
            return Err(IdentityParseError::new(s, "empty extension"));
        }
        Ok(Self::new(name, ext))
    }
}

impl TryFrom<String> for ResourceIdentity {
    type Error = IdentityParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ResourceIdentity> for String {
    fn from(identity: ResourceIdentity) -> Self {
        identity.to_string()
    }
}

/// A reference produced by the extractor.
///
/// Only references whose kind equals the scan's target kind affect the
/// candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedReference(ResourceIdentity);

impl ExtractedReference {
    /// Create a reference to `name` of the given kind.
    pub fn new(name: impl AsRef<str>, kind: impl Into<TypeTag>) -> Self {
        Self(ResourceIdentity::new(name, kind))
    }

    /// Kind of the referenced resource.
    pub fn kind(&self) -> &TypeTag {
        self.0.kind()
    }

    /// Name of the referenced resource, without extension.
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// The identity this reference points at.
    pub fn identity(&self) -> &ResourceIdentity {
        &self.0
    }
}

impl From<ResourceIdentity> for ExtractedReference {
    fn from(identity: ResourceIdentity) -> Self {
        Self(identity)
    }
}

impl fmt::Display for ExtractedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One unit of scan work: inspect `resource` for references of `target_kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanJob {
    pub resource: ResourceIdentity,
    pub target_kind: TypeTag,
}

impl ScanJob {
    pub fn new(resource: ResourceIdentity, target_kind: TypeTag) -> Self {
        Self {
            resource,
            target_kind,
        }
    }
}
