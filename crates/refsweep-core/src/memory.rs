//! In-memory resource store and string table.
//!
//! Both can be built by hand or from a JSON [`CorpusManifest`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collab::{ResourceStore, StringTable};
use crate::content::ResourceContent;
use crate::error::{LoadError, ScanError};
use crate::identity::ResourceIdentity;
use crate::kind::TypeTag;

#[derive(Debug, Clone)]
enum Payload {
    Content(ResourceContent),
    Corrupt(String),
    Missing,
}

#[derive(Debug, Clone)]
struct StoredResource {
    payload: Payload,
    search_string: Option<String>,
}

/// Resource store backed by ordered maps, one per kind.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    kinds: IndexMap<TypeTag, IndexMap<ResourceIdentity, StoredResource>>,
    unavailable: Option<String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            kinds: IndexMap::new(),
            unavailable: None,
        }
    }

    fn put(&mut self, identity: ResourceIdentity, payload: Payload, search_string: Option<String>) {
        let resources = self.kinds.entry(identity.kind().clone()).or_default();
        resources.insert(
            identity,
            StoredResource {
                payload,
                search_string,
            },
        );
    }

    /// Add (or replace) a resource.
    pub fn insert(&mut self, identity: ResourceIdentity, content: ResourceContent) -> &mut Self {
        self.put(identity, Payload::Content(content), None);
        self
    }

    /// Add a resource with a display label.
    pub fn insert_labeled(
        &mut self,
        identity: ResourceIdentity,
        content: ResourceContent,
        label: impl Into<String>,
    ) -> &mut Self {
        self.put(identity, Payload::Content(content), Some(label.into()));
        self
    }

    /// Add a resource that is listed but fails to decode.
    pub fn insert_corrupt(
        &mut self,
        identity: ResourceIdentity,
        message: impl Into<String>,
    ) -> &mut Self {
        self.put(identity, Payload::Corrupt(message.into()), None);
        self
    }

    /// Add a resource that is listed but has no data.
    pub fn insert_missing(&mut self, identity: ResourceIdentity) -> &mut Self {
        self.put(identity, Payload::Missing, None);
        self
    }

    /// Make every enumeration fail, as if the backing index were gone.
    pub fn set_unavailable(&mut self, reason: impl Into<String>) {
        self.unavailable = Some(reason.into());
    }

    /// Total number of resources across all kinds.
    pub fn len(&self) -> usize {
        self.kinds.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceStore for MemoryStore {
    fn list_resources(&self, kind: &TypeTag) -> Result<Vec<ResourceIdentity>, ScanError> {
        if let Some(reason) = &self.unavailable {
            return Err(ScanError::store(reason.clone()));
        }
        Ok(self
            .kinds
            .get(kind)
            .map(|resources| resources.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn load(&self, identity: &ResourceIdentity) -> Result<ResourceContent, LoadError> {
        let stored = self
            .kinds
            .get(identity.kind())
            .and_then(|resources| resources.get(identity))
            .ok_or_else(|| LoadError::not_found(identity))?;

        match &stored.payload {
            Payload::Content(content) => Ok(content.clone()),
            Payload::Corrupt(message) => Err(LoadError::corrupt(identity, message.clone())),
            Payload::Missing => Err(LoadError::not_found(identity)),
        }
    }

    fn search_string(&self, identity: &ResourceIdentity) -> Option<String> {
        self.kinds
            .get(identity.kind())
            .and_then(|resources| resources.get(identity))
            .and_then(|stored| stored.search_string.clone())
    }
}

/// String table mapping entry indices to audio resource names.
#[derive(Debug, Clone, Default)]
pub struct MemoryStringTable {
    audio: HashMap<i32, String>,
}

impl MemoryStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an audio resource (name without extension) to a string entry.
    pub fn set_audio(&mut self, index: i32, name: impl Into<String>) -> &mut Self {
        self.audio.insert(index, name.into());
        self
    }
}

impl StringTable for MemoryStringTable {
    fn resolve_audio(&self, index: i32) -> Option<String> {
        self.audio
            .get(&index)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Errors reading a corpus manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// String-table entry of a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestString {
    pub index: i32,
    #[serde(default)]
    pub audio: Option<String>,
}

/// Resource entry of a manifest.
///
/// An entry with `corrupt` set fails to decode; an entry with neither
/// `content` nor `corrupt` is listed but missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestResource {
    pub id: ResourceIdentity,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub content: Option<ResourceContent>,
    #[serde(default)]
    pub corrupt: Option<String>,
}

/// JSON description of a complete corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusManifest {
    #[serde(default)]
    pub strings: Vec<ManifestString>,
    #[serde(default)]
    pub resources: Vec<ManifestResource>,
}

impl CorpusManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Build the store and string table described by this manifest.
    pub fn into_parts(self) -> (MemoryStore, MemoryStringTable) {
        let mut store = MemoryStore::new();
        for resource in self.resources {
            let payload = match (resource.content, resource.corrupt) {
                (_, Some(message)) => Payload::Corrupt(message),
                (Some(content), None) => Payload::Content(content),
                (None, None) => Payload::Missing,
            };
            store.put(resource.id, payload, resource.label);
        }

        let mut strings = MemoryStringTable::new();
        for entry in self.strings {
            if let Some(audio) = entry.audio {
                strings.set_audio(entry.index, audio);
            }
        }

        (store, strings)
    }
}
