//! Error types for scanning operations.

use thiserror::Error;

use crate::identity::ResourceIdentity;

/// Errors that end a scan before it produces a result.
///
/// Per-resource problems never surface here; they are logged and counted
/// in [`ScanStats`](crate::ScanStats) instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The resource store could not enumerate resources.
    #[error("Resource store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The worker pool could not be created.
    #[error("Failed to start worker pool: {message}")]
    ThreadPool { message: String },
}

impl ScanError {
    /// Create a store-unavailable error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create an invalid-configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Failure to load a single resource.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The resource does not exist in the store.
    #[error("Resource not found: {identity}")]
    NotFound { identity: ResourceIdentity },

    /// The resource exists but could not be decoded.
    #[error("Corrupt resource {identity}: {message}")]
    Corrupt {
        identity: ResourceIdentity,
        message: String,
    },
}

impl LoadError {
    pub fn not_found(identity: &ResourceIdentity) -> Self {
        Self::NotFound {
            identity: identity.clone(),
        }
    }

    pub fn corrupt(identity: &ResourceIdentity, message: impl Into<String>) -> Self {
        Self::Corrupt {
            identity: identity.clone(),
            message: message.into(),
        }
    }
}

/// Failure in the script compile/decompile round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Compile error: {message}")]
    Compile { message: String },

    #[error("Decompile error: {message}")]
    Decompile { message: String },
}

impl ScriptError {
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile {
            message: message.into(),
        }
    }

    pub fn decompile(message: impl Into<String>) -> Self {
        Self::Decompile {
            message: message.into(),
        }
    }
}

/// A string could not be parsed as `NAME.EXT`.
#[derive(Debug, Clone, Error)]
#[error("Invalid resource name '{input}': {reason}")]
pub struct IdentityParseError {
    pub input: String,
    pub reason: &'static str,
}

impl IdentityParseError {
    pub(crate) fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}
