//! Scan configuration types.

use std::num::NonZeroUsize;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::kind::TypeTag;

/// Configuration for one unused-resource scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Kind whose unused resources are being searched for.
    pub target_kind: TypeTag,

    /// Kinds whose resources are inspected for references.
    #[builder(default = "TypeTag::scannable()")]
    #[serde(default = "TypeTag::scannable")]
    pub scannable_kinds: Vec<TypeTag>,

    /// Maximum number of jobs in flight (0 = number of logical CPUs).
    #[builder(default = "0")]
    #[serde(default)]
    pub concurrency_limit: usize,

    /// Broadcast progress every N completed jobs. The last job always reports.
    #[builder(default = "100")]
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Accept target kinds outside the checkable list.
    #[builder(default = "false")]
    #[serde(default)]
    pub allow_any_target: bool,
}

fn default_progress_interval() -> u64 {
    100
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let allow_any = self.allow_any_target.unwrap_or(false);
        match self.target_kind {
            Some(ref kind) => check_target(kind, allow_any)?,
            None => return Err("Target kind is required".to_string()),
        }
        if let Some(ref kinds) = self.scannable_kinds {
            check_scannable(kinds)?;
        }
        Ok(())
    }
}

fn check_target(kind: &TypeTag, allow_any: bool) -> Result<(), String> {
    if kind.as_str().is_empty() {
        return Err("Target kind cannot be empty".to_string());
    }
    if !allow_any && !kind.is_checkable() {
        return Err(format!("{kind} is not a checkable resource kind"));
    }
    Ok(())
}

fn check_scannable(kinds: &[TypeTag]) -> Result<(), String> {
    if kinds.is_empty() {
        return Err("At least one scannable kind is required".to_string());
    }
    Ok(())
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a config with default settings for the given target kind.
    pub fn new(target_kind: impl Into<TypeTag>) -> Self {
        Self {
            target_kind: target_kind.into(),
            scannable_kinds: TypeTag::scannable(),
            concurrency_limit: 0,
            progress_interval: default_progress_interval(),
            allow_any_target: false,
        }
    }

    /// Check a config that did not go through the builder (e.g. deserialized).
    pub fn validate(&self) -> Result<(), ScanError> {
        check_target(&self.target_kind, self.allow_any_target)
            .map_err(ScanError::config)?;
        check_scannable(&self.scannable_kinds).map_err(ScanError::config)?;
        Ok(())
    }

    /// Number of workers to run, resolving 0 to the available parallelism.
    pub fn effective_concurrency(&self) -> usize {
        match self.concurrency_limit {
            0 => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        }
    }
}
