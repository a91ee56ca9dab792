//! Descriptor discovery
//!
//! Descriptors come from [`DescriptorProvider`]s, which stand in for the
//! semantic symbol provider of a host. A provider hands out plain
//! [`DescriptorCandidate`] values; the registry freezes them through a
//! [`BuilderPool`]. A failing provider contributes no descriptors and leaves a
//! diagnostic that every compiled document reports on its IR root.

use crate::registry::{ComponentRegistry, RegisterOutcome};
use serde::{Deserialize, Serialize};
use stencil_core::descriptor::{
    BindingRule, BoundAttribute, BuilderPool, ComponentDescriptor, DescriptorFlags, DescriptorKind,
    MetadataEntry,
};
use stencil_core::diagnostic::Diagnostic;
use tracing::{info, warn};

pub const DISCOVERY_FAILED: &str = "STN4001";
pub const INVALID_CANDIDATE: &str = "STN4002";

/// Unfrozen descriptor data as produced by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorCandidate {
    pub kind: DescriptorKind,
    pub name: String,
    pub assembly: String,
    #[serde(default)]
    pub binding_rules: Vec<BindingRule>,
    #[serde(default)]
    pub bound_attributes: Vec<BoundAttribute>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default)]
    pub flags: DescriptorFlags,
}

impl DescriptorCandidate {
    /// Freeze into a descriptor using a pooled builder
    pub fn freeze(self, pool: &BuilderPool) -> stencil_core::error::Result<ComponentDescriptor> {
        let mut builder = pool.acquire(self.kind, self.name, self.assembly);
        for rule in self.binding_rules {
            builder.push_rule(rule);
        }
        for attribute in self.bound_attributes {
            builder.push_bound_attribute(attribute);
        }
        for entry in self.metadata {
            builder.push_metadata(entry);
        }
        builder.set_flags(self.flags);
        pool.freeze(builder)
    }
}

/// Source of component descriptors
pub trait DescriptorProvider: Send + Sync {
    /// Name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Enumerate candidates; an error discards the whole feed
    fn candidates(&self) -> anyhow::Result<Vec<DescriptorCandidate>>;
}

/// Provider over a fixed list of candidates
#[derive(Debug, Clone)]
pub struct StaticProvider {
    name: String,
    candidates: Vec<DescriptorCandidate>,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>, candidates: Vec<DescriptorCandidate>) -> Self {
        Self {
            name: name.into(),
            candidates,
        }
    }
}

impl DescriptorProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn candidates(&self) -> anyhow::Result<Vec<DescriptorCandidate>> {
        Ok(self.candidates.clone())
    }
}

/// Provider reading a JSON array of candidates
#[derive(Debug, Clone)]
pub struct JsonProvider {
    name: String,
    json: String,
}

impl JsonProvider {
    pub fn new(name: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json: json.into(),
        }
    }
}

impl DescriptorProvider for JsonProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn candidates(&self) -> anyhow::Result<Vec<DescriptorCandidate>> {
        let candidates = serde_json::from_str(&self.json)?;
        Ok(candidates)
    }
}

impl ComponentRegistry {
    /// Register everything a provider yields; returns the number added
    pub fn discover(&mut self, provider: &dyn DescriptorProvider, pool: &BuilderPool) -> usize {
        let candidates = match provider.candidates() {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Descriptor provider '{}' failed: {:#}", provider.name(), e);
                self.add_discovery_diagnostic(Diagnostic::error(
                    DISCOVERY_FAILED,
                    format!(
                        "Component discovery failed in provider '{}': {:#}",
                        provider.name(),
                        e
                    ),
                ));
                return 0;
            }
        };

        let mut added = 0;
        for candidate in candidates {
            let name = candidate.name.clone();
            match candidate.freeze(pool) {
                Ok(descriptor) => {
                    if self.register(descriptor) == RegisterOutcome::Added {
                        added += 1;
                    }
                }
                Err(e) => {
                    warn!("Invalid descriptor '{}' from '{}': {}", name, provider.name(), e);
                    self.add_discovery_diagnostic(Diagnostic::error(
                        INVALID_CANDIDATE,
                        format!("Component '{}' from provider '{}' is invalid: {}", name, provider.name(), e),
                    ));
                }
            }
        }

        info!("Discovered {} descriptors from '{}'", added, provider.name());
        added
    }
}
