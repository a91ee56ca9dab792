//! Descriptor builders and builder pooling
//!
//! Discovery can produce thousands of descriptors, so builders may be recycled
//! through a [`BuilderPool`]. Pooling only avoids re-allocating the scratch
//! vectors; a pooled build and a fresh build of the same input produce equal
//! descriptors.

use super::kind::{BoundAttribute, DescriptorFlags, DescriptorKind, KindTag, MetadataEntry};
use super::rule::BindingRule;
use super::ComponentDescriptor;
use crate::error::{CoreError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Mutable builder for a [`ComponentDescriptor`]
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    kind: DescriptorKind,
    name: String,
    assembly: String,
    binding_rules: Vec<BindingRule>,
    bound_attributes: Vec<BoundAttribute>,
    metadata: Vec<MetadataEntry>,
    flags: DescriptorFlags,
}

impl DescriptorBuilder {
    pub fn new(kind: DescriptorKind, name: impl Into<String>, assembly: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            assembly: assembly.into(),
            binding_rules: Vec::new(),
            bound_attributes: Vec::new(),
            metadata: Vec::new(),
            flags: DescriptorFlags::empty(),
        }
    }

    /// Add a binding rule (rules are alternatives)
    pub fn rule(mut self, rule: BindingRule) -> Self {
        self.binding_rules.push(rule);
        self
    }

    pub fn bound_attribute(mut self, attribute: BoundAttribute) -> Self {
        self.bound_attributes.push(attribute);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetadataEntry::new(key, value));
        self
    }

    pub fn flags(mut self, flags: DescriptorFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn push_rule(&mut self, rule: BindingRule) {
        self.binding_rules.push(rule);
    }

    pub fn push_bound_attribute(&mut self, attribute: BoundAttribute) {
        self.bound_attributes.push(attribute);
    }

    pub fn push_metadata(&mut self, entry: MetadataEntry) {
        self.metadata.push(entry);
    }

    pub fn set_flags(&mut self, flags: DescriptorFlags) {
        self.flags = flags;
    }

    pub fn kind_tag(&self) -> KindTag {
        self.kind.tag()
    }

    /// Freeze into an immutable descriptor
    pub fn build(self) -> Result<ComponentDescriptor> {
        self.validate()?;
        Ok(ComponentDescriptor::freeze(
            self.kind,
            self.name,
            self.assembly,
            self.binding_rules,
            self.bound_attributes,
            self.metadata,
            self.flags,
        ))
    }

    fn build_copy(&self) -> Result<ComponentDescriptor> {
        self.validate()?;
        Ok(ComponentDescriptor::freeze(
            self.kind.clone(),
            self.name.clone(),
            self.assembly.clone(),
            self.binding_rules.clone(),
            self.bound_attributes.clone(),
            self.metadata.clone(),
            self.flags,
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CoreError::MissingField("name".to_string()));
        }
        if self.binding_rules.is_empty() {
            return Err(CoreError::InvalidValue {
                field: format!("{}.binding_rules", self.name),
                message: "a descriptor needs at least one binding rule".to_string(),
            });
        }
        for rule in &self.binding_rules {
            rule.validate()?;
        }
        Ok(())
    }

    /// Clear all content, keeping allocated capacity
    fn reset(&mut self, kind: DescriptorKind, name: String, assembly: String) {
        self.kind = kind;
        self.name = name;
        self.assembly = assembly;
        self.binding_rules.clear();
        self.bound_attributes.clear();
        self.metadata.clear();
        self.flags = DescriptorFlags::empty();
    }
}

/// Pool of reusable builders keyed by descriptor kind
pub struct BuilderPool {
    free: Mutex<HashMap<KindTag, Vec<DescriptorBuilder>>>,
    max_per_kind: usize,
}

impl BuilderPool {
    pub const DEFAULT_MAX_PER_KIND: usize = 16;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_PER_KIND)
    }

    pub fn with_capacity(max_per_kind: usize) -> Self {
        Self {
            free: Mutex::new(HashMap::new()),
            max_per_kind,
        }
    }

    /// Take a reset builder from the pool, or allocate a new one
    pub fn acquire(
        &self,
        kind: DescriptorKind,
        name: impl Into<String>,
        assembly: impl Into<String>,
    ) -> DescriptorBuilder {
        let recycled = self.free.lock().get_mut(&kind.tag()).and_then(Vec::pop);
        match recycled {
            Some(mut builder) => {
                builder.reset(kind, name.into(), assembly.into());
                builder
            }
            None => DescriptorBuilder::new(kind, name, assembly),
        }
    }

    /// Build the descriptor and return the builder to the pool
    pub fn freeze(&self, builder: DescriptorBuilder) -> Result<ComponentDescriptor> {
        let descriptor = builder.build_copy();
        self.release(builder);
        descriptor
    }

    /// Return a builder without building it
    pub fn release(&self, builder: DescriptorBuilder) {
        let mut free = self.free.lock();
        let slot = free.entry(builder.kind_tag()).or_default();
        if slot.len() < self.max_per_kind {
            slot.push(builder);
        }
    }

    /// Number of idle builders held for a kind
    pub fn idle(&self, kind: KindTag) -> usize {
        self.free.lock().get(&kind).map_or(0, Vec::len)
    }
}

impl Default for BuilderPool {
    fn default() -> Self {
        Self::new()
    }
}
