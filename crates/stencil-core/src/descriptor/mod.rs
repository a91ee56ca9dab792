//! Component descriptors
//!
//! A component descriptor is an immutable description of reusable behaviour
//! bound to elements through tag/attribute binding rules. Descriptors are
//! built with [`DescriptorBuilder`], frozen into [`ComponentDescriptor`] and
//! compared by checksum rather than by reference.

pub mod builder;
pub mod kind;
pub mod rule;

pub use builder::{BuilderPool, DescriptorBuilder};
pub use kind::{BoundAttribute, DescriptorFlags, DescriptorKind, KindTag, MetadataEntry};
pub use rule::{BindingRule, NameComparison, RequiredRule, ValueComparison, CATCH_ALL_TAG};

use crate::checksum::{AppendToChecksum, Checksum, ChecksumBuilder};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Frozen component descriptor
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDescriptor {
    kind: DescriptorKind,
    name: String,
    assembly: String,
    binding_rules: Vec<BindingRule>,
    bound_attributes: Vec<BoundAttribute>,
    metadata: Vec<MetadataEntry>,
    flags: DescriptorFlags,
    checksum: Checksum,
}

impl ComponentDescriptor {
    /// Start building a descriptor
    pub fn builder(
        kind: DescriptorKind,
        name: impl Into<String>,
        assembly: impl Into<String>,
    ) -> DescriptorBuilder {
        DescriptorBuilder::new(kind, name, assembly)
    }

    pub(crate) fn freeze(
        kind: DescriptorKind,
        name: String,
        assembly: String,
        binding_rules: Vec<BindingRule>,
        bound_attributes: Vec<BoundAttribute>,
        metadata: Vec<MetadataEntry>,
        flags: DescriptorFlags,
    ) -> Self {
        let mut descriptor = Self {
            kind,
            name,
            assembly,
            binding_rules,
            bound_attributes,
            metadata,
            flags,
            checksum: ChecksumBuilder::new().finalize(),
        };
        descriptor.checksum = Checksum::of(&descriptor);
        descriptor
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assembly(&self) -> &str {
        &self.assembly
    }

    pub fn binding_rules(&self) -> &[BindingRule] {
        &self.binding_rules
    }

    pub fn bound_attributes(&self) -> &[BoundAttribute] {
        &self.bound_attributes
    }

    pub fn metadata(&self) -> &[MetadataEntry] {
        &self.metadata
    }

    /// Look up a metadata value by key (first entry wins)
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    pub fn flags(&self) -> DescriptorFlags {
        self.flags
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.flags.contains(DescriptorFlags::CASE_SENSITIVE)
    }

    /// Structural identity of this descriptor
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// First bound attribute consuming an element attribute of this name
    pub fn bound_attribute_for(&self, attribute_name: &str) -> Option<&BoundAttribute> {
        let case_sensitive = self.is_case_sensitive();
        self.bound_attributes
            .iter()
            .find(|bound| bound.binds(attribute_name, case_sensitive))
    }
}

impl AppendToChecksum for ComponentDescriptor {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder) {
        self.kind.append_variant(builder);
        builder
            .append_str(&self.name)
            .append_str(&self.assembly)
            .append_seq(&self.binding_rules)
            .append_seq(&self.bound_attributes)
            .append_seq(&self.metadata)
            .append_u32(self.flags.bits());
    }
}

impl PartialEq for ComponentDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.checksum == other.checksum
    }
}

impl Eq for ComponentDescriptor {}

impl Hash for ComponentDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.checksum.hash(state);
    }
}
