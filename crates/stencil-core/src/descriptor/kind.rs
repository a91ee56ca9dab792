//! Descriptor kinds, flags and nested descriptor parts

use crate::checksum::{AppendToChecksum, ChecksumBuilder};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// The variant-specific shape of a component descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DescriptorKind {
    /// Server-side behaviour attached to an ordinary markup element
    TagHelper { type_name: String },

    /// A reusable component rendered in place of the element
    Component {
        type_name: String,
        #[serde(default)]
        type_parameters: Vec<String>,
        #[serde(default)]
        has_child_content: bool,
    },

    /// Two-way binding directive (`@bind`)
    Bind {
        value_attribute: String,
        change_attribute: String,
        #[serde(default)]
        format: Option<String>,
    },

    /// Event handler directive (`@onclick`, ...)
    EventHandler { event_args_type: String },
}

/// Data-less discriminant of [`DescriptorKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindTag {
    TagHelper,
    Component,
    Bind,
    EventHandler,
}

impl KindTag {
    /// Stable discriminant byte written first into every descriptor checksum
    pub fn discriminant(self) -> u8 {
        match self {
            KindTag::TagHelper => 1,
            KindTag::Component => 2,
            KindTag::Bind => 3,
            KindTag::EventHandler => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KindTag::TagHelper => "tag_helper",
            KindTag::Component => "component",
            KindTag::Bind => "bind",
            KindTag::EventHandler => "event_handler",
        }
    }
}

impl DescriptorKind {
    pub fn tag(&self) -> KindTag {
        match self {
            DescriptorKind::TagHelper { .. } => KindTag::TagHelper,
            DescriptorKind::Component { .. } => KindTag::Component,
            DescriptorKind::Bind { .. } => KindTag::Bind,
            DescriptorKind::EventHandler { .. } => KindTag::EventHandler,
        }
    }

    /// Append the discriminant, then the variant's own fields in declared order
    pub(crate) fn append_variant(&self, builder: &mut ChecksumBuilder) {
        builder.append_byte(self.tag().discriminant());
        match self {
            DescriptorKind::TagHelper { type_name } => {
                builder.append_str(type_name);
            }
            DescriptorKind::Component {
                type_name,
                type_parameters,
                has_child_content,
            } => {
                builder
                    .append_str(type_name)
                    .append_str_seq(type_parameters)
                    .append_bool(*has_child_content);
            }
            DescriptorKind::Bind {
                value_attribute,
                change_attribute,
                format,
            } => {
                builder
                    .append_str(value_attribute)
                    .append_str(change_attribute)
                    .append_opt_str(format.as_deref());
            }
            DescriptorKind::EventHandler { event_args_type } => {
                builder.append_str(event_args_type);
            }
        }
    }
}

bitflags! {
    /// Behavioural flags of a descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DescriptorFlags: u32 {
        /// Tag and attribute names compare case-sensitively
        const CASE_SENSITIVE = 1 << 0;
    }
}

/// An attribute the component consumes as a typed property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundAttribute {
    pub name: String,
    pub property_name: String,
    pub type_name: String,

    /// Dictionary-style binding: any attribute starting with this prefix
    #[serde(default)]
    pub indexer_prefix: Option<String>,
}

impl BoundAttribute {
    pub fn new(
        name: impl Into<String>,
        property_name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            property_name: property_name.into(),
            type_name: type_name.into(),
            indexer_prefix: None,
        }
    }

    pub fn with_indexer_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.indexer_prefix = Some(prefix.into());
        self
    }

    /// Whether an element attribute with this name binds to this property
    pub fn binds(&self, attribute_name: &str, case_sensitive: bool) -> bool {
        let eq = |a: &str, b: &str| {
            if case_sensitive {
                a == b
            } else {
                a.eq_ignore_ascii_case(b)
            }
        };
        if eq(&self.name, attribute_name) {
            return true;
        }
        match &self.indexer_prefix {
            Some(prefix) => {
                attribute_name.len() > prefix.len()
                    && attribute_name.is_char_boundary(prefix.len())
                    && eq(prefix, &attribute_name[..prefix.len()])
            }
            None => false,
        }
    }
}

impl AppendToChecksum for BoundAttribute {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder) {
        builder
            .append_str(&self.name)
            .append_str(&self.property_name)
            .append_str(&self.type_name)
            .append_opt_str(self.indexer_prefix.as_deref());
    }
}

/// Free-form ordered metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl AppendToChecksum for MetadataEntry {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder) {
        builder.append_str(&self.key).append_str(&self.value);
    }
}
