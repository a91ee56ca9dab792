//! Stencil Core - Core types and definitions for the Stencil template compiler
//!
//! This crate provides the fundamental types shared by the parser and compiler:
//! - Checksum identity for structural hashing of descriptors
//! - Component descriptors, binding rules and their builders
//! - Source documents and import items
//! - Syntax tree and IR (Intermediate Representation) definitions
//! - Diagnostics and error types

pub mod checksum;
pub mod descriptor;
pub mod diagnostic;
pub mod error;
pub mod ir;
pub mod source;
pub mod syntax;

// Re-export commonly used types
pub use checksum::{AppendToChecksum, Checksum, ChecksumBuilder};
pub use descriptor::{
    BindingRule, BoundAttribute, BuilderPool, ComponentDescriptor, DescriptorBuilder,
    DescriptorFlags, DescriptorKind, KindTag, MetadataEntry, NameComparison, RequiredRule,
    ValueComparison,
};
pub use diagnostic::{Diagnostic, Severity, SourceSpan};
pub use error::CoreError;
pub use source::{ImportItem, SourceDocument};
