//! Stencil Compiler - phased compilation engine for Stencil templates
//!
//! This crate turns a source document into an annotated IR tree:
//! - [`engine`]: the Engine, its Phases and Passes
//! - [`document`]: the per-document artifact store
//! - [`matching`] and [`registry`]: component binding
//! - [`discovery`]: the descriptor discovery feed
//! - [`phases`] and [`passes`]: built-in features

pub mod discovery;
pub mod document;
pub mod engine;
pub mod error;
pub mod matching;
pub mod options;
pub mod passes;
pub mod phases;
pub mod project;
pub mod registry;

// Re-export main types
pub use discovery::{DescriptorCandidate, DescriptorProvider, JsonProvider, StaticProvider};
pub use document::{
    Artifact, ArtifactKind, BoundComponents, BoundElement, DocumentStore, ImportSources,
    ImportSyntaxTrees,
};
pub use engine::{
    CompilationOutput, Engine, EngineBuilder, EngineContext, Feature, FeatureBinding, IrPass,
    Phase, SyntaxTreePass,
};
pub use error::{CompileError, Result};
pub use matching::{ElementShape, RuleMatcher};
pub use options::{CompilerOptions, ScopeMode};
pub use project::{ImportProvider, InMemoryProject};
pub use registry::{ComponentMatch, ComponentRegistry, ComponentScope, RegisterOutcome};

// Cancellation is cooperative and shared with hosts
pub use tokio_util::sync::CancellationToken;
