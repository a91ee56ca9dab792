//! Compiler error types
//!
//! Every variant is a contract violation or a host-level failure. Problems in
//! the compiled document itself are never errors: they are diagnostics on the
//! syntax or IR tree.

use crate::document::ArtifactKind;
use thiserror::Error;

/// Compiler error
#[derive(Error, Debug)]
pub enum CompileError {
    /// A phase read a slot that no earlier stage wrote
    #[error("Missing dependency: {required:?} is required by {requested_by}")]
    MissingDependency {
        required: ArtifactKind,
        requested_by: String,
    },

    /// A feature was initialized twice
    #[error("Feature '{0}' is already initialized")]
    AlreadyInitialized(String),

    /// A feature was executed before initialization
    #[error("Feature '{0}' has not been initialized")]
    NotInitialized(String),

    /// The cancellation token fired
    #[error("Compilation cancelled")]
    Cancelled,

    /// Options could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
