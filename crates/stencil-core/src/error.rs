//! Error types for Stencil Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid checksum: {0}")]
    InvalidChecksum(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
