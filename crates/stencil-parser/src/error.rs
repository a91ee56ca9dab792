//! Parser error types

use thiserror::Error;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Directive used without its required argument
    #[error("Directive '@{0}' requires an argument")]
    MissingArgument(String),

    /// Directive argument is malformed
    #[error("Invalid argument for directive '@{directive}': {message}")]
    InvalidDirective { directive: String, message: String },

    /// Directive is not a scoping directive
    #[error("Unknown directive: {0}")]
    UnknownDirective(String),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
