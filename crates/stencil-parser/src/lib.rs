//! Stencil Parser - markup to syntax tree parser for the Stencil template compiler
//!
//! This crate turns mixed markup/embedded-code source text into a
//! [`stencil_core::syntax::SyntaxTree`]. Malformed markup never fails the
//! parse: problems are recorded as diagnostics on the nearest node.

pub mod directive_parser;
pub mod error;
pub mod markup_parser;

// Re-export main parser types
pub use directive_parser::{DirectiveParser, ScopeDirective};
pub use error::{ParseError, Result};
pub use markup_parser::{MarkupParser, KNOWN_DIRECTIVES, VOID_ELEMENTS};
