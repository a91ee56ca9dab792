//! Built-in syntax tree and IR passes

pub mod component_conflict;
pub mod directive_validation;
pub mod html_merge;
pub mod unresolved_component;
pub mod usings_hoist;

pub use component_conflict::ComponentConflictPass;
pub use directive_validation::DirectiveValidationPass;
pub use html_merge::HtmlMergePass;
pub use unresolved_component::UnresolvedComponentPass;
pub use usings_hoist::UsingsHoistPass;

/// Malformed directive argument
pub const INVALID_DIRECTIVE: &str = "STN2001";
/// More than one `@tagHelperPrefix`
pub const DUPLICATE_PREFIX: &str = "STN2002";
/// Malformed `@using`
pub const INVALID_USING: &str = "STN2003";
/// Matched components bind one attribute with different types
pub const CONFLICTING_ATTRIBUTE: &str = "STN3001";
/// Component-like element that nothing binds
pub const UNRESOLVED_COMPONENT: &str = "STN3002";
