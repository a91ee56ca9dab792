//! Directive argument parser
//!
//! Parses the arguments of the scoping directives:
//! ```text
//! @addTagHelper *, Web.TagHelpers
//! @addTagHelper "Web.TagHelpers.Input*, Web.TagHelpers"
//! @removeTagHelper Web.TagHelpers.InputTagHelper, Web.TagHelpers
//! @tagHelperPrefix th:
//! @using Web.Components
//! ```

use crate::error::{ParseError, Result};

pub const ADD_TAG_HELPER: &str = "addTagHelper";
pub const REMOVE_TAG_HELPER: &str = "removeTagHelper";
pub const TAG_HELPER_PREFIX: &str = "tagHelperPrefix";
pub const USING: &str = "using";

/// Characters a tag helper prefix may not contain
const INVALID_PREFIX_CHARS: &[char] = &['!', '"', '\'', '/', '<', '>', '?', '@', '='];

/// A directive that changes which components are in scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeDirective {
    Add {
        type_pattern: String,
        assembly: String,
    },
    Remove {
        type_pattern: String,
        assembly: String,
    },
    Prefix(String),
}

/// Directive argument parser
pub struct DirectiveParser;

impl DirectiveParser {
    /// Parse a scoping directive; other directives yield `UnknownDirective`
    pub fn parse_scope(name: &str, argument: &str) -> Result<ScopeDirective> {
        match name {
            ADD_TAG_HELPER => {
                let (type_pattern, assembly) = Self::parse_lookup(name, argument)?;
                Ok(ScopeDirective::Add {
                    type_pattern,
                    assembly,
                })
            }
            REMOVE_TAG_HELPER => {
                let (type_pattern, assembly) = Self::parse_lookup(name, argument)?;
                Ok(ScopeDirective::Remove {
                    type_pattern,
                    assembly,
                })
            }
            TAG_HELPER_PREFIX => Self::parse_prefix(argument).map(ScopeDirective::Prefix),
            other => Err(ParseError::UnknownDirective(other.to_string())),
        }
    }

    /// Whether a directive name is one of the scoping directives
    pub fn is_scope_directive(name: &str) -> bool {
        matches!(name, ADD_TAG_HELPER | REMOVE_TAG_HELPER | TAG_HELPER_PREFIX)
    }

    /// Parse a `@using` namespace
    pub fn parse_using(argument: &str) -> Result<String> {
        let namespace = argument.trim().trim_end_matches(';').trim();
        if namespace.is_empty() {
            return Err(ParseError::MissingArgument(USING.to_string()));
        }
        let valid = namespace.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        });
        if !valid {
            return Err(ParseError::InvalidDirective {
                directive: USING.to_string(),
                message: format!("'{}' is not a namespace", namespace),
            });
        }
        Ok(namespace.to_string())
    }

    /// Parse a `@tagHelperPrefix` value; an empty value clears the prefix
    pub fn parse_prefix(argument: &str) -> Result<String> {
        let prefix = Self::unquote(argument.trim());
        if let Some(bad) = prefix
            .chars()
            .find(|c| c.is_whitespace() || INVALID_PREFIX_CHARS.contains(c))
        {
            return Err(ParseError::InvalidDirective {
                directive: TAG_HELPER_PREFIX.to_string(),
                message: format!("prefix '{}' contains invalid character '{}'", prefix, bad),
            });
        }
        Ok(prefix.to_string())
    }

    fn parse_lookup(name: &str, argument: &str) -> Result<(String, String)> {
        let text = Self::unquote(argument.trim());
        if text.is_empty() {
            return Err(ParseError::MissingArgument(name.to_string()));
        }

        let Some((type_pattern, assembly)) = text.split_once(',') else {
            return Err(ParseError::InvalidDirective {
                directive: name.to_string(),
                message: format!("expected 'type pattern, assembly' but found '{}'", text),
            });
        };

        let type_pattern = type_pattern.trim();
        let assembly = assembly.trim();
        if type_pattern.is_empty() || assembly.is_empty() {
            return Err(ParseError::InvalidDirective {
                directive: name.to_string(),
                message: "type pattern and assembly must both be present".to_string(),
            });
        }

        Ok((type_pattern.to_string(), assembly.to_string()))
    }

    fn unquote(text: &str) -> &str {
        text.strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_tag_helper() {
        let directive = DirectiveParser::parse_scope(ADD_TAG_HELPER, "*, Web.TagHelpers").unwrap();
        assert_eq!(
            directive,
            ScopeDirective::Add {
                type_pattern: "*".to_string(),
                assembly: "Web.TagHelpers".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_quoted_remove() {
        let directive =
            DirectiveParser::parse_scope(REMOVE_TAG_HELPER, "\"Web.Input*, Web\"").unwrap();
        assert_eq!(
            directive,
            ScopeDirective::Remove {
                type_pattern: "Web.Input*".to_string(),
                assembly: "Web".to_string(),
            }
        );
    }

    #[test]
    fn test_lookup_without_assembly_is_invalid() {
        let err = DirectiveParser::parse_scope(ADD_TAG_HELPER, "Web.Input").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDirective { .. }));

        let err = DirectiveParser::parse_scope(ADD_TAG_HELPER, "  ").unwrap_err();
        assert_eq!(err, ParseError::MissingArgument(ADD_TAG_HELPER.to_string()));
    }

    #[test]
    fn test_prefix_validation() {
        assert_eq!(DirectiveParser::parse_prefix("th:").unwrap(), "th:");
        assert_eq!(DirectiveParser::parse_prefix("\"\"").unwrap(), "");
        assert!(DirectiveParser::parse_prefix("t h").is_err());
        assert!(DirectiveParser::parse_prefix("th@").is_err());
    }

    #[test]
    fn test_parse_using() {
        assert_eq!(
            DirectiveParser::parse_using(" Web.Components; ").unwrap(),
            "Web.Components"
        );
        assert!(DirectiveParser::parse_using("Web..Components").is_err());
        assert!(DirectiveParser::parse_using("").is_err());
    }

    #[test]
    fn test_unknown_scope_directive() {
        assert_eq!(
            DirectiveParser::parse_scope("page", "/index").unwrap_err(),
            ParseError::UnknownDirective("page".to_string())
        );
    }
}
