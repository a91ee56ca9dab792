//! Binding rules
//!
//! A binding rule is one alternative under which a component applies to an
//! element: a tag name pattern, an optional parent tag pattern, and a list of
//! required attributes that must all be present.

use crate::checksum::{AppendToChecksum, ChecksumBuilder};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Tag name pattern that matches every element
pub const CATCH_ALL_TAG: &str = "*";

/// How a name is compared against a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameComparison {
    #[default]
    FullMatch,
    PrefixMatch,
}

impl NameComparison {
    fn tag(self) -> u8 {
        match self {
            NameComparison::FullMatch => 0,
            NameComparison::PrefixMatch => 1,
        }
    }
}

/// How an attribute value is compared; values are always case-sensitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueComparison {
    #[default]
    None,
    FullMatch,
    PrefixMatch,
    SuffixMatch,
}

impl ValueComparison {
    fn tag(self) -> u8 {
        match self {
            ValueComparison::None => 0,
            ValueComparison::FullMatch => 1,
            ValueComparison::PrefixMatch => 2,
            ValueComparison::SuffixMatch => 3,
        }
    }
}

/// A single attribute constraint within a binding rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredRule {
    pub attribute_name: String,

    #[serde(default)]
    pub name_comparison: NameComparison,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub value_comparison: ValueComparison,

    /// Case sensitivity of the attribute name comparison
    #[serde(default)]
    pub case_sensitive: bool,

    /// Directive attributes (`@bind`, `@onclick`) ignore a `:parameter` suffix
    #[serde(default)]
    pub is_directive_attribute: bool,
}

impl RequiredRule {
    /// Require an attribute with exactly this name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            name_comparison: NameComparison::FullMatch,
            value: None,
            value_comparison: ValueComparison::None,
            case_sensitive: false,
            is_directive_attribute: false,
        }
    }

    /// Require an attribute whose name starts with this prefix
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            name_comparison: NameComparison::PrefixMatch,
            ..Self::named(prefix)
        }
    }

    /// Require a directive attribute such as `@bind`
    pub fn directive(name: impl Into<String>) -> Self {
        Self {
            is_directive_attribute: true,
            ..Self::named(name)
        }
    }

    /// Constrain the attribute value
    pub fn with_value(mut self, value: impl Into<String>, comparison: ValueComparison) -> Self {
        self.value = Some(value.into());
        self.value_comparison = comparison;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Check the value/comparison invariant
    pub fn validate(&self) -> Result<()> {
        if self.value_comparison != ValueComparison::None && self.value.is_none() {
            return Err(CoreError::InvalidValue {
                field: format!("required_rules[{}].value", self.attribute_name),
                message: "a value comparison requires a value".to_string(),
            });
        }
        Ok(())
    }
}

impl AppendToChecksum for RequiredRule {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder) {
        builder
            .append_str(&self.attribute_name)
            .append_byte(self.name_comparison.tag())
            .append_opt_str(self.value.as_deref())
            .append_byte(self.value_comparison.tag())
            .append_bool(self.case_sensitive)
            .append_bool(self.is_directive_attribute);
    }
}

/// One alternative under which a descriptor applies to an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRule {
    pub tag_name_pattern: String,

    #[serde(default)]
    pub tag_name_comparison: NameComparison,

    #[serde(default)]
    pub parent_tag_pattern: Option<String>,

    #[serde(default)]
    pub required_rules: Vec<RequiredRule>,

    /// Case sensitivity of tag and parent tag comparisons
    #[serde(default)]
    pub case_sensitive: bool,
}

impl BindingRule {
    /// Rule for elements with this tag name
    pub fn tag(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name_pattern: tag_name.into(),
            tag_name_comparison: NameComparison::FullMatch,
            parent_tag_pattern: None,
            required_rules: Vec::new(),
            case_sensitive: false,
        }
    }

    /// Rule for elements whose tag name starts with this prefix
    pub fn tag_prefix(prefix: impl Into<String>) -> Self {
        Self {
            tag_name_comparison: NameComparison::PrefixMatch,
            ..Self::tag(prefix)
        }
    }

    /// Rule that applies to every element
    pub fn catch_all() -> Self {
        Self::tag(CATCH_ALL_TAG)
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_tag_pattern = Some(parent.into());
        self
    }

    pub fn require(mut self, rule: RequiredRule) -> Self {
        self.required_rules.push(rule);
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Whether the tag pattern is the catch-all
    pub fn is_catch_all(&self) -> bool {
        self.tag_name_pattern == CATCH_ALL_TAG
    }

    pub fn validate(&self) -> Result<()> {
        if self.tag_name_pattern.is_empty() {
            return Err(CoreError::MissingField("tag_name_pattern".to_string()));
        }
        for required in &self.required_rules {
            required.validate()?;
        }
        Ok(())
    }
}

impl AppendToChecksum for BindingRule {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder) {
        builder
            .append_str(&self.tag_name_pattern)
            .append_byte(self.tag_name_comparison.tag())
            .append_opt_str(self.parent_tag_pattern.as_deref())
            .append_seq(&self.required_rules)
            .append_bool(self.case_sensitive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_comparison_requires_value() {
        let mut rule = RequiredRule::named("type");
        rule.value_comparison = ValueComparison::FullMatch;
        assert!(rule.validate().is_err());

        let rule = RequiredRule::named("type").with_value("checkbox", ValueComparison::FullMatch);
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_empty_tag_pattern_is_rejected() {
        assert!(BindingRule::tag("").validate().is_err());
        assert!(BindingRule::catch_all().validate().is_ok());
    }

    #[test]
    fn test_rule_deserializes_with_defaults() {
        let json = r#"{"tag_name_pattern":"input","required_rules":[{"attribute_name":"type"}]}"#;
        let rule: BindingRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule, BindingRule::tag("input").require(RequiredRule::named("type")));
    }
}
