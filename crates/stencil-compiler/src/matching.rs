//! Rule matching
//!
//! Decides whether a binding rule applies to an element. Matching is total and
//! never mutates the element or the descriptor.
//!
//! A descriptor applies if any of its rules matches; a rule matches if its tag
//! and parent tag match and every required rule is satisfied by some attribute.

use stencil_core::descriptor::{
    BindingRule, ComponentDescriptor, NameComparison, RequiredRule, ValueComparison,
};
use stencil_core::syntax::ElementSyntax;

/// The parts of an element that rule matching looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementShape<'a> {
    pub tag_name: &'a str,
    pub parent_tag_name: Option<&'a str>,
    /// `(name, value)` pairs; minimized attributes have an empty value
    pub attributes: Vec<(&'a str, &'a str)>,
}

impl<'a> ElementShape<'a> {
    pub fn new(tag_name: &'a str) -> Self {
        Self {
            tag_name,
            parent_tag_name: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_tag_name: &'a str) -> Self {
        self.parent_tag_name = Some(parent_tag_name);
        self
    }

    pub fn with_attribute(mut self, name: &'a str, value: &'a str) -> Self {
        self.attributes.push((name, value));
        self
    }

    /// Shape of a parsed element
    pub fn from_syntax(element: &'a ElementSyntax, parent: Option<&'a ElementSyntax>) -> Self {
        Self {
            tag_name: &element.tag_name,
            parent_tag_name: parent.map(|p| p.tag_name.as_str()),
            attributes: element
                .attributes
                .iter()
                .map(|a| (a.name.as_str(), a.value.as_match_text()))
                .collect(),
        }
    }
}

/// Binding rule matcher
pub struct RuleMatcher;

impl RuleMatcher {
    /// Indices of the descriptor's rules that match the element
    ///
    /// A `CASE_SENSITIVE` descriptor compares every tag and attribute name of
    /// its rules case-sensitively, the same way its bound attributes consume.
    pub fn matching_rules(descriptor: &ComponentDescriptor, element: &ElementShape<'_>) -> Vec<usize> {
        let case_sensitive = descriptor.is_case_sensitive();
        descriptor
            .binding_rules()
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule_matches(rule, element, case_sensitive))
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether a single binding rule matches the element
    pub fn matches_rule(rule: &BindingRule, element: &ElementShape<'_>) -> bool {
        rule_matches(rule, element, false)
    }

    /// Whether some attribute of the element satisfies the required rule
    pub fn matches_required(required: &RequiredRule, element: &ElementShape<'_>) -> bool {
        required_matches(required, element, false)
    }
}

fn rule_matches(rule: &BindingRule, element: &ElementShape<'_>, force_case: bool) -> bool {
    let case_sensitive = rule.case_sensitive || force_case;
    if !rule.is_catch_all()
        && !compare_name(
            &rule.tag_name_pattern,
            element.tag_name,
            rule.tag_name_comparison,
            case_sensitive,
        )
    {
        return false;
    }

    if let Some(parent_pattern) = &rule.parent_tag_pattern {
        let Some(parent) = element.parent_tag_name else {
            return false;
        };
        if !compare_name(parent_pattern, parent, NameComparison::FullMatch, case_sensitive) {
            return false;
        }
    }

    rule.required_rules
        .iter()
        .all(|required| required_matches(required, element, force_case))
}

fn required_matches(required: &RequiredRule, element: &ElementShape<'_>, force_case: bool) -> bool {
    element.attributes.iter().any(|&(name, value)| {
        let name = if required.is_directive_attribute {
            name.split(':').next().unwrap_or(name)
        } else {
            name
        };
        compare_name(
            &required.attribute_name,
            name,
            required.name_comparison,
            required.case_sensitive || force_case,
        ) && compare_value(required, value)
    })
}

fn compare_name(pattern: &str, name: &str, comparison: NameComparison, case_sensitive: bool) -> bool {
    let (pattern, name) = (pattern.as_bytes(), name.as_bytes());
    let candidate = match comparison {
        NameComparison::FullMatch => name,
        NameComparison::PrefixMatch if name.len() >= pattern.len() => &name[..pattern.len()],
        NameComparison::PrefixMatch => return false,
    };
    if case_sensitive {
        candidate == pattern
    } else {
        candidate.eq_ignore_ascii_case(pattern)
    }
}

/// Values always compare case-sensitively
fn compare_value(required: &RequiredRule, value: &str) -> bool {
    let expected = required.value.as_deref();
    match (required.value_comparison, expected) {
        (ValueComparison::None, _) => true,
        (_, None) => false,
        (ValueComparison::FullMatch, Some(expected)) => value == expected,
        (ValueComparison::PrefixMatch, Some(expected)) => value.starts_with(expected),
        (ValueComparison::SuffixMatch, Some(expected)) => value.ends_with(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_name_comparison() {
        assert!(compare_name("th:", "TH:input", NameComparison::PrefixMatch, false));
        assert!(!compare_name("th:", "TH:input", NameComparison::PrefixMatch, true));
        assert!(!compare_name("long-prefix", "lo", NameComparison::PrefixMatch, false));
        assert!(compare_name("", "anything", NameComparison::PrefixMatch, true));
    }

    #[test]
    fn test_full_name_comparison() {
        assert!(compare_name("input", "INPUT", NameComparison::FullMatch, false));
        assert!(!compare_name("input", "INPUT", NameComparison::FullMatch, true));
        assert!(!compare_name("input", "inputs", NameComparison::FullMatch, false));
    }

    #[test]
    fn test_directive_attribute_ignores_parameter() {
        let required = RequiredRule::directive("@bind");
        let element = ElementShape::new("input").with_attribute("@bind:format", "yyyy");
        assert!(RuleMatcher::matches_required(&required, &element));

        let plain = RequiredRule::named("@bind");
        assert!(!RuleMatcher::matches_required(&plain, &element));
    }

    #[test]
    fn test_catch_all_still_checks_required_rules() {
        let rule = BindingRule::catch_all().require(RequiredRule::named("asp-if"));
        assert!(RuleMatcher::matches_rule(
            &rule,
            &ElementShape::new("anything").with_attribute("asp-if", "x")
        ));
        assert!(!RuleMatcher::matches_rule(&rule, &ElementShape::new("anything")));
    }
}
