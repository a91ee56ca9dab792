//! Component registry
//!
//! Holds every discovered component descriptor in registration order and
//! answers which of them apply to an element. Candidates are narrowed through
//! a tag name index; descriptors with prefix or catch-all rules are always
//! candidates. Results are always in registration order.

use crate::matching::{ElementShape, RuleMatcher};
use crate::options::ScopeMode;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use stencil_core::checksum::Checksum;
use stencil_core::descriptor::{ComponentDescriptor, DescriptorKind, NameComparison};
use stencil_core::diagnostic::Diagnostic;
use stencil_parser::ScopeDirective;
use tracing::debug;

/// Outcome of registering a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Added,
    /// A descriptor with the same checksum was already registered
    Duplicate,
}

/// A descriptor that applies to an element, with the rules that matched
#[derive(Debug, Clone)]
pub struct ComponentMatch {
    pub descriptor: Arc<ComponentDescriptor>,
    /// Indices into the descriptor's binding rules
    pub matched_rules: Vec<usize>,
}

/// Registry of component descriptors
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    descriptors: Vec<Arc<ComponentDescriptor>>,
    by_checksum: HashMap<Checksum, usize>,
    /// Lower-cased full-match tag name -> descriptor positions
    tag_index: HashMap<String, Vec<usize>>,
    /// Descriptors with at least one prefix or catch-all rule
    unindexed: Vec<usize>,
    /// Problems reported while discovering descriptors
    discovery_diagnostics: Vec<Diagnostic>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; checksum duplicates are dropped
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> RegisterOutcome {
        let checksum = descriptor.checksum();
        if self.by_checksum.contains_key(&checksum) {
            debug!(
                "Skipping duplicate descriptor '{}' ({})",
                descriptor.name(),
                checksum
            );
            return RegisterOutcome::Duplicate;
        }

        let position = self.descriptors.len();
        let mut unindexed = false;
        for rule in descriptor.binding_rules() {
            if rule.is_catch_all() || rule.tag_name_comparison == NameComparison::PrefixMatch {
                unindexed = true;
                continue;
            }
            let entry = self
                .tag_index
                .entry(rule.tag_name_pattern.to_ascii_lowercase())
                .or_default();
            if entry.last() != Some(&position) {
                entry.push(position);
            }
        }
        if unindexed {
            self.unindexed.push(position);
        }

        debug!("Registered descriptor '{}' ({})", descriptor.name(), checksum);
        self.by_checksum.insert(checksum, position);
        self.descriptors.push(Arc::new(descriptor));
        RegisterOutcome::Added
    }

    /// All descriptors that apply to the element, in registration order
    pub fn query(&self, element: &ElementShape<'_>) -> Vec<ComponentMatch> {
        self.query_filtered(element, |_| true)
    }

    /// Like [`query`](Self::query), restricted to descriptors in scope
    pub fn query_in_scope(&self, element: &ElementShape<'_>, scope: &ComponentScope) -> Vec<ComponentMatch> {
        self.query_filtered(element, |descriptor| scope.admits(descriptor))
    }

    fn query_filtered(
        &self,
        element: &ElementShape<'_>,
        admit: impl Fn(&ComponentDescriptor) -> bool,
    ) -> Vec<ComponentMatch> {
        let mut candidates: Vec<usize> = self
            .tag_index
            .get(&element.tag_name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default();
        candidates.extend(self.unindexed.iter().copied());
        candidates.sort_unstable();
        candidates.dedup();

        candidates
            .into_iter()
            .filter_map(|position| {
                let descriptor = &self.descriptors[position];
                if !admit(descriptor.as_ref()) {
                    return None;
                }
                let matched_rules = RuleMatcher::matching_rules(descriptor, element);
                if matched_rules.is_empty() {
                    return None;
                }
                Some(ComponentMatch {
                    descriptor: Arc::clone(descriptor),
                    matched_rules,
                })
            })
            .collect()
    }

    /// Look up a descriptor by checksum
    pub fn get(&self, checksum: &Checksum) -> Option<&Arc<ComponentDescriptor>> {
        self.by_checksum
            .get(checksum)
            .map(|position| &self.descriptors[*position])
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> &[Arc<ComponentDescriptor>] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn add_discovery_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.discovery_diagnostics.push(diagnostic);
    }

    pub fn discovery_diagnostics(&self) -> &[Diagnostic] {
        &self.discovery_diagnostics
    }
}

/// The set of descriptors a document may bind, formed by its directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentScope {
    admitted: HashSet<Checksum>,
    tag_prefix: Option<String>,
}

impl ComponentScope {
    /// Scope holding every registered descriptor
    pub fn all(registry: &ComponentRegistry) -> Self {
        Self {
            admitted: registry.descriptors.iter().map(|d| d.checksum()).collect(),
            tag_prefix: None,
        }
    }

    /// Scope holding nothing
    pub fn empty() -> Self {
        Self {
            admitted: HashSet::new(),
            tag_prefix: None,
        }
    }

    /// Starting scope for a document
    pub fn initial(registry: &ComponentRegistry, mode: ScopeMode, tag_prefix: Option<String>) -> Self {
        let mut scope = match mode {
            ScopeMode::All => Self::all(registry),
            ScopeMode::Directives => Self::empty(),
        };
        scope.tag_prefix = tag_prefix.filter(|prefix| !prefix.is_empty());
        scope
    }

    /// Apply a scoping directive
    pub fn apply(&mut self, directive: &ScopeDirective, registry: &ComponentRegistry) {
        match directive {
            ScopeDirective::Add {
                type_pattern,
                assembly,
            } => {
                for descriptor in registry.descriptors() {
                    if matches_lookup(descriptor, type_pattern, assembly) {
                        self.admitted.insert(descriptor.checksum());
                    }
                }
            }
            ScopeDirective::Remove {
                type_pattern,
                assembly,
            } => {
                for descriptor in registry.descriptors() {
                    if matches_lookup(descriptor, type_pattern, assembly) {
                        self.admitted.remove(&descriptor.checksum());
                    }
                }
            }
            ScopeDirective::Prefix(prefix) => {
                self.tag_prefix = Some(prefix.clone()).filter(|prefix| !prefix.is_empty());
            }
        }
    }

    pub fn admits(&self, descriptor: &ComponentDescriptor) -> bool {
        self.admitted.contains(&descriptor.checksum())
    }

    pub fn tag_prefix(&self) -> Option<&str> {
        self.tag_prefix.as_deref()
    }

    pub fn len(&self) -> usize {
        self.admitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty()
    }
}

/// Type name a lookup pattern is compared against
fn lookup_type_name(descriptor: &ComponentDescriptor) -> &str {
    match descriptor.kind() {
        DescriptorKind::TagHelper { type_name } | DescriptorKind::Component { type_name, .. } => {
            type_name.as_str()
        }
        _ => descriptor.name(),
    }
}

/// `*` matches every type of the assembly; a trailing `*` is a prefix
fn matches_lookup(descriptor: &ComponentDescriptor, type_pattern: &str, assembly: &str) -> bool {
    if descriptor.assembly() != assembly {
        return false;
    }
    let type_name = lookup_type_name(descriptor);
    match type_pattern.strip_suffix('*') {
        Some(prefix) => type_name.starts_with(prefix),
        None => type_name == type_pattern,
    }
}
