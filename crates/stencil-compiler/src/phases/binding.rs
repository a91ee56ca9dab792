//! Binding phase
//!
//! Forms the document's component scope from the scoping directives of its
//! imports and then of the document itself, and records for every element
//! the components that apply to it. All matching components are kept, in
//! registration order; conflicts between them are left to the IR passes.

use crate::document::{BoundComponents, BoundElement, DocumentStore, ImportSyntaxTrees};
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, Phase};
use crate::error::Result;
use crate::matching::ElementShape;
use crate::registry::{ComponentRegistry, ComponentScope};
use std::collections::BTreeMap;
use stencil_core::diagnostic::Diagnostic;
use stencil_core::syntax::{ElementSyntax, NodeId, SyntaxTree};
use stencil_parser::DirectiveParser;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const NAME: &str = "binding";

pub const INVALID_IMPORT_DIRECTIVE: &str = "STN2004";

pub struct BindingPhase {
    binding: FeatureBinding,
}

impl BindingPhase {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
        }
    }
}

impl Default for BindingPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for BindingPhase {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        super::BINDING_ORDER
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        self.binding.bind(NAME, engine)?;
        Ok(())
    }
}

/// Apply the scoping directives of one tree
///
/// Malformed directives are skipped; in the document they are reported by
/// directive validation, in imports they are collected into `problems`.
fn apply_directives(
    tree: &SyntaxTree,
    scope: &mut ComponentScope,
    registry: &ComponentRegistry,
    mut problems: Option<&mut Vec<Diagnostic>>,
) {
    for (_, name, argument) in tree.directives() {
        if !DirectiveParser::is_scope_directive(name) {
            continue;
        }
        match DirectiveParser::parse_scope(name, argument) {
            Ok(directive) => scope.apply(&directive, registry),
            Err(e) => {
                debug!("Skipping malformed directive in '{}': {}", tree.file_path, e);
                if let Some(problems) = problems.as_mut() {
                    // Spans index the import file, not the document
                    problems.push(Diagnostic::error(
                        INVALID_IMPORT_DIRECTIVE,
                        format!("Invalid directive in import '{}': {}", tree.file_path, e),
                    ));
                }
            }
        }
    }
}

/// Strip the tag prefix; elements without it are plain markup
fn unprefixed<'a>(tag_name: &'a str, prefix: Option<&str>) -> Option<&'a str> {
    let Some(prefix) = prefix else {
        return Some(tag_name);
    };
    let head = tag_name.as_bytes().get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix.as_bytes()) && tag_name.len() > prefix.len() {
        tag_name.get(prefix.len()..)
    } else {
        None
    }
}

impl Phase for BindingPhase {
    fn execute(&self, store: &mut DocumentStore, cancel: &CancellationToken) -> Result<()> {
        let bound = self.binding.get(NAME)?;
        let registry = bound.registry.as_ref();
        let tree = store.require::<SyntaxTree>(NAME)?;
        let imports = store.require::<ImportSyntaxTrees>(NAME)?;

        let mut scope = ComponentScope::initial(
            registry,
            bound.options.scope_mode,
            bound.options.default_tag_prefix.clone(),
        );
        let mut diagnostics = Vec::new();
        for import in &imports.0 {
            check_cancelled(cancel)?;
            apply_directives(import, &mut scope, registry, Some(&mut diagnostics));
        }
        apply_directives(tree, &mut scope, registry, None);

        let mut candidates: Vec<(NodeId, &ElementSyntax, Option<&ElementSyntax>)> = Vec::new();
        tree.walk(&mut |node, parent| {
            if let Some(element) = node.as_element() {
                if !element.opt_out {
                    candidates.push((node.id, element, parent.and_then(|p| p.as_element())));
                }
            }
        });

        let prefix = scope.tag_prefix();
        let mut elements = BTreeMap::new();
        for (id, element, parent) in candidates {
            check_cancelled(cancel)?;
            let Some(tag_name) = unprefixed(&element.tag_name, prefix) else {
                continue;
            };
            let mut shape = ElementShape::from_syntax(element, parent);
            shape.tag_name = tag_name;
            shape.parent_tag_name =
                parent.map(|p| unprefixed(&p.tag_name, prefix).unwrap_or(p.tag_name.as_str()));

            let matches = registry.query_in_scope(&shape, &scope);
            if !matches.is_empty() {
                elements.insert(
                    id,
                    BoundElement {
                        tag_name: tag_name.to_string(),
                        matches,
                    },
                );
            }
        }

        debug!(
            "Bound {} elements in '{}' ({} descriptors in scope)",
            elements.len(),
            tree.file_path,
            scope.len()
        );

        let bound_components = BoundComponents {
            elements,
            tag_prefix: prefix.map(str::to_string),
            diagnostics,
        };
        store.set(bound_components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unprefixed() {
        assert_eq!(unprefixed("input", None), Some("input"));
        assert_eq!(unprefixed("th:input", Some("th:")), Some("input"));
        assert_eq!(unprefixed("TH:input", Some("th:")), Some("input"));
        assert_eq!(unprefixed("input", Some("th:")), None);
        assert_eq!(unprefixed("th:", Some("th:")), None);
    }
}
