//! Component conflict detection
//!
//! Every matching component is bound to an element. When two of them consume
//! the same attribute as properties of different types, the element gets an
//! error naming both.

use super::CONFLICTING_ATTRIBUTE;
use crate::document::DocumentStore;
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, IrPass};
use crate::error::{CompileError, Result};
use crate::registry::ComponentRegistry;
use stencil_core::diagnostic::Diagnostic;
use stencil_core::ir::{DocumentIr, IrNode, IrNodeKind};
use tokio_util::sync::CancellationToken;

const NAME: &str = "component_conflict";

pub struct ComponentConflictPass {
    binding: FeatureBinding,
}

impl ComponentConflictPass {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
        }
    }
}

impl Default for ComponentConflictPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for ComponentConflictPass {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        200
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        self.binding.bind(NAME, engine)?;
        Ok(())
    }
}

fn attribute_names(node: &IrNode) -> Vec<&str> {
    node.children
        .iter()
        .filter_map(|child| match &child.kind {
            IrNodeKind::HtmlAttribute { name, .. } | IrNodeKind::BoundAttribute { name, .. } => {
                Some(name.as_str())
            }
            _ => None,
        })
        .collect()
}

fn find_conflicts(node: &IrNode, registry: &ComponentRegistry) -> Vec<Diagnostic> {
    let bindings = node.bindings();
    if bindings.len() < 2 {
        return Vec::new();
    }

    let mut conflicts = Vec::new();
    for attribute in attribute_names(node) {
        // (component, property type) for each component consuming the attribute
        let consumers: Vec<(&str, &str)> = bindings
            .iter()
            .filter_map(|binding| {
                let descriptor = registry.get(&binding.descriptor)?;
                let property = descriptor.bound_attribute_for(attribute)?;
                Some((descriptor.name(), property.type_name.as_str()))
            })
            .collect();

        let Some(&(first_component, first_type)) = consumers.first() else {
            continue;
        };
        if let Some(&(other_component, other_type)) =
            consumers.iter().find(|(_, type_name)| *type_name != first_type)
        {
            conflicts.push(Diagnostic::error(
                CONFLICTING_ATTRIBUTE,
                format!(
                    "Attribute '{}' is bound as '{}' by '{}' and as '{}' by '{}'",
                    attribute, first_type, first_component, other_type, other_component
                ),
            ));
        }
    }
    conflicts
}

impl IrPass for ComponentConflictPass {
    fn execute(
        &self,
        _store: &DocumentStore,
        mut ir: DocumentIr,
        cancel: &CancellationToken,
    ) -> Result<DocumentIr> {
        let registry = self.binding.get(NAME)?.registry.as_ref();

        ir.try_for_each_mut(|node| {
            check_cancelled(cancel)?;
            for diagnostic in find_conflicts(node, registry) {
                node.add_diagnostic(diagnostic);
            }
            Ok::<(), CompileError>(())
        })?;
        Ok(ir)
    }
}
