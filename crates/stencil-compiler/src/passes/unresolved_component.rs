//! Unresolved component detection
//!
//! An element whose name starts with an uppercase letter looks like a
//! component. If nothing bound it, the document is probably missing a
//! directive, so the element gets a warning.

use super::UNRESOLVED_COMPONENT;
use crate::document::DocumentStore;
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, IrPass};
use crate::error::{CompileError, Result};
use stencil_core::diagnostic::Diagnostic;
use stencil_core::ir::{DocumentIr, IrNodeKind};
use tokio_util::sync::CancellationToken;

const NAME: &str = "unresolved_component";

pub struct UnresolvedComponentPass {
    binding: FeatureBinding,
}

impl UnresolvedComponentPass {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
        }
    }
}

impl Default for UnresolvedComponentPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for UnresolvedComponentPass {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        300
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        self.binding.bind(NAME, engine)?;
        Ok(())
    }
}

impl IrPass for UnresolvedComponentPass {
    fn execute(
        &self,
        _store: &DocumentStore,
        mut ir: DocumentIr,
        cancel: &CancellationToken,
    ) -> Result<DocumentIr> {
        self.binding.get(NAME)?;

        ir.try_for_each_mut(|node| {
            check_cancelled(cancel)?;
            let unresolved = match &node.kind {
                IrNodeKind::MarkupElement { tag_name }
                    if tag_name.starts_with(|c: char| c.is_ascii_uppercase()) =>
                {
                    Some(tag_name.clone())
                }
                _ => None,
            };
            if let Some(tag_name) = unresolved {
                node.add_diagnostic(Diagnostic::warning(
                    UNRESOLVED_COMPONENT,
                    format!(
                        "Found markup element with unexpected name '{}'. If this is intended to be a component, add a @using directive for its namespace",
                        tag_name
                    ),
                ));
            }
            Ok::<(), CompileError>(())
        })?;
        Ok(ir)
    }
}
