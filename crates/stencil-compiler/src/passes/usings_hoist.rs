//! Usings hoisting
//!
//! Moves top-level `@using` nodes out of the body into the document's using
//! list. Usings from imports come first, in import order; duplicates keep
//! their first position.

use crate::document::{DocumentStore, ImportSyntaxTrees};
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, IrPass};
use crate::error::Result;
use stencil_core::ir::{DocumentIr, IrNode, IrNodeKind};
use stencil_parser::directive_parser::USING;
use stencil_parser::DirectiveParser;
use tokio_util::sync::CancellationToken;

const NAME: &str = "usings_hoist";

pub struct UsingsHoistPass {
    binding: FeatureBinding,
}

impl UsingsHoistPass {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
        }
    }
}

impl Default for UsingsHoistPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for UsingsHoistPass {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        100
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        self.binding.bind(NAME, engine)?;
        Ok(())
    }
}

impl IrPass for UsingsHoistPass {
    fn execute(
        &self,
        store: &DocumentStore,
        mut ir: DocumentIr,
        cancel: &CancellationToken,
    ) -> Result<DocumentIr> {
        self.binding.get(NAME)?;

        let imports = store.require::<ImportSyntaxTrees>(NAME)?;

        let mut usings = Vec::new();
        for tree in &imports.0 {
            for (_, name, argument) in tree.directives() {
                if name == USING {
                    if let Ok(namespace) = DirectiveParser::parse_using(argument) {
                        usings.push(namespace);
                    }
                }
            }
        }
        usings.append(&mut ir.usings);

        let mut body = Vec::with_capacity(ir.children.len());
        for node in std::mem::take(&mut ir.children) {
            check_cancelled(cancel)?;
            match node.kind {
                IrNodeKind::Using { namespace } => {
                    usings.push(namespace);
                    ir.diagnostics.extend(node.diagnostics);
                }
                kind => body.push(IrNode { kind, ..node }),
            }
        }

        let mut hoisted: Vec<String> = Vec::with_capacity(usings.len());
        for namespace in usings {
            if !hoisted.contains(&namespace) {
                hoisted.push(namespace);
            }
        }

        ir.usings = hoisted;
        ir.children = body;
        Ok(ir)
    }
}
