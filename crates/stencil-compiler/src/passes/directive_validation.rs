//! Directive validation
//!
//! Reports malformed scoping and `@using` directives, and every
//! `@tagHelperPrefix` after the first.

use super::{DUPLICATE_PREFIX, INVALID_DIRECTIVE, INVALID_USING};
use crate::document::DocumentStore;
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, SyntaxTreePass};
use crate::error::Result;
use stencil_core::diagnostic::Diagnostic;
use stencil_core::syntax::{NodeId, SyntaxTree};
use stencil_parser::directive_parser::{TAG_HELPER_PREFIX, USING};
use stencil_parser::DirectiveParser;
use tokio_util::sync::CancellationToken;

const NAME: &str = "directive_validation";

pub struct DirectiveValidationPass {
    binding: FeatureBinding,
}

impl DirectiveValidationPass {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
        }
    }
}

impl Default for DirectiveValidationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for DirectiveValidationPass {
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

impl SyntaxTreePass for DirectiveValidationPass {
    fn execute(
        &self,
        _store: &DocumentStore,
        mut tree: SyntaxTree,
        cancel: &CancellationToken,
    ) -> Result<SyntaxTree> {
        self.binding.get(NAME)?;

        let mut found: Vec<(NodeId, Diagnostic)> = Vec::new();
        let mut seen_prefix = false;
        for (node, name, argument) in tree.directives() {
            check_cancelled(cancel)?;
            if name == USING {
                if let Err(e) = DirectiveParser::parse_using(argument) {
                    found.push((node.id, Diagnostic::error(INVALID_USING, e.to_string())));
                }
                continue;
            }
            if !DirectiveParser::is_scope_directive(name) {
                continue;
            }
            if name == TAG_HELPER_PREFIX {
                if seen_prefix {
                    found.push((
                        node.id,
                        Diagnostic::error(
                            DUPLICATE_PREFIX,
                            "The tagHelperPrefix directive may only occur once per document",
                        ),
                    ));
                    continue;
                }
                seen_prefix = true;
            }
            if let Err(e) = DirectiveParser::parse_scope(name, argument) {
                found.push((node.id, Diagnostic::error(INVALID_DIRECTIVE, e.to_string())));
            }
        }

        for (id, diagnostic) in found {
            tree.add_node_diagnostic(id, diagnostic);
        }
        Ok(tree)
    }
}
