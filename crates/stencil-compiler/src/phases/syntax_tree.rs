//! Syntax tree phase
//!
//! Folds the syntax tree through every syntax pass, in order. The tree slot is
//! only replaced once the whole fold has completed.

use crate::document::DocumentStore;
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, Phase, SyntaxTreePass};
use crate::error::Result;
use std::sync::{Arc, OnceLock};
use stencil_core::syntax::SyntaxTree;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const NAME: &str = "syntax_tree";

pub struct SyntaxTreePhase {
    binding: FeatureBinding,
    passes: OnceLock<Vec<Arc<dyn SyntaxTreePass>>>,
}

impl SyntaxTreePhase {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
            passes: OnceLock::new(),
        }
    }
}

impl Default for SyntaxTreePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for SyntaxTreePhase {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        super::SYNTAX_TREE_ORDER
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        let bound = self.binding.bind(NAME, engine)?;
        let passes = if bound.options.enable_syntax_passes {
            engine.syntax_passes().to_vec()
        } else {
            Vec::new()
        };
        let _ = self.passes.set(passes);
        Ok(())
    }
}

impl Phase for SyntaxTreePhase {
    fn execute(&self, store: &mut DocumentStore, cancel: &CancellationToken) -> Result<()> {
        self.binding.get(NAME)?;
        let passes = self.passes.get().map(Vec::as_slice).unwrap_or_default();

        let mut tree = store.require::<SyntaxTree>(NAME)?.clone();
        for pass in passes {
            check_cancelled(cancel)?;
            debug!("Running syntax pass '{}'", pass.name());
            tree = pass.execute(store, tree, cancel)?;
        }
        check_cancelled(cancel)?;

        store.set(tree)
    }
}
