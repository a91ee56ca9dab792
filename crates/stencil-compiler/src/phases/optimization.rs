//! Optimization phase
//!
//! Folds the IR tree through every IR pass, in order. Cancellation is checked
//! between passes and the IR slot is only replaced after the last pass.

use crate::document::DocumentStore;
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, IrPass, Phase};
use crate::error::Result;
use std::sync::{Arc, OnceLock};
use stencil_core::ir::DocumentIr;
use stencil_core::syntax::SyntaxTree;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const NAME: &str = "optimization";

pub struct OptimizationPhase {
    binding: FeatureBinding,
    passes: OnceLock<Vec<Arc<dyn IrPass>>>,
}

impl OptimizationPhase {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
            passes: OnceLock::new(),
        }
    }
}

impl Default for OptimizationPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for OptimizationPhase {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        super::OPTIMIZATION_ORDER
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        let bound = self.binding.bind(NAME, engine)?;
        let passes = if bound.options.enable_optimization {
            engine.ir_passes().to_vec()
        } else {
            Vec::new()
        };
        let _ = self.passes.set(passes);
        Ok(())
    }
}

impl Phase for OptimizationPhase {
    fn execute(&self, store: &mut DocumentStore, cancel: &CancellationToken) -> Result<()> {
        self.binding.get(NAME)?;
        let passes = self.passes.get().map(Vec::as_slice).unwrap_or_default();

        store.require::<SyntaxTree>(NAME)?;
        let mut ir = store.require::<DocumentIr>(NAME)?.clone();
        for pass in passes {
            check_cancelled(cancel)?;
            debug!("Running IR pass '{}'", pass.name());
            ir = pass.execute(store, ir, cancel)?;
        }
        check_cancelled(cancel)?;

        store.set(ir)
    }
}
