//! Features: phases and passes
//!
//! A feature is initialized once against the engine, then executed for any
//! number of documents. Initialization may only capture engine-level data
//! (registry, options, pass lists); documents never leave state behind.

use crate::document::DocumentStore;
use crate::engine::EngineContext;
use crate::error::{CompileError, Result};
use crate::options::CompilerOptions;
use crate::registry::ComponentRegistry;
use std::sync::{Arc, OnceLock};
use stencil_core::ir::DocumentIr;
use stencil_core::syntax::SyntaxTree;
use tokio_util::sync::CancellationToken;

/// Common surface of phases and passes
pub trait Feature: Send + Sync {
    fn name(&self) -> &str;

    /// Lower runs first; ties keep registration order
    fn order(&self) -> i32;

    /// Bind to the engine; a second call fails with `AlreadyInitialized`
    fn initialize(&self, engine: &EngineContext) -> Result<()>;
}

/// A pipeline stage that reads and writes document store slots
pub trait Phase: Feature {
    fn execute(&self, store: &mut DocumentStore, cancel: &CancellationToken) -> Result<()>;
}

/// A transformation of the syntax tree, hosted by the syntax tree phase
pub trait SyntaxTreePass: Feature {
    fn execute(
        &self,
        store: &DocumentStore,
        tree: SyntaxTree,
        cancel: &CancellationToken,
    ) -> Result<SyntaxTree>;
}

/// A transformation of the IR tree, hosted by the optimization phase
pub trait IrPass: Feature {
    fn execute(
        &self,
        store: &DocumentStore,
        ir: DocumentIr,
        cancel: &CancellationToken,
    ) -> Result<DocumentIr>;
}

/// Engine data a feature keeps after initialization
#[derive(Debug, Clone)]
pub struct BoundEngine {
    pub registry: Arc<ComponentRegistry>,
    pub options: Arc<CompilerOptions>,
}

/// One-shot binding of a feature to its engine
#[derive(Debug, Default)]
pub struct FeatureBinding {
    engine: OnceLock<BoundEngine>,
}

impl FeatureBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the engine; fails if already bound
    pub fn bind(&self, feature: &str, engine: &EngineContext) -> Result<&BoundEngine> {
        let bound = BoundEngine {
            registry: Arc::clone(engine.registry_handle()),
            options: Arc::clone(engine.options_handle()),
        };
        self.engine
            .set(bound)
            .map_err(|_| CompileError::AlreadyInitialized(feature.to_string()))?;
        self.get(feature)
    }

    /// The bound engine; fails if the feature was never initialized
    pub fn get(&self, feature: &str) -> Result<&BoundEngine> {
        self.engine
            .get()
            .ok_or_else(|| CompileError::NotInitialized(feature.to_string()))
    }

    pub fn is_bound(&self) -> bool {
        self.engine.get().is_some()
    }
}

/// Fail with `Cancelled` once the token has fired
pub fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CompileError::Cancelled);
    }
    Ok(())
}

/// Stable sort by order; equal orders keep registration order
pub(crate) fn sort_features<F: Feature + ?Sized>(features: &mut [Arc<F>]) {
    features.sort_by_key(|feature| feature.order());
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, i32);

    impl Feature for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn order(&self) -> i32 {
            self.1
        }

        fn initialize(&self, _engine: &EngineContext) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sort_is_stable() {
        let mut features: Vec<Arc<Named>> = vec![
            Arc::new(Named("b", 10)),
            Arc::new(Named("a", 5)),
            Arc::new(Named("c", 10)),
            Arc::new(Named("d", 5)),
        ];
        sort_features(&mut features);
        let names: Vec<&str> = features.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_binding_is_one_shot() {
        let engine = EngineContext::new(Arc::new(ComponentRegistry::new()), CompilerOptions::default());
        let binding = FeatureBinding::new();
        assert!(matches!(binding.get("x"), Err(CompileError::NotInitialized(_))));

        binding.bind("x", &engine).unwrap();
        assert!(binding.is_bound());
        assert!(matches!(
            binding.bind("x", &engine),
            Err(CompileError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_check_cancelled() {
        let cancel = CancellationToken::new();
        assert!(check_cancelled(&cancel).is_ok());
        cancel.cancel();
        assert!(matches!(check_cancelled(&cancel), Err(CompileError::Cancelled)));
    }
}
