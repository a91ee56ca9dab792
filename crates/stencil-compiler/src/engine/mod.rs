//! Compilation engine
//!
//! The engine owns an ordered list of phases and the engine-wide data they
//! were initialized with. Processing a document runs every phase in order over
//! a caller-owned [`DocumentStore`]; the engine itself is never mutated after
//! [`EngineBuilder::build`], so one engine can serve many threads.

pub mod feature;

pub use feature::{check_cancelled, BoundEngine, Feature, FeatureBinding, IrPass, Phase, SyntaxTreePass};

use crate::discovery::DescriptorProvider;
use crate::document::DocumentStore;
use crate::error::Result;
use crate::options::CompilerOptions;
use crate::passes;
use crate::phases;
use crate::registry::ComponentRegistry;
use feature::sort_features;
use serde::Serialize;
use std::sync::Arc;
use stencil_core::descriptor::BuilderPool;
use stencil_core::diagnostic::Diagnostic;
use stencil_core::ir::DocumentIr;
use stencil_core::source::{ImportItem, SourceDocument};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What features see of the engine while initializing
#[derive(Clone)]
pub struct EngineContext {
    registry: Arc<ComponentRegistry>,
    options: Arc<CompilerOptions>,
    syntax_passes: Vec<Arc<dyn SyntaxTreePass>>,
    ir_passes: Vec<Arc<dyn IrPass>>,
}

impl EngineContext {
    /// Context with no passes
    pub fn new(registry: Arc<ComponentRegistry>, options: CompilerOptions) -> Self {
        Self {
            registry,
            options: Arc::new(options),
            syntax_passes: Vec::new(),
            ir_passes: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn registry_handle(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    pub fn options_handle(&self) -> &Arc<CompilerOptions> {
        &self.options
    }

    /// Syntax tree passes, sorted
    pub fn syntax_passes(&self) -> &[Arc<dyn SyntaxTreePass>] {
        &self.syntax_passes
    }

    /// IR passes, sorted
    pub fn ir_passes(&self) -> &[Arc<dyn IrPass>] {
        &self.ir_passes
    }
}

/// Final IR of one document plus every diagnostic in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationOutput {
    pub ir: DocumentIr,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// The compilation engine
pub struct Engine {
    phases: Vec<Arc<dyn Phase>>,
    context: EngineContext,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Run every phase over the store, in order
    pub fn process(&self, store: &mut DocumentStore, cancel: &CancellationToken) -> Result<()> {
        for phase in &self.phases {
            check_cancelled(cancel)?;
            debug!("Running phase '{}'", phase.name());
            phase.execute(store, cancel)?;
        }
        Ok(())
    }

    /// Compile one document
    pub fn compile(&self, source: SourceDocument, imports: Vec<ImportItem>) -> Result<CompilationOutput> {
        self.compile_with_cancellation(source, imports, &CancellationToken::new())
    }

    pub fn compile_with_cancellation(
        &self,
        source: SourceDocument,
        imports: Vec<ImportItem>,
        cancel: &CancellationToken,
    ) -> Result<CompilationOutput> {
        let mut store = DocumentStore::with_imports(source, imports);
        self.process(&mut store, cancel)?;
        let ir = store.require::<DocumentIr>("compile")?.clone();
        let diagnostics = ir.all_diagnostics();
        Ok(CompilationOutput { ir, diagnostics })
    }

    /// Phase names in execution order
    pub fn phase_names(&self) -> Vec<&str> {
        self.phases.iter().map(|phase| phase.name()).collect()
    }

    pub fn syntax_pass_names(&self) -> Vec<&str> {
        self.context.syntax_passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn ir_pass_names(&self) -> Vec<&str> {
        self.context.ir_passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        self.context.registry()
    }

    pub fn options(&self) -> &CompilerOptions {
        self.context.options()
    }
}

/// Collects features and engine data, then initializes everything once
pub struct EngineBuilder {
    phases: Vec<Arc<dyn Phase>>,
    syntax_passes: Vec<Arc<dyn SyntaxTreePass>>,
    ir_passes: Vec<Arc<dyn IrPass>>,
    registry: ComponentRegistry,
    providers: Vec<Box<dyn DescriptorProvider>>,
    options: CompilerOptions,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            syntax_passes: Vec::new(),
            ir_passes: Vec::new(),
            registry: ComponentRegistry::new(),
            providers: Vec::new(),
            options: CompilerOptions::default(),
        }
    }

    /// Register the built-in phases and passes
    pub fn with_default_features(self) -> Self {
        self.with_phase(phases::ParsingPhase::new())
            .with_phase(phases::SyntaxTreePhase::new())
            .with_phase(phases::BindingPhase::new())
            .with_phase(phases::IrLoweringPhase::new())
            .with_phase(phases::OptimizationPhase::new())
            .with_syntax_pass(passes::DirectiveValidationPass::new())
            .with_ir_pass(passes::UsingsHoistPass::new())
            .with_ir_pass(passes::ComponentConflictPass::new())
            .with_ir_pass(passes::UnresolvedComponentPass::new())
            .with_ir_pass(passes::HtmlMergePass::new())
    }

    pub fn with_phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Arc::new(phase));
        self
    }

    pub fn with_syntax_pass(mut self, pass: impl SyntaxTreePass + 'static) -> Self {
        self.syntax_passes.push(Arc::new(pass));
        self
    }

    pub fn with_ir_pass(mut self, pass: impl IrPass + 'static) -> Self {
        self.ir_passes.push(Arc::new(pass));
        self
    }

    /// Use a pre-populated registry
    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Discover descriptors from a provider at build time
    pub fn with_provider(mut self, provider: impl DescriptorProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Sort and initialize every feature
    pub fn build(self) -> Result<Engine> {
        let EngineBuilder {
            mut phases,
            mut syntax_passes,
            mut ir_passes,
            mut registry,
            providers,
            options,
        } = self;

        let pool = BuilderPool::new();
        for provider in &providers {
            registry.discover(provider.as_ref(), &pool);
        }

        sort_features(&mut phases);
        sort_features(&mut syntax_passes);
        sort_features(&mut ir_passes);

        let context = EngineContext {
            registry: Arc::new(registry),
            options: Arc::new(options),
            syntax_passes,
            ir_passes,
        };

        for pass in &context.syntax_passes {
            pass.initialize(&context)?;
        }
        for pass in &context.ir_passes {
            pass.initialize(&context)?;
        }
        for phase in &phases {
            phase.initialize(&context)?;
        }

        info!(
            "Engine built: {} phases, {} syntax passes, {} IR passes, {} descriptors",
            phases.len(),
            context.syntax_passes.len(),
            context.ir_passes.len(),
            context.registry.len()
        );

        Ok(Engine { phases, context })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
