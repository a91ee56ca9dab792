//! Parsing phase
//!
//! Parses the document and its existing imports. Import trees are cached
//! across documents, one entry per import path. An entry is replaced when the
//! checksum of the import's text changes, so the cache never outgrows the set
//! of import files.

use crate::document::{DocumentStore, ImportSources, ImportSyntaxTrees};
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, Phase};
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;
use stencil_core::checksum::Checksum;
use stencil_core::source::SourceDocument;
use stencil_core::syntax::SyntaxTree;
use stencil_parser::MarkupParser;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const NAME: &str = "parsing";

struct CachedImport {
    checksum: Checksum,
    tree: Arc<SyntaxTree>,
}

pub struct ParsingPhase {
    binding: FeatureBinding,
    import_cache: DashMap<String, CachedImport>,
}

impl ParsingPhase {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
            import_cache: DashMap::new(),
        }
    }

    /// Number of import trees held in the cache
    pub fn cached_imports(&self) -> usize {
        self.import_cache.len()
    }

    fn parse_import(&self, source: &SourceDocument) -> Arc<SyntaxTree> {
        let checksum = source.checksum();
        if let Some(cached) = self.import_cache.get(&source.file_path) {
            if cached.checksum == checksum {
                return Arc::clone(&cached.tree);
            }
        }

        let tree = Arc::new(MarkupParser::parse(source));
        debug!("Parsed import '{}'", source.file_path);
        self.import_cache.insert(
            source.file_path.clone(),
            CachedImport {
                checksum,
                tree: Arc::clone(&tree),
            },
        );
        tree
    }
}

impl Default for ParsingPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for ParsingPhase {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        super::PARSING_ORDER
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        self.binding.bind(NAME, engine)?;
        Ok(())
    }
}

impl Phase for ParsingPhase {
    fn execute(&self, store: &mut DocumentStore, cancel: &CancellationToken) -> Result<()> {
        self.binding.get(NAME)?;
        let source = store.require::<SourceDocument>(NAME)?;
        let tree = MarkupParser::parse(source);

        let mut import_trees = Vec::new();
        for import in &store.require::<ImportSources>(NAME)?.0 {
            check_cancelled(cancel)?;
            if let Some(source) = import.source() {
                import_trees.push(self.parse_import(source));
            }
        }
        check_cancelled(cancel)?;

        store.set(tree)?;
        store.set(ImportSyntaxTrees(import_trees))?;
        Ok(())
    }
}
