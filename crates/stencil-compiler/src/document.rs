//! Document store
//!
//! One store per compiled document. It is a slot table indexed by
//! [`ArtifactKind`]; each slot holds one artifact value and is replaced whole.
//! An artifact declares the kinds it is derived from, and the store refuses to
//! hold it until those slots are filled.

use crate::error::{CompileError, Result};
use crate::registry::ComponentMatch;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use stencil_core::diagnostic::Diagnostic;
use stencil_core::ir::DocumentIr;
use stencil_core::source::{ImportItem, SourceDocument};
use stencil_core::syntax::{NodeId, SyntaxTree};

/// Slot identifier in a [`DocumentStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Source,
    Imports,
    SyntaxTree,
    ImportSyntaxTrees,
    BoundComponents,
    IrTree,
}

impl ArtifactKind {
    pub const COUNT: usize = 6;

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A value that lives in one store slot
pub trait Artifact: Any + Send + Sync {
    const KIND: ArtifactKind;

    /// Slots that must be filled before this artifact can be stored
    const DEPENDENCIES: &'static [ArtifactKind] = &[];
}

impl Artifact for SourceDocument {
    const KIND: ArtifactKind = ArtifactKind::Source;
}

impl Artifact for SyntaxTree {
    const KIND: ArtifactKind = ArtifactKind::SyntaxTree;
    const DEPENDENCIES: &'static [ArtifactKind] = &[ArtifactKind::Source];
}

impl Artifact for DocumentIr {
    const KIND: ArtifactKind = ArtifactKind::IrTree;
    const DEPENDENCIES: &'static [ArtifactKind] =
        &[ArtifactKind::SyntaxTree, ArtifactKind::BoundComponents];
}

/// Imports of the document, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSources(pub Vec<ImportItem>);

impl Artifact for ImportSources {
    const KIND: ArtifactKind = ArtifactKind::Imports;
}

/// Parsed existing imports, in import order
///
/// Trees are shared with the import cache of the parsing phase.
#[derive(Debug, Clone, Default)]
pub struct ImportSyntaxTrees(pub Vec<Arc<SyntaxTree>>);

impl Artifact for ImportSyntaxTrees {
    const KIND: ArtifactKind = ArtifactKind::ImportSyntaxTrees;
    const DEPENDENCIES: &'static [ArtifactKind] = &[ArtifactKind::Imports];
}

/// Components bound to one element
#[derive(Debug, Clone)]
pub struct BoundElement {
    /// Tag name with the document's tag prefix removed
    pub tag_name: String,
    /// Matches in registration order
    pub matches: Vec<ComponentMatch>,
}

/// Result of the binding phase, keyed by element node id
#[derive(Debug, Clone, Default)]
pub struct BoundComponents {
    pub elements: BTreeMap<NodeId, BoundElement>,
    /// Tag prefix in effect for the document
    pub tag_prefix: Option<String>,
    /// Problems found in import directives
    pub diagnostics: Vec<Diagnostic>,
}

impl BoundComponents {
    pub fn get(&self, id: NodeId) -> Option<&BoundElement> {
        self.elements.get(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Artifact for BoundComponents {
    const KIND: ArtifactKind = ArtifactKind::BoundComponents;
    const DEPENDENCIES: &'static [ArtifactKind] = &[ArtifactKind::SyntaxTree];
}

/// Per-document artifact cache
pub struct DocumentStore {
    slots: [Option<Box<dyn Any + Send + Sync>>; ArtifactKind::COUNT],
}

impl DocumentStore {
    /// Create a store holding the source document and no imports
    pub fn new(source: SourceDocument) -> Self {
        let mut store = Self {
            slots: Default::default(),
        };
        store.put(source);
        store.put(ImportSources::default());
        store
    }

    /// Create a store with the given imports
    pub fn with_imports(source: SourceDocument, imports: Vec<ImportItem>) -> Self {
        let mut store = Self::new(source);
        store.put(ImportSources(imports));
        store
    }

    /// Store an artifact, replacing any previous value in its slot
    pub fn set<A: Artifact>(&mut self, artifact: A) -> Result<()> {
        if let Some(missing) = A::DEPENDENCIES.iter().find(|kind| !self.contains(**kind)) {
            return Err(CompileError::MissingDependency {
                required: *missing,
                requested_by: format!("{} slot", A::KIND),
            });
        }
        self.put(artifact);
        Ok(())
    }

    /// Read an artifact if its slot is filled
    pub fn get<A: Artifact>(&self) -> Option<&A> {
        self.slots[A::KIND.index()]
            .as_ref()
            .and_then(|slot| slot.downcast_ref::<A>())
    }

    /// Read an artifact that must be present
    pub fn require<A: Artifact>(&self, requested_by: &str) -> Result<&A> {
        self.get::<A>().ok_or_else(|| CompileError::MissingDependency {
            required: A::KIND,
            requested_by: requested_by.to_string(),
        })
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Remove an artifact from its slot
    pub fn take<A: Artifact>(&mut self) -> Option<A> {
        let slot = self.slots[A::KIND.index()].take()?;
        slot.downcast::<A>().ok().map(|artifact| *artifact)
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        self.get::<SourceDocument>()
    }

    fn put<A: Artifact>(&mut self, artifact: A) {
        self.slots[A::KIND.index()] = Some(Box::new(artifact));
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled: Vec<usize> = (0..ArtifactKind::COUNT)
            .filter(|index| self.slots[*index].is_some())
            .collect();
        f.debug_struct("DocumentStore")
            .field("filled_slots", &filled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DocumentStore {
        DocumentStore::new(SourceDocument::new("Index.stencil", "<p></p>"))
    }

    #[test]
    fn test_new_store_has_source_and_imports() {
        let store = store();
        assert!(store.contains(ArtifactKind::Source));
        assert!(store.contains(ArtifactKind::Imports));
        assert!(!store.contains(ArtifactKind::SyntaxTree));
        assert_eq!(store.source().unwrap().file_path, "Index.stencil");
    }

    #[test]
    fn test_require_missing_slot_fails() {
        let store = store();
        let err = store.require::<SyntaxTree>("test").unwrap_err();
        assert!(matches!(
            err,
            CompileError::MissingDependency {
                required: ArtifactKind::SyntaxTree,
                ..
            }
        ));
    }

    #[test]
    fn test_set_checks_dependencies() {
        let mut store = store();
        let err = store.set(DocumentIr::new("Index.stencil")).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MissingDependency {
                required: ArtifactKind::SyntaxTree,
                ..
            }
        ));
        assert!(!store.contains(ArtifactKind::IrTree));

        store.set(SyntaxTree::new("Index.stencil")).unwrap();
        store.set(BoundComponents::default()).unwrap();
        store.set(DocumentIr::new("Index.stencil")).unwrap();
        assert!(store.get::<DocumentIr>().is_some());
    }

    #[test]
    fn test_set_replaces_whole_slot() {
        let mut store = store();
        let mut first = SyntaxTree::new("a");
        first.node_count = 1;
        store.set(first).unwrap();
        store.set(SyntaxTree::new("b")).unwrap();

        let tree = store.get::<SyntaxTree>().unwrap();
        assert_eq!(tree.file_path, "b");
        assert_eq!(tree.node_count, 0);
    }

    #[test]
    fn test_take_empties_slot() {
        let mut store = store();
        store.set(SyntaxTree::new("a")).unwrap();
        assert!(store.take::<SyntaxTree>().is_some());
        assert!(store.get::<SyntaxTree>().is_none());
    }
}
