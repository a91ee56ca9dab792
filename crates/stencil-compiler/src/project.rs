//! Project abstraction
//!
//! Resolves the imports of a document. Import documents are looked up in
//! every directory from the project root down to the document's own
//! directory, outermost first.

use std::collections::BTreeMap;
use stencil_core::source::{ImportItem, SourceDocument};

/// Supplies the imports of a document
pub trait ImportProvider {
    fn imports_for(&self, file_path: &str) -> Vec<ImportItem>;
}

/// Project held entirely in memory, keyed by `/`-separated relative paths
#[derive(Debug, Clone)]
pub struct InMemoryProject {
    import_file_name: String,
    documents: BTreeMap<String, String>,
}

impl InMemoryProject {
    pub fn new(import_file_name: impl Into<String>) -> Self {
        Self {
            import_file_name: import_file_name.into(),
            documents: BTreeMap::new(),
        }
    }

    pub fn with_document(mut self, file_path: impl Into<String>, text: impl Into<String>) -> Self {
        self.add_document(file_path, text);
        self
    }

    pub fn add_document(&mut self, file_path: impl Into<String>, text: impl Into<String>) {
        self.documents
            .insert(normalize(&file_path.into()), text.into());
    }

    pub fn document(&self, file_path: &str) -> Option<SourceDocument> {
        let file_path = normalize(file_path);
        self.documents
            .get(&file_path)
            .map(|text| SourceDocument::new(file_path.clone(), text.clone()))
    }

    /// Documents that are not import files, in path order
    pub fn documents(&self) -> impl Iterator<Item = SourceDocument> + '_ {
        self.documents
            .iter()
            .filter(|(path, _)| file_name(path) != self.import_file_name)
            .map(|(path, text)| SourceDocument::new(path.clone(), text.clone()))
    }
}

impl ImportProvider for InMemoryProject {
    fn imports_for(&self, file_path: &str) -> Vec<ImportItem> {
        let file_path = normalize(file_path);
        let mut directories: Vec<&str> = file_path.split('/').collect();
        directories.pop();

        let mut imports = Vec::with_capacity(directories.len() + 1);
        for depth in 0..=directories.len() {
            let mut import_path = directories[..depth].join("/");
            if !import_path.is_empty() {
                import_path.push('/');
            }
            import_path.push_str(&self.import_file_name);

            if import_path == file_path {
                continue;
            }
            imports.push(match self.documents.get(&import_path) {
                Some(text) => ImportItem::existing(import_path, text.clone()),
                None => ImportItem::missing(import_path),
            });
        }
        imports
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> InMemoryProject {
        InMemoryProject::new("_Imports.stencil")
            .with_document("_Imports.stencil", "@using Web")
            .with_document("Pages/Admin/_Imports.stencil", "@using Web.Admin")
            .with_document("Pages/Admin/Users.stencil", "<p></p>")
            .with_document("Index.stencil", "<p></p>")
    }

    #[test]
    fn test_imports_outermost_first() {
        let imports = project().imports_for("Pages/Admin/Users.stencil");
        let paths: Vec<&str> = imports.iter().map(ImportItem::file_path).collect();
        assert_eq!(
            paths,
            vec![
                "_Imports.stencil",
                "Pages/_Imports.stencil",
                "Pages/Admin/_Imports.stencil"
            ]
        );
        assert!(imports[0].source().is_some());
        assert!(imports[1].source().is_none());
        assert!(imports[2].source().is_some());
    }

    #[test]
    fn test_import_file_does_not_import_itself() {
        let imports = project().imports_for("_Imports.stencil");
        assert!(imports.is_empty());
    }

    #[test]
    fn test_documents_skip_import_files() {
        let paths: Vec<String> = project().documents().map(|d| d.file_path).collect();
        assert_eq!(paths, vec!["Index.stencil", "Pages/Admin/Users.stencil"]);
    }
}
