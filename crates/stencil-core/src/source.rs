//! Source documents and import items

use crate::checksum::{AppendToChecksum, Checksum, ChecksumBuilder};
use serde::{Deserialize, Serialize};

/// A source document: its path and full text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub file_path: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(file_path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            text: text.into(),
        }
    }

    /// Content identity of this document (path and text)
    pub fn checksum(&self) -> Checksum {
        Checksum::of(self)
    }
}

impl AppendToChecksum for SourceDocument {
    fn append_to_checksum(&self, builder: &mut ChecksumBuilder) {
        builder.append_str(&self.file_path).append_str(&self.text);
    }
}

/// An import contributing directives to a document
///
/// A missing import contributes nothing; an existing but empty import still
/// takes its place in import order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ImportItem {
    Existing(SourceDocument),
    Missing { file_path: String },
}

impl ImportItem {
    pub fn existing(file_path: impl Into<String>, text: impl Into<String>) -> Self {
        ImportItem::Existing(SourceDocument::new(file_path, text))
    }

    pub fn missing(file_path: impl Into<String>) -> Self {
        ImportItem::Missing {
            file_path: file_path.into(),
        }
    }

    pub fn file_path(&self) -> &str {
        match self {
            ImportItem::Existing(document) => &document.file_path,
            ImportItem::Missing { file_path } => file_path,
        }
    }

    pub fn source(&self) -> Option<&SourceDocument> {
        match self {
            ImportItem::Existing(document) => Some(document),
            ImportItem::Missing { .. } => None,
        }
    }
}
