//! Syntax tree definitions
//!
//! The syntax tree is a lossless-enough view of a markup document: elements,
//! attributes, text, comments, embedded code and directives. Every node gets a
//! [`NodeId`] in pre-order so later stages can key side tables by node.

use crate::diagnostic::{sort_in_document_order, Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};

/// Pre-order index of a node within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Attribute value as written in markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// `<input disabled>`
    Minimized,
    /// `<input type="text">`
    Literal(String),
    /// `<input value="@model.Name">`
    Code(String),
}

impl AttributeValue {
    /// Text compared by value matching; code values compare as their source
    pub fn as_match_text(&self) -> &str {
        match self {
            AttributeValue::Minimized => "",
            AttributeValue::Literal(text) | AttributeValue::Code(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSyntax {
    pub name: String,
    pub value: AttributeValue,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSyntax {
    /// Tag name without the `!` opt-out marker
    pub tag_name: String,
    pub attributes: Vec<AttributeSyntax>,
    pub self_closing: bool,
    pub has_end_tag: bool,
    /// `<!tag>` excludes the element from component binding
    pub opt_out: bool,
}

impl ElementSyntax {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSyntax> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntaxKind {
    Text { content: String },
    Comment { content: String },
    Element(ElementSyntax),
    /// `@name.path` or `@(expr)`
    Expression { code: String, explicit: bool },
    /// `@{ ... }`
    CodeBlock { code: String },
    /// `@name argument` on its own line
    Directive { name: String, argument: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub id: NodeId,
    pub kind: SyntaxKind,
    pub span: SourceSpan,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl SyntaxNode {
    pub fn new(id: NodeId, kind: SyntaxKind, span: SourceSpan) -> Self {
        Self {
            id,
            kind,
            span,
            children: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Attach a diagnostic; spanless diagnostics take this node's span
    pub fn add_diagnostic(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.span.is_none() {
            diagnostic.span = Some(self.span);
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn as_element(&self) -> Option<&ElementSyntax> {
        match &self.kind {
            SyntaxKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Visit this node and its descendants in pre-order with their parent
    pub fn walk<'a>(
        &'a self,
        parent: Option<&'a SyntaxNode>,
        f: &mut dyn FnMut(&'a SyntaxNode, Option<&'a SyntaxNode>),
    ) {
        f(self, parent);
        for child in &self.children {
            child.walk(Some(self), f);
        }
    }

    fn walk_mut(&mut self, f: &mut dyn FnMut(&mut SyntaxNode)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }
}

/// Parsed form of one source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub file_path: String,
    pub root: Vec<SyntaxNode>,
    /// Diagnostics not tied to a single node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    /// Number of ids handed out; ids are `0..node_count`
    pub node_count: u32,
}

impl SyntaxTree {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            root: Vec::new(),
            diagnostics: Vec::new(),
            node_count: 0,
        }
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Visit every node in pre-order with its parent
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a SyntaxNode, Option<&'a SyntaxNode>)) {
        for node in &self.root {
            node.walk(None, f);
        }
    }

    /// Visit every node mutably in pre-order
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut SyntaxNode)) {
        for node in &mut self.root {
            node.walk_mut(f);
        }
    }

    /// Find a node by id
    pub fn find(&self, id: NodeId) -> Option<&SyntaxNode> {
        let mut found = None;
        self.walk(&mut |node, _| {
            if node.id == id {
                found = Some(node);
            }
        });
        found
    }

    /// Attach a diagnostic to the node with this id, or to the tree if absent
    pub fn add_node_diagnostic(&mut self, id: NodeId, diagnostic: Diagnostic) {
        let mut pending = Some(diagnostic);
        self.walk_mut(&mut |node| {
            if node.id == id {
                if let Some(diagnostic) = pending.take() {
                    node.add_diagnostic(diagnostic);
                }
            }
        });
        if let Some(diagnostic) = pending {
            self.diagnostics.push(diagnostic);
        }
    }

    /// All directives in document order as `(node, name, argument)`
    pub fn directives(&self) -> Vec<(&SyntaxNode, &str, &str)> {
        let mut directives = Vec::new();
        self.walk(&mut |node, _| {
            if let SyntaxKind::Directive { name, argument } = &node.kind {
                directives.push((node, name.as_str(), argument.as_str()));
            }
        });
        directives
    }

    /// Every diagnostic in the tree, in document order
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.clone();
        self.walk(&mut |node, _| all.extend(node.diagnostics.iter().cloned()));
        sort_in_document_order(&mut all);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize) -> SourceSpan {
        SourceSpan::new(start, 1, 1, start + 1)
    }

    fn sample_tree() -> SyntaxTree {
        let mut tree = SyntaxTree::new("Index.stencil");
        let mut div = SyntaxNode::new(
            NodeId(0),
            SyntaxKind::Element(ElementSyntax {
                tag_name: "div".to_string(),
                attributes: Vec::new(),
                self_closing: false,
                has_end_tag: true,
                opt_out: false,
            }),
            span(0),
        );
        div.children.push(SyntaxNode::new(
            NodeId(1),
            SyntaxKind::Text {
                content: "hi".to_string(),
            },
            span(5),
        ));
        tree.root.push(div);
        tree.root.push(SyntaxNode::new(
            NodeId(2),
            SyntaxKind::Directive {
                name: "using".to_string(),
                argument: "System".to_string(),
            },
            span(20),
        ));
        tree.node_count = 3;
        tree
    }

    #[test]
    fn test_walk_reports_parent() {
        let tree = sample_tree();
        let mut seen = Vec::new();
        tree.walk(&mut |node, parent| seen.push((node.id.0, parent.map(|p| p.id.0))));
        assert_eq!(seen, vec![(0, None), (1, Some(0)), (2, None)]);
    }

    #[test]
    fn test_node_diagnostics_collected_in_document_order() {
        let mut tree = sample_tree();
        tree.add_node_diagnostic(NodeId(2), Diagnostic::warning("W2", "late"));
        tree.add_node_diagnostic(NodeId(1), Diagnostic::warning("W1", "early"));
        tree.add_node_diagnostic(NodeId(99), Diagnostic::error("E0", "orphan"));

        let codes: Vec<String> = tree.all_diagnostics().into_iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["E0", "W1", "W2"]);
        assert_eq!(tree.find(NodeId(1)).unwrap().diagnostics[0].span, Some(span(5)));
    }

    #[test]
    fn test_directives_listed() {
        let tree = sample_tree();
        let directives = tree.directives();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].1, "using");
        assert_eq!(directives[0].2, "System");
    }
}
