//! IR nodes

use crate::checksum::Checksum;
use crate::descriptor::KindTag;
use crate::diagnostic::{sort_in_document_order, Diagnostic, SourceSpan};
use crate::syntax::AttributeValue;
use serde::{Deserialize, Serialize};

/// A component bound to an element, with the rules that matched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentBinding {
    pub descriptor: Checksum,
    pub name: String,
    pub kind: KindTag,
    /// Indices into the descriptor's binding rules
    pub matched_rules: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrNodeKind {
    Html {
        content: String,
    },
    Expression {
        code: String,
    },
    CodeBlock {
        code: String,
    },
    Using {
        namespace: String,
    },
    Directive {
        name: String,
        argument: String,
    },
    MarkupElement {
        tag_name: String,
    },
    HtmlAttribute {
        name: String,
        value: AttributeValue,
    },
    ComponentElement {
        tag_name: String,
        bindings: Vec<ComponentBinding>,
    },
    BoundAttribute {
        name: String,
        property_name: String,
        type_name: String,
        descriptor: Checksum,
        value: AttributeValue,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrNode {
    pub kind: IrNodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<IrNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl IrNode {
    pub fn new(kind: IrNodeKind) -> Self {
        Self {
            kind,
            span: None,
            children: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self::new(IrNodeKind::Html {
            content: content.into(),
        })
    }

    /// Attach a diagnostic; spanless diagnostics take this node's span
    pub fn add_diagnostic(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.span.is_none() {
            diagnostic.span = self.span;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn is_element(&self) -> bool {
        matches!(
            self.kind,
            IrNodeKind::MarkupElement { .. } | IrNodeKind::ComponentElement { .. }
        )
    }

    /// Component bindings of a component element, empty otherwise
    pub fn bindings(&self) -> &[ComponentBinding] {
        match &self.kind {
            IrNodeKind::ComponentElement { bindings, .. } => bindings,
            _ => &[],
        }
    }

    fn collect_diagnostics(&self, out: &mut Vec<Diagnostic>) {
        out.extend(self.diagnostics.iter().cloned());
        for child in &self.children {
            child.collect_diagnostics(out);
        }
    }

    fn try_visit_mut<E>(&mut self, f: &mut dyn FnMut(&mut IrNode) -> Result<(), E>) -> Result<(), E> {
        f(self)?;
        for child in &mut self.children {
            child.try_visit_mut(f)?;
        }
        Ok(())
    }
}

/// Root of the IR tree for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIr {
    pub file_path: String,
    /// Namespaces imported by the document, filled by usings hoisting
    #[serde(default)]
    pub usings: Vec<String>,
    pub children: Vec<IrNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentIr {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            usings: Vec::new(),
            children: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Visit every node in pre-order, stopping at the first error
    pub fn try_for_each_mut<E>(
        &mut self,
        mut f: impl FnMut(&mut IrNode) -> Result<(), E>,
    ) -> Result<(), E> {
        for node in &mut self.children {
            node.try_visit_mut(&mut f)?;
        }
        Ok(())
    }

    /// Every diagnostic in the tree, in document order
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.diagnostics.clone();
        for node in &self.children {
            node.collect_diagnostics(&mut all);
        }
        sort_in_document_order(&mut all);
        all
    }

    pub fn has_errors(&self) -> bool {
        self.all_diagnostics().iter().any(Diagnostic::is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_bubble_up_in_order() {
        let mut ir = DocumentIr::new("Index.stencil");
        let mut element = IrNode::new(IrNodeKind::MarkupElement {
            tag_name: "div".to_string(),
        })
        .with_span(SourceSpan::new(10, 5, 1, 11));
        let mut child = IrNode::html("text").with_span(SourceSpan::new(2, 4, 1, 3));
        child.add_diagnostic(Diagnostic::warning("W1", "child"));
        element.add_diagnostic(Diagnostic::error("E1", "element"));
        element.children.push(child);
        ir.children.push(element);
        ir.add_diagnostic(Diagnostic::info("I1", "root"));

        let codes: Vec<String> = ir.all_diagnostics().into_iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["I1", "W1", "E1"]);
        assert!(ir.has_errors());
    }

    #[test]
    fn test_try_for_each_mut_stops_on_error() {
        let mut ir = DocumentIr::new("Index.stencil");
        ir.children.push(IrNode::html("a"));
        ir.children.push(IrNode::html("b"));

        let mut visited = 0;
        let result: Result<(), &str> = ir.try_for_each_mut(|_| {
            visited += 1;
            Err("stop")
        });
        assert!(result.is_err());
        assert_eq!(visited, 1);
    }
}
