//! HTML merging
//!
//! Joins runs of adjacent HTML nodes into one node and drops empty ones, at
//! every level of the tree.

use crate::document::DocumentStore;
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, IrPass};
use crate::error::Result;
use stencil_core::diagnostic::SourceSpan;
use stencil_core::ir::{DocumentIr, IrNode, IrNodeKind};
use tokio_util::sync::CancellationToken;

const NAME: &str = "html_merge";

pub struct HtmlMergePass {
    binding: FeatureBinding,
}

impl HtmlMergePass {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
        }
    }
}

impl Default for HtmlMergePass {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for HtmlMergePass {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        1000
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        self.binding.bind(NAME, engine)?;
        Ok(())
    }
}

fn merge_spans(first: Option<SourceSpan>, second: Option<SourceSpan>) -> Option<SourceSpan> {
    let (first, second) = (first?, second?);
    Some(SourceSpan::new(
        first.start,
        second.end().saturating_sub(first.start),
        first.line,
        first.column,
    ))
}

fn merge(nodes: Vec<IrNode>, cancel: &CancellationToken) -> Result<Vec<IrNode>> {
    let mut merged: Vec<IrNode> = Vec::with_capacity(nodes.len());
    for mut node in nodes {
        check_cancelled(cancel)?;
        node.children = merge(std::mem::take(&mut node.children), cancel)?;

        let IrNodeKind::Html { content } = &node.kind else {
            merged.push(node);
            continue;
        };
        if content.is_empty() && node.diagnostics.is_empty() {
            continue;
        }
        if let Some(IrNode {
            kind: IrNodeKind::Html { content: previous },
            span,
            diagnostics,
            ..
        }) = merged.last_mut()
        {
            previous.push_str(content);
            *span = merge_spans(*span, node.span);
            diagnostics.extend(node.diagnostics);
            continue;
        }
        merged.push(node);
    }
    Ok(merged)
}

impl IrPass for HtmlMergePass {
    fn execute(
        &self,
        _store: &DocumentStore,
        mut ir: DocumentIr,
        cancel: &CancellationToken,
    ) -> Result<DocumentIr> {
        self.binding.get(NAME)?;
        ir.children = merge(std::mem::take(&mut ir.children), cancel)?;
        Ok(ir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_adjacent_and_drops_empty() {
        let nodes = vec![
            IrNode::html("a").with_span(SourceSpan::new(0, 1, 1, 1)),
            IrNode::html(""),
            IrNode::html("b").with_span(SourceSpan::new(1, 1, 1, 2)),
            IrNode::new(IrNodeKind::Expression {
                code: "x".to_string(),
            }),
            IrNode::html("c"),
        ];
        let merged = merge(nodes, &CancellationToken::new()).unwrap();

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].kind, IrNodeKind::Html { content: "ab".to_string() });
        assert_eq!(merged[0].span, Some(SourceSpan::new(0, 2, 1, 1)));
        assert_eq!(merged[2].kind, IrNodeKind::Html { content: "c".to_string() });
    }
}
