//! IR lowering phase
//!
//! Turns the syntax tree and the binding results into the IR tree. Bound
//! elements become component elements whose attributes are split into bound
//! properties and plain HTML attributes; every other node maps one to one.
//! Node diagnostics travel with their nodes; tree-level, import and discovery
//! diagnostics land on the IR root.

use crate::document::{BoundComponents, BoundElement, DocumentStore};
use crate::engine::{check_cancelled, EngineContext, Feature, FeatureBinding, Phase};
use crate::error::Result;
use stencil_core::ir::{ComponentBinding, DocumentIr, IrNode, IrNodeKind};
use stencil_core::syntax::{AttributeSyntax, ElementSyntax, SyntaxKind, SyntaxNode, SyntaxTree};
use stencil_parser::directive_parser::USING;
use stencil_parser::DirectiveParser;
use tokio_util::sync::CancellationToken;

const NAME: &str = "ir_lowering";

pub struct IrLoweringPhase {
    binding: FeatureBinding,
}

impl IrLoweringPhase {
    pub fn new() -> Self {
        Self {
            binding: FeatureBinding::new(),
        }
    }
}

impl Default for IrLoweringPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for IrLoweringPhase {
    fn name(&self) -> &str {
        NAME
    }

    fn order(&self) -> i32 {
        super::IR_LOWERING_ORDER
    }

    fn initialize(&self, engine: &EngineContext) -> Result<()> {
        self.binding.bind(NAME, engine)?;
        Ok(())
    }
}

impl Phase for IrLoweringPhase {
    fn execute(&self, store: &mut DocumentStore, cancel: &CancellationToken) -> Result<()> {
        let bound = self.binding.get(NAME)?;
        let tree = store.require::<SyntaxTree>(NAME)?;
        let components = store.require::<BoundComponents>(NAME)?;

        let mut ir = DocumentIr::new(tree.file_path.clone());
        for diagnostic in bound.registry.discovery_diagnostics() {
            ir.add_diagnostic(diagnostic.clone());
        }
        for diagnostic in &components.diagnostics {
            ir.add_diagnostic(diagnostic.clone());
        }
        for diagnostic in &tree.diagnostics {
            ir.add_diagnostic(diagnostic.clone());
        }

        let lowerer = Lowerer { components, cancel };
        ir.children = lowerer.lower_all(&tree.root)?;

        store.set(ir)
    }
}

struct Lowerer<'a> {
    components: &'a BoundComponents,
    cancel: &'a CancellationToken,
}

impl Lowerer<'_> {
    fn lower_all(&self, nodes: &[SyntaxNode]) -> Result<Vec<IrNode>> {
        nodes.iter().map(|node| self.lower(node)).collect()
    }

    fn lower(&self, node: &SyntaxNode) -> Result<IrNode> {
        check_cancelled(self.cancel)?;

        let mut lowered = match &node.kind {
            SyntaxKind::Text { content } => IrNode::html(content.clone()),
            SyntaxKind::Comment { content } => IrNode::html(format!("<!--{}-->", content)),
            SyntaxKind::Expression { code, .. } => IrNode::new(IrNodeKind::Expression { code: code.clone() }),
            SyntaxKind::CodeBlock { code } => IrNode::new(IrNodeKind::CodeBlock { code: code.clone() }),
            SyntaxKind::Directive { name, argument } => lower_directive(name, argument),
            SyntaxKind::Element(element) => match self.components.get(node.id) {
                Some(bound) => lower_component(element, bound),
                None => lower_markup(element),
            },
        };

        lowered.span = Some(node.span);
        lowered.diagnostics = node.diagnostics.clone();
        lowered.children.extend(self.lower_all(&node.children)?);
        Ok(lowered)
    }
}

fn lower_directive(name: &str, argument: &str) -> IrNode {
    if name == USING {
        if let Ok(namespace) = DirectiveParser::parse_using(argument) {
            return IrNode::new(IrNodeKind::Using { namespace });
        }
    }
    IrNode::new(IrNodeKind::Directive {
        name: name.to_string(),
        argument: argument.trim().to_string(),
    })
}

fn lower_markup(element: &ElementSyntax) -> IrNode {
    let mut node = IrNode::new(IrNodeKind::MarkupElement {
        tag_name: element.tag_name.clone(),
    });
    node.children = element.attributes.iter().map(html_attribute).collect();
    node
}

fn lower_component(element: &ElementSyntax, bound: &BoundElement) -> IrNode {
    let bindings = bound
        .matches
        .iter()
        .map(|m| ComponentBinding {
            descriptor: m.descriptor.checksum(),
            name: m.descriptor.name().to_string(),
            kind: m.descriptor.kind().tag(),
            matched_rules: m.matched_rules.clone(),
        })
        .collect();

    let mut node = IrNode::new(IrNodeKind::ComponentElement {
        tag_name: bound.tag_name.clone(),
        bindings,
    });

    // The first component in registration order that consumes an attribute owns it
    node.children = element
        .attributes
        .iter()
        .map(|attribute| {
            bound
                .matches
                .iter()
                .find_map(|m| {
                    m.descriptor
                        .bound_attribute_for(&attribute.name)
                        .map(|property| (m.descriptor.checksum(), property))
                })
                .map(|(descriptor, property)| {
                    IrNode::new(IrNodeKind::BoundAttribute {
                        name: attribute.name.clone(),
                        property_name: property.property_name.clone(),
                        type_name: property.type_name.clone(),
                        descriptor,
                        value: attribute.value.clone(),
                    })
                    .with_span(attribute.span)
                })
                .unwrap_or_else(|| html_attribute(attribute))
        })
        .collect();
    node
}

fn html_attribute(attribute: &AttributeSyntax) -> IrNode {
    IrNode::new(IrNodeKind::HtmlAttribute {
        name: attribute.name.clone(),
        value: attribute.value.clone(),
    })
    .with_span(attribute.span)
}
