//! Unit tests for the markup parser

use stencil_core::source::SourceDocument;
use stencil_core::syntax::{AttributeValue, SyntaxKind, SyntaxNode, SyntaxTree};
use stencil_parser::MarkupParser;

fn parse(text: &str) -> SyntaxTree {
    MarkupParser::parse(&SourceDocument::new("Pages/Index.stencil", text))
}

fn elements(tree: &SyntaxTree) -> Vec<&SyntaxNode> {
    let mut found = Vec::new();
    tree.walk(&mut |node, _| {
        if node.as_element().is_some() {
            found.push(node);
        }
    });
    found
}

fn codes(tree: &SyntaxTree) -> Vec<String> {
    tree.all_diagnostics().into_iter().map(|d| d.code).collect()
}

// =============================================================================
// Elements and attributes
// =============================================================================

#[test]
fn test_parse_nested_elements() {
    let tree = parse("<form><label>Name</label><input type=\"text\" /></form>");
    assert!(tree.all_diagnostics().is_empty());
    assert_eq!(tree.root.len(), 1);

    let form = &tree.root[0];
    assert_eq!(form.as_element().unwrap().tag_name, "form");
    assert!(form.as_element().unwrap().has_end_tag);
    assert_eq!(form.children.len(), 2);

    let input = form.children[1].as_element().unwrap();
    assert_eq!(input.tag_name, "input");
    assert!(input.self_closing);
    assert_eq!(input.attributes[0].name, "type");
    assert_eq!(input.attributes[0].value, AttributeValue::Literal("text".to_string()));
}

#[test]
fn test_parse_attribute_forms() {
    let tree = parse(
        "<input disabled value='x' size=10 checked = \"checked\" asp-for=\"@model.Name\">",
    );
    let input = tree.root[0].as_element().unwrap();
    let values: Vec<(&str, &AttributeValue)> = input
        .attributes
        .iter()
        .map(|a| (a.name.as_str(), &a.value))
        .collect();

    assert_eq!(
        values,
        vec![
            ("disabled", &AttributeValue::Minimized),
            ("value", &AttributeValue::Literal("x".to_string())),
            ("size", &AttributeValue::Literal("10".to_string())),
            ("checked", &AttributeValue::Literal("checked".to_string())),
            ("asp-for", &AttributeValue::Code("model.Name".to_string())),
        ]
    );
}

#[test]
fn test_void_element_has_no_children() {
    let tree = parse("<p><br>line</p>");
    let p = &tree.root[0];
    assert_eq!(p.children.len(), 2);
    assert!(p.children[0].children.is_empty());
    assert!(tree.all_diagnostics().is_empty());
}

#[test]
fn test_opt_out_element() {
    let tree = parse("<!button class=\"x\">Click</!button>");
    let button = tree.root[0].as_element().unwrap();
    assert_eq!(button.tag_name, "button");
    assert!(button.opt_out);
    assert!(button.has_end_tag);
}

#[test]
fn test_doctype_is_text() {
    let tree = parse("<!DOCTYPE html><html></html>");
    assert!(matches!(
        &tree.root[0].kind,
        SyntaxKind::Text { content } if content == "<!DOCTYPE html>"
    ));
    assert_eq!(elements(&tree).len(), 1);
}

// =============================================================================
// Embedded code and directives
// =============================================================================

#[test]
fn test_parse_expressions() {
    let tree = parse("<p>Hi @user.Name! You have @(count + 1) items and @items[0].Title(x)</p>");
    let codes: Vec<(String, bool)> = tree.root[0]
        .children
        .iter()
        .filter_map(|child| match &child.kind {
            SyntaxKind::Expression { code, explicit } => Some((code.clone(), *explicit)),
            _ => None,
        })
        .collect();

    assert_eq!(
        codes,
        vec![
            ("user.Name".to_string(), false),
            ("count + 1".to_string(), true),
            ("items[0].Title(x)".to_string(), false),
        ]
    );
}

#[test]
fn test_trailing_period_is_not_part_of_expression() {
    let tree = parse("Bye @user.");
    let last = tree.root.last().unwrap();
    assert!(matches!(&last.kind, SyntaxKind::Text { content } if content == "."));
}

#[test]
fn test_parse_code_block_with_braces_in_strings() {
    let tree = parse("@{ var s = \"}\"; if (x) { y(); } }<p></p>");
    match &tree.root[0].kind {
        SyntaxKind::CodeBlock { code } => assert_eq!(code, "var s = \"}\"; if (x) { y(); }"),
        other => panic!("expected code block, got {:?}", other),
    }
    assert_eq!(elements(&tree).len(), 1);
}

#[test]
fn test_parse_directives() {
    let tree = parse("@using Web.Components\n@addTagHelper *, Web.TagHelpers\n<p>@using</p>");
    let directives = tree.directives();
    assert_eq!(directives.len(), 2);
    assert_eq!(directives[0].1, "using");
    assert_eq!(directives[0].2, "Web.Components");
    assert_eq!(directives[1].1, "addTagHelper");
    assert_eq!(directives[1].2, "*, Web.TagHelpers");
}

#[test]
fn test_escaped_transition() {
    let tree = parse("<p>@@handle</p>");
    assert!(matches!(
        &tree.root[0].children[0].kind,
        SyntaxKind::Text { content } if content == "@handle"
    ));
}

// =============================================================================
// Recovery
// =============================================================================

#[test]
fn test_unclosed_element_reported_on_node() {
    let tree = parse("<div><span>text</div>");
    assert_eq!(codes(&tree), vec!["STN1001"]);

    let div = &tree.root[0];
    assert!(div.as_element().unwrap().has_end_tag);
    let span = &div.children[0];
    assert!(!span.as_element().unwrap().has_end_tag);
    assert_eq!(span.diagnostics.len(), 1);
}

#[test]
fn test_unmatched_end_tag_reported_on_tree() {
    let tree = parse("<p>a</p></section>");
    assert_eq!(codes(&tree), vec!["STN1002"]);
    assert_eq!(tree.diagnostics.len(), 1);
}

#[test]
fn test_unterminated_constructs() {
    assert_eq!(codes(&parse("<!-- open")), vec!["STN1004"]);
    assert_eq!(codes(&parse("@{ open")), vec!["STN1005"]);
    assert_eq!(codes(&parse("<input type=\"x")), vec!["STN1003", "STN1008"]);
    assert_eq!(codes(&parse("a @ b")), vec!["STN1006"]);
}

#[test]
fn test_missing_end_tag_at_eof() {
    let tree = parse("<main><p>text");
    assert_eq!(codes(&tree), vec!["STN1001", "STN1001"]);
    assert_eq!(tree.root.len(), 1);
    assert_eq!(tree.root[0].children.len(), 1);
}

#[test]
fn test_parse_is_deterministic() {
    let text = "@using A\n<div class=\"x\"><p>@name</p><br><!-- c --></div>";
    assert_eq!(parse(text), parse(text));
}
