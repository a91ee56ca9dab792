//! Markup parser
//!
//! Single pass, recovering parser for markup with embedded code:
//! ```text
//! @using Web.Components
//! @addTagHelper *, Web.TagHelpers
//! <form method="post">
//!   <input type="checkbox" asp-for="@model.Accepted" />
//!   <p>Hello @user.Name, you have @(count + 1) messages</p>
//!   @{ var total = 3; }
//!   <!button>plain</!button>
//! </form>
//! ```
//! Node ids are handed out in pre-order as nodes are opened.

use log::debug;
use stencil_core::diagnostic::{Diagnostic, SourceSpan};
use stencil_core::source::SourceDocument;
use stencil_core::syntax::{
    AttributeSyntax, AttributeValue, ElementSyntax, NodeId, SyntaxKind, SyntaxNode, SyntaxTree,
};

/// Elements that never have content or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// `@name` at the start of a line is a directive when `name` is listed here
pub const KNOWN_DIRECTIVES: &[&str] = &[
    "using",
    "addTagHelper",
    "removeTagHelper",
    "tagHelperPrefix",
    "inherits",
    "page",
];

/// Markup parser
pub struct MarkupParser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    next_id: u32,
    line_starts: Vec<usize>,
    stack: Vec<SyntaxNode>,
    root: Vec<SyntaxNode>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> MarkupParser<'a> {
    /// Parse a source document into a syntax tree
    pub fn parse(document: &SourceDocument) -> SyntaxTree {
        let mut parser = MarkupParser::new(&document.text);
        parser.run();
        parser.finish(&document.file_path)
    }

    fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            next_id: 0,
            line_starts,
            stack: Vec::new(),
            root: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn finish(mut self, file_path: &str) -> SyntaxTree {
        while let Some(mut open) = self.stack.pop() {
            debug!("closing unterminated element at end of input");
            let name = element_name(&open).to_string();
            open.add_diagnostic(Diagnostic::error(
                "STN1001",
                format!("Element '{}' is missing an end tag", name),
            ));
            self.push_node(open);
        }

        SyntaxTree {
            file_path: file_path.to_string(),
            root: self.root,
            diagnostics: self.diagnostics,
            node_count: self.next_id,
        }
    }

    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            if self.starts_with("<!--") {
                self.parse_comment();
            } else if self.at_end_tag() {
                self.parse_end_tag();
            } else if self.at_start_tag() {
                self.parse_start_tag();
            } else if self.at_code_transition() {
                self.parse_code();
            } else {
                self.parse_text();
            }
        }
    }

    // =========================================================================
    // Text and comments
    // =========================================================================

    fn parse_text(&mut self) {
        let start = self.pos;
        let mut content = String::new();

        while self.pos < self.bytes.len() {
            if self.starts_with("@@") {
                content.push('@');
                self.pos += 2;
                continue;
            }
            if self.pos > start && (self.at_markup_start() || self.at_code_transition()) {
                break;
            }
            let Some(c) = self.text[self.pos..].chars().next() else {
                break;
            };
            content.push(c);
            self.pos += c.len_utf8();
        }

        let id = self.alloc_id();
        let node = SyntaxNode::new(id, SyntaxKind::Text { content }, self.span(start, self.pos));
        self.push_node(node);
    }

    fn parse_comment(&mut self) {
        let start = self.pos;
        let body_start = start + 4;
        let id = self.alloc_id();

        let (content, end, terminated) = match self.text[body_start..].find("-->") {
            Some(offset) => (
                self.text[body_start..body_start + offset].to_string(),
                body_start + offset + 3,
                true,
            ),
            None => (self.text[body_start..].to_string(), self.bytes.len(), false),
        };
        self.pos = end;

        let mut node = SyntaxNode::new(id, SyntaxKind::Comment { content }, self.span(start, end));
        if !terminated {
            node.add_diagnostic(Diagnostic::error("STN1004", "Comment is missing '-->'"));
        }
        self.push_node(node);
    }

    // =========================================================================
    // Tags
    // =========================================================================

    fn parse_start_tag(&mut self) {
        let start = self.pos;
        let id = self.alloc_id();
        self.pos += 1;

        let opt_out = self.peek(0) == Some(b'!');
        if opt_out {
            self.pos += 1;
        }
        let tag_name = self.read_while(is_tag_name_byte).to_string();

        let mut attributes = Vec::new();
        let mut diagnostics = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek(0) {
                None => {
                    diagnostics.push(Diagnostic::error(
                        "STN1003",
                        format!("Start tag '<{}' is missing '>'", tag_name),
                    ));
                    break;
                }
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') if self.peek(1) == Some(b'>') => {
                    self_closing = true;
                    self.pos += 2;
                    break;
                }
                Some(b'/') => self.pos += 1,
                Some(_) => {
                    if let Some(attribute) = self.parse_attribute(&mut diagnostics) {
                        attributes.push(attribute);
                    }
                }
            }
        }

        let is_void = VOID_ELEMENTS
            .iter()
            .any(|void| void.eq_ignore_ascii_case(&tag_name));
        let element = ElementSyntax {
            tag_name,
            attributes,
            self_closing,
            has_end_tag: false,
            opt_out,
        };
        let span = self.span(start, self.pos);
        let mut node = SyntaxNode::new(id, SyntaxKind::Element(element), span);
        for diagnostic in diagnostics {
            node.add_diagnostic(diagnostic);
        }

        if self_closing || is_void {
            self.push_node(node);
        } else {
            self.stack.push(node);
        }
    }

    fn parse_attribute(&mut self, diagnostics: &mut Vec<Diagnostic>) -> Option<AttributeSyntax> {
        let text = self.text;
        let start = self.pos;
        let name = self
            .read_while(|b| !b.is_ascii_whitespace() && b != b'=' && b != b'>' && b != b'/')
            .to_string();

        if name.is_empty() {
            diagnostics.push(
                Diagnostic::warning("STN1007", "Malformed attribute")
                    .with_span(self.span(start, start + 1)),
            );
            self.pos += 1;
            return None;
        }

        let after_name = self.pos;
        self.skip_whitespace();
        if self.peek(0) != Some(b'=') {
            self.pos = after_name;
            return Some(AttributeSyntax {
                name,
                value: AttributeValue::Minimized,
                span: self.span(start, after_name),
            });
        }
        self.pos += 1;
        self.skip_whitespace();

        let raw = match self.peek(0) {
            Some(quote @ (b'"' | b'\'')) => {
                let value_start = self.pos + 1;
                match self.bytes[value_start..].iter().position(|b| *b == quote) {
                    Some(offset) => {
                        self.pos = value_start + offset + 1;
                        &text[value_start..value_start + offset]
                    }
                    None => {
                        diagnostics.push(
                            Diagnostic::error(
                                "STN1008",
                                format!("Value of attribute '{}' is missing its closing quote", name),
                            )
                            .with_span(self.span(start, self.bytes.len())),
                        );
                        self.pos = self.bytes.len();
                        &text[value_start..]
                    }
                }
            }
            _ => self.read_while(|b| !b.is_ascii_whitespace() && b != b'>'),
        };

        Some(AttributeSyntax {
            name,
            value: classify_value(raw),
            span: self.span(start, self.pos),
        })
    }

    fn parse_end_tag(&mut self) {
        let start = self.pos;
        self.pos += 2;
        if self.peek(0) == Some(b'!') {
            self.pos += 1;
        }
        let name = self.read_while(is_tag_name_byte).to_string();
        match self.text[self.pos..].find('>') {
            Some(offset) => self.pos += offset + 1,
            None => self.pos = self.bytes.len(),
        }
        let end = self.pos;

        let Some(index) = self
            .stack
            .iter()
            .rposition(|open| element_name(open).eq_ignore_ascii_case(&name))
        else {
            if VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(&name)) {
                return;
            }
            self.diagnostics.push(
                Diagnostic::error(
                    "STN1002",
                    format!("End tag '</{}>' has no matching start tag", name),
                )
                .with_span(self.span(start, end)),
            );
            return;
        };

        while self.stack.len() > index + 1 {
            if let Some(mut unclosed) = self.stack.pop() {
                debug!("implicitly closing '{}' before '</{}>'", element_name(&unclosed), name);
                let unclosed_name = element_name(&unclosed).to_string();
                unclosed.add_diagnostic(Diagnostic::error(
                    "STN1001",
                    format!("Element '{}' is missing an end tag", unclosed_name),
                ));
                self.push_node(unclosed);
            }
        }

        if let Some(mut element) = self.stack.pop() {
            if let SyntaxKind::Element(syntax) = &mut element.kind {
                syntax.has_end_tag = true;
            }
            element.span = SourceSpan {
                length: end - element.span.start,
                ..element.span
            };
            self.push_node(element);
        }
    }

    // =========================================================================
    // Embedded code
    // =========================================================================

    fn parse_code(&mut self) {
        let start = self.pos;
        let id = self.alloc_id();

        match self.peek(1) {
            Some(b'{') => {
                let (code, terminated) = self.read_balanced(start + 1, b'{', b'}');
                let mut node = SyntaxNode::new(
                    id,
                    SyntaxKind::CodeBlock {
                        code: code.trim().to_string(),
                    },
                    self.span(start, self.pos),
                );
                if !terminated {
                    node.add_diagnostic(Diagnostic::error("STN1005", "Code block is missing '}'"));
                }
                self.push_node(node);
            }
            Some(b'(') => {
                let (code, terminated) = self.read_balanced(start + 1, b'(', b')');
                let mut node = SyntaxNode::new(
                    id,
                    SyntaxKind::Expression {
                        code: code.trim().to_string(),
                        explicit: true,
                    },
                    self.span(start, self.pos),
                );
                if !terminated {
                    node.add_diagnostic(Diagnostic::error("STN1005", "Expression is missing ')'"));
                }
                self.push_node(node);
            }
            Some(b) if is_identifier_start(b) => {
                self.pos += 1;
                let identifier = self.read_while(is_identifier_byte).to_string();
                if self.at_line_start(start) && KNOWN_DIRECTIVES.contains(&identifier.as_str()) {
                    self.parse_directive(id, start, identifier);
                } else {
                    self.parse_implicit_expression(id, start);
                }
            }
            _ => {
                self.pos += 1;
                let mut node = SyntaxNode::new(
                    id,
                    SyntaxKind::Text {
                        content: "@".to_string(),
                    },
                    self.span(start, self.pos),
                );
                node.add_diagnostic(Diagnostic::error(
                    "STN1006",
                    "Expected an expression, code block or directive after '@'",
                ));
                self.push_node(node);
            }
        }
    }

    fn parse_directive(&mut self, id: NodeId, start: usize, name: String) {
        let line_end = self.text[self.pos..]
            .find('\n')
            .map_or(self.bytes.len(), |offset| self.pos + offset);
        let argument = self.text[self.pos..line_end].trim().to_string();
        let span = self.span(start, line_end);
        self.pos = (line_end + 1).min(self.bytes.len());

        let node = SyntaxNode::new(id, SyntaxKind::Directive { name, argument }, span);
        self.push_node(node);
    }

    fn parse_implicit_expression(&mut self, id: NodeId, start: usize) {
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(b'.'), Some(next)) if is_identifier_start(next) => {
                    self.pos += 1;
                    self.read_while(is_identifier_byte);
                }
                (Some(b'('), _) => {
                    self.read_balanced(self.pos, b'(', b')');
                }
                (Some(b'['), _) => {
                    self.read_balanced(self.pos, b'[', b']');
                }
                _ => break,
            }
        }

        let code = self.text[start + 1..self.pos].to_string();
        let node = SyntaxNode::new(
            id,
            SyntaxKind::Expression {
                code,
                explicit: false,
            },
            self.span(start, self.pos),
        );
        self.push_node(node);
    }

    /// Read from an opening delimiter to its balanced closing delimiter,
    /// skipping string literals. Returns the inner text and whether the
    /// closing delimiter was found.
    fn read_balanced(&mut self, open_at: usize, open: u8, close: u8) -> (&'a str, bool) {
        let text = self.text;
        let mut depth = 0usize;
        let mut i = open_at;
        let mut quote: Option<u8> = None;

        while i < self.bytes.len() {
            let b = self.bytes[i];
            match quote {
                Some(q) => {
                    if b == b'\\' {
                        i += 1;
                    } else if b == q {
                        quote = None;
                    }
                }
                None => {
                    if b == b'"' || b == b'\'' {
                        quote = Some(b);
                    } else if b == open {
                        depth += 1;
                    } else if b == close {
                        depth -= 1;
                        if depth == 0 {
                            self.pos = i + 1;
                            return (&text[open_at + 1..i], true);
                        }
                    }
                }
            }
            i += 1;
        }

        self.pos = self.bytes.len();
        (&text[(open_at + 1).min(self.bytes.len())..], false)
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn at_markup_start(&self) -> bool {
        self.starts_with("<!--") || self.at_end_tag() || self.at_start_tag()
    }

    fn at_start_tag(&self) -> bool {
        if self.peek(0) != Some(b'<') {
            return false;
        }
        match self.peek(1) {
            Some(b) if b.is_ascii_alphabetic() => true,
            Some(b'!') => {
                matches!(self.peek(2), Some(b) if b.is_ascii_alphabetic())
                    && !self.text[self.pos + 2..]
                        .get(..7)
                        .is_some_and(|word| word.eq_ignore_ascii_case("doctype"))
            }
            _ => false,
        }
    }

    fn at_end_tag(&self) -> bool {
        self.starts_with("</")
            && match self.peek(2) {
                Some(b'!') => matches!(self.peek(3), Some(b) if b.is_ascii_alphabetic()),
                Some(b) => b.is_ascii_alphabetic(),
                None => false,
            }
    }

    fn at_code_transition(&self) -> bool {
        if self.peek(0) != Some(b'@') || self.peek(1) == Some(b'@') {
            return false;
        }
        // `user@example.com` stays text
        !(self.pos > 0 && self.bytes[self.pos - 1].is_ascii_alphanumeric())
    }

    fn at_line_start(&self, at: usize) -> bool {
        self.bytes[..at]
            .iter()
            .rev()
            .find(|b| **b != b' ' && **b != b'\t')
            .map_or(true, |b| *b == b'\n')
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.bytes[self.pos..].starts_with(pattern.as_bytes())
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn read_while(&mut self, predicate: impl Fn(u8) -> bool) -> &'a str {
        let text = self.text;
        let start = self.pos;
        while self.pos < self.bytes.len() && predicate(self.bytes[self.pos]) {
            self.pos += 1;
        }
        &text[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.read_while(|b| b.is_ascii_whitespace());
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_node(&mut self, node: SyntaxNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn span(&self, start: usize, end: usize) -> SourceSpan {
        let line_index = match self.line_starts.binary_search(&start) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        SourceSpan::new(
            start,
            end.saturating_sub(start),
            line_index + 1,
            start - self.line_starts[line_index] + 1,
        )
    }
}

fn element_name(node: &SyntaxNode) -> &str {
    node.as_element().map_or("", |element| element.tag_name.as_str())
}

fn classify_value(raw: &str) -> AttributeValue {
    if let Some(escaped) = raw.strip_prefix("@@") {
        return AttributeValue::Literal(format!("@{}", escaped));
    }
    match raw.strip_prefix('@') {
        Some(code) => {
            let code = code
                .strip_prefix('(')
                .and_then(|inner| inner.strip_suffix(')'))
                .unwrap_or(code);
            AttributeValue::Code(code.to_string())
        }
        None => AttributeValue::Literal(raw.to_string()),
    }
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'.' | b'_')
}

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SyntaxTree {
        MarkupParser::parse(&SourceDocument::new("Test.stencil", text))
    }

    #[test]
    fn test_classify_value() {
        assert_eq!(classify_value("text"), AttributeValue::Literal("text".to_string()));
        assert_eq!(classify_value("@model.Name"), AttributeValue::Code("model.Name".to_string()));
        assert_eq!(classify_value("@(a + b)"), AttributeValue::Code("a + b".to_string()));
        assert_eq!(classify_value("@@handle"), AttributeValue::Literal("@handle".to_string()));
    }

    #[test]
    fn test_span_line_and_column() {
        let tree = parse("<p>\n  <b>x</b>\n</p>");
        let p = &tree.root[0];
        let b = p
            .children
            .iter()
            .find(|child| child.as_element().is_some())
            .unwrap();
        assert_eq!(b.span.line, 2);
        assert_eq!(b.span.column, 3);
    }

    #[test]
    fn test_ids_are_pre_order() {
        let tree = parse("<div><span>a</span></div><p></p>");
        let mut ids = Vec::new();
        tree.walk(&mut |node, _| ids.push(node.id.0));
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(tree.node_count, 4);
    }

    #[test]
    fn test_email_is_text() {
        let tree = parse("mail user@example.com now");
        assert_eq!(tree.root.len(), 1);
        assert!(matches!(
            &tree.root[0].kind,
            SyntaxKind::Text { content } if content == "mail user@example.com now"
        ));
    }
}
