//! Diagnostics attached to syntax and IR nodes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Byte range in a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte length
    pub length: usize,
    /// 1-based line of `start`
    pub line: usize,
    /// 1-based column of `start`
    pub column: usize,
}

impl SourceSpan {
    pub fn new(start: usize, length: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            length,
            line,
            column,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// A semantic problem found while compiling a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Stable code, e.g. "STN1001"
    pub code: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<SourceSpan>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.span {
            Some(span) => write!(
                f,
                "{}:{}: {} {}: {}",
                span.line, span.column, level, self.code, self.message
            ),
            None => write!(f, "{} {}: {}", level, self.code, self.message),
        }
    }
}

/// Sort collected diagnostics into document order
///
/// Diagnostics without a span come first; the sort is stable so equal
/// positions keep their collection order.
pub fn sort_in_document_order(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| d.span.map(|s| (1u8, s.start)).unwrap_or((0, 0)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_span() {
        let diagnostic = Diagnostic::error("STN1001", "Unclosed element 'div'")
            .with_span(SourceSpan::new(10, 5, 2, 3));
        assert_eq!(diagnostic.to_string(), "2:3: error STN1001: Unclosed element 'div'");
    }

    #[test]
    fn test_document_order_is_stable() {
        let mut diagnostics = vec![
            Diagnostic::warning("B", "b").with_span(SourceSpan::new(20, 1, 1, 21)),
            Diagnostic::warning("A", "a").with_span(SourceSpan::new(5, 1, 1, 6)),
            Diagnostic::info("R", "root"),
            Diagnostic::warning("C", "c").with_span(SourceSpan::new(5, 2, 1, 6)),
        ];
        sort_in_document_order(&mut diagnostics);
        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["R", "A", "C", "B"]);
    }
}
