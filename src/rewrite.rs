//! The per-invocation rewrite scaffold shared by every tree-walking pass:
//! one immutable source, one ledger, one apply.

use crate::patch::{self, Ledger, PatchError, Replacement, Span};
use tree_sitter::Node;

/// One pass invocation's view of a document: the original text plus the
/// replacements recorded so far. Created fresh per pass, consumed by
/// [`Rewriter::finish`].
pub struct Rewriter<'a> {
    source: &'a str,
    ledger: Ledger,
}

impl<'a> Rewriter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            ledger: Ledger::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// The original text at `span`.
    pub fn text_at(&self, span: Span) -> &'a str {
        &self.source[span.start..span.end]
    }

    /// The source text of a node.
    pub fn node_text(&self, node: &Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    /// Record a region of text to be replaced. Sentinel spans are ignored.
    pub fn record(&mut self, span: Span, new_text: impl Into<String>) {
        self.ledger.record(span, new_text);
    }

    pub fn entries(&self) -> &[Replacement] {
        self.ledger.entries()
    }

    /// Apply all recorded replacements and return the new text.
    pub fn finish(self) -> Result<String, PatchError> {
        patch::apply(self.source, self.ledger.entries())
    }
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |nl| nl + 1)
}

/// Column (in bytes) of `offset` within its line.
pub fn column_at(source: &str, offset: usize) -> usize {
    offset - line_start(source, offset)
}

/// The non-alphabetic prefix of the line containing `offset`: the
/// indentation (and any comment markers) before the first letter.
pub fn indent_prefix(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let line = &source[start..];
    let end = line
        .char_indices()
        .find(|(_, c)| c.is_ascii_alphabetic())
        .map_or(line.len(), |(i, _)| i);
    let prefix = &line[..end];
    // Stop at the end of the line: the prefix belongs to one physical line.
    prefix.split('\n').next().unwrap_or(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewriter_identity_when_nothing_recorded() {
        let rw = Rewriter::new("x = 1\n");
        assert_eq!(rw.finish().unwrap(), "x = 1\n");
    }

    #[test]
    fn rewriter_applies_recorded_edits() {
        let mut rw = Rewriter::new("x = 1\ny = 2\n");
        rw.record(Span::new(4, 5), "10");
        rw.record(Span::new(10, 11), "20");
        assert_eq!(rw.finish().unwrap(), "x = 10\ny = 20\n");
    }

    #[test]
    fn line_start_and_column() {
        let source = "abc\ndef\n";
        assert_eq!(line_start(source, 0), 0);
        assert_eq!(line_start(source, 5), 4);
        assert_eq!(column_at(source, 6), 2);
    }

    #[test]
    fn indent_prefix_takes_leading_non_alpha() {
        let source = "class F:\n\tfrom collections import x\n";
        assert_eq!(indent_prefix(source, 10), "\t");
        let spaced = "def f():\n    from collections import x\n";
        assert_eq!(indent_prefix(spaced, 13), "    ");
    }
}
