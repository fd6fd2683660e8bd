use crate::py::errors::ParseError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser wrapper for Python source code.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = SupportLang::Python.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| ParseError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, ParseError> {
        self.parser
            .parse(source, None)
            .ok_or(ParseError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, ParseError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }

    /// Parse and fail hard if the source is not valid Python.
    ///
    /// Rewrite passes use this: a pass that cannot parse its input must not
    /// partially rewrite it.
    pub fn parse_checked<'a>(&mut self, source: &'a str) -> Result<ParsedSource<'a>, ParseError> {
        let parsed = self.parse_with_source(source)?;
        if let Some(error) = parsed.first_error() {
            return Err(ParseError::Syntax {
                line: error.start_point.row + 1,
                column: error.start_point.column + 1,
            });
        }
        Ok(parsed)
    }
}

/// A parsed source file with its tree-sitter tree.
#[derive(Debug)]
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR or missing nodes.
    pub fn has_errors(&self) -> bool {
        self.first_error().is_some()
    }

    /// The first ERROR or missing node in document order, if any.
    pub fn first_error(&self) -> Option<ErrorNode> {
        find_error_node(self.tree.root_node())
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

/// Information about an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
}

fn find_error_node(node: tree_sitter::Node<'_>) -> Option<ErrorNode> {
    if node.is_error() || node.is_missing() {
        return Some(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
        });
    }

    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(error) = find_error_node(child) {
            return Some(error);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_python() {
        let mut parser = PythonParser::new().unwrap();
        let source = "def main():\n    print(\"hello\")\n";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(!parsed.has_errors());
        assert_eq!(parsed.root_node().kind(), "module");
    }

    #[test]
    fn parse_invalid_python() {
        let mut parser = PythonParser::new().unwrap();
        let source = "def main(:\n    pass\n";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(parsed.has_errors());
    }

    #[test]
    fn parse_checked_reports_position() {
        let mut parser = PythonParser::new().unwrap();
        let err = parser.parse_checked("x = (\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn node_text_slices_source() {
        let mut parser = PythonParser::new().unwrap();
        let source = "x = 1\ny = 2\n";
        let parsed = parser.parse_with_source(source).unwrap();
        let first = parsed.root_node().named_child(0).unwrap();
        assert_eq!(parsed.node_text(first), "x = 1");
    }
}
