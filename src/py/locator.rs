use crate::patch::Span;
use tree_sitter::Node;

/// The node categories the rewrite passes care about.
///
/// A closed sum type with an explicit fallthrough arm: passes match on this
/// exhaustively, and anything they do not handle lands in `Other` and is
/// descended into unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    FunctionDef,
    ClassDef,
    Block,
    ImportFrom,
    StringLit,
    Subscript,
    /// An `identifier[...]` form in annotation position; expression
    /// position produces [`NodeKind::Subscript`] for the same source text.
    GenericType,
    Other,
}

impl NodeKind {
    pub fn of(node: &Node<'_>) -> Self {
        match node.kind() {
            "module" => NodeKind::Module,
            "function_definition" => NodeKind::FunctionDef,
            "class_definition" => NodeKind::ClassDef,
            "block" => NodeKind::Block,
            "import_from_statement" => NodeKind::ImportFrom,
            "string" => NodeKind::StringLit,
            "subscript" => NodeKind::Subscript,
            "generic_type" => NodeKind::GenericType,
            _ => NodeKind::Other,
        }
    }
}

/// Map a tree node to its exact byte range in the original text.
///
/// Synthetic nodes (tree-sitter "missing" nodes, inserted during error
/// recovery) have no real source extent and yield the sentinel span, which
/// every caller must treat as "do not rewrite this occurrence".
pub fn locate(node: &Node<'_>) -> Span {
    if node.is_missing() {
        return Span::SENTINEL;
    }
    Span::new(node.start_byte(), node.end_byte())
}

/// Span from the start of `node` to the end of `until` (used to widen a
/// definition's span through the placeholder inside its body).
pub fn locate_through(node: &Node<'_>, until: &Node<'_>) -> Span {
    if node.is_missing() || until.is_missing() || until.end_byte() < node.start_byte() {
        return Span::SENTINEL;
    }
    Span::new(node.start_byte(), until.end_byte())
}

/// Depth-first preorder walk. The callback returns whether to descend into
/// the node's children.
pub fn walk<'t, F>(node: Node<'t>, visit: &mut F)
where
    F: FnMut(Node<'t>) -> bool,
{
    if !visit(node) {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, visit);
    }
}

/// First named, non-comment child of a node.
fn first_statement<'t>(body: &Node<'t>) -> Option<Node<'t>> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first
}

/// Whether `node` is a docstring: a string literal that is the first
/// statement of a module, function body, or class body.
pub fn is_docstring(node: &Node<'_>) -> bool {
    if node.kind() != "string" {
        return false;
    }
    let Some(mut stmt) = node.parent() else {
        return false;
    };
    // Implicitly concatenated parts (`'a' 'b'`) sit one level deeper.
    if stmt.kind() == "concatenated_string" {
        let Some(outer) = stmt.parent() else {
            return false;
        };
        stmt = outer;
    }
    if stmt.kind() != "expression_statement" {
        return false;
    }
    let Some(body) = stmt.parent() else {
        return false;
    };
    let holds_docstrings = match NodeKind::of(&body) {
        NodeKind::Module => true,
        NodeKind::Block => matches!(
            body.parent().map(|p| NodeKind::of(&p)),
            Some(NodeKind::FunctionDef) | Some(NodeKind::ClassDef)
        ),
        _ => false,
    };
    if !holds_docstrings {
        return false;
    }
    first_statement(&body).map(|first| first.id()) == Some(stmt.id())
}

/// Whether a definition's body is exactly one `...` placeholder statement.
///
/// A docstring followed by a placeholder does not count: the placeholder
/// must be the sole statement.
pub fn sole_ellipsis_body<'t>(def: &Node<'t>) -> Option<Node<'t>> {
    let body = def.child_by_field_name("body")?;
    if body.named_child_count() != 1 {
        return None;
    }
    let stmt = body.named_child(0)?;
    if stmt.kind() != "expression_statement" || stmt.named_child_count() != 1 {
        return None;
    }
    let expr = stmt.named_child(0)?;
    if expr.kind() == "ellipsis" {
        Some(expr)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::py::parser::PythonParser;

    fn with_tree(source: &str, f: impl FnOnce(Node<'_>, &str)) {
        let mut parser = PythonParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        f(parsed.root_node(), source);
    }

    fn find_kind<'t>(root: Node<'t>, kind: &str) -> Option<Node<'t>> {
        let mut found = None;
        walk(root, &mut |node| {
            if found.is_none() && node.kind() == kind {
                found = Some(node);
            }
            found.is_none()
        });
        found
    }

    #[test]
    fn locate_matches_source_slice() {
        with_tree("x = 'hello'\n", |root, source| {
            let string = find_kind(root, "string").unwrap();
            let span = locate(&string);
            assert_eq!(&source[span.start..span.end], "'hello'");
        });
    }

    #[test]
    fn module_docstring_detected() {
        with_tree("'''doc'''\nx = 1\n", |root, _| {
            let string = find_kind(root, "string").unwrap();
            assert!(is_docstring(&string));
        });
    }

    #[test]
    fn function_docstring_detected() {
        with_tree("def f():\n    \"doc\"\n    return 1\n", |root, _| {
            let string = find_kind(root, "string").unwrap();
            assert!(is_docstring(&string));
        });
    }

    #[test]
    fn comment_before_docstring_is_ignored() {
        with_tree("# header\n'''doc'''\n", |root, _| {
            let string = find_kind(root, "string").unwrap();
            assert!(is_docstring(&string));
        });
    }

    #[test]
    fn concatenated_docstring_parts_detected() {
        with_tree("'part one' 'part two'\nx = 1\n", |root, _| {
            let string = find_kind(root, "string").unwrap();
            assert!(is_docstring(&string));
        });
    }

    #[test]
    fn later_concatenated_string_is_not_a_docstring() {
        with_tree("x = 1\ny = 'part one' 'part two'\n", |root, _| {
            let string = find_kind(root, "string").unwrap();
            assert!(!is_docstring(&string));
        });
    }

    #[test]
    fn later_string_is_not_a_docstring() {
        with_tree("x = 1\n'not a docstring'\n", |root, _| {
            let string = find_kind(root, "string").unwrap();
            assert!(!is_docstring(&string));
        });
    }

    #[test]
    fn string_in_if_block_is_not_a_docstring() {
        with_tree("if x:\n    'nope'\n", |root, _| {
            let string = find_kind(root, "string").unwrap();
            assert!(!is_docstring(&string));
        });
    }

    #[test]
    fn sole_ellipsis_body_detected() {
        with_tree("def f():\n    ...\n", |root, _| {
            let def = find_kind(root, "function_definition").unwrap();
            assert!(sole_ellipsis_body(&def).is_some());
        });
    }

    #[test]
    fn docstring_plus_ellipsis_is_not_sole() {
        with_tree("def f():\n    'doc'\n    ...\n", |root, _| {
            let def = find_kind(root, "function_definition").unwrap();
            assert!(sole_ellipsis_body(&def).is_none());
        });
    }
}
