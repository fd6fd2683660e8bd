//! Rewrite `from collections import ...` statements that pull in abstract
//! base classes, splitting them into a `collections.abc` import and a
//! residual `collections` import.

use crate::hooks::{HookContext, HookError};
use crate::py::{locate, walk, NodeKind, PythonParser};
use crate::rewrite::{indent_prefix, Rewriter};
use tree_sitter::Node;

/// Names that moved to `collections.abc`.
const COLLECTIONS_ABC: &[&str] = &[
    "AsyncGenerator",
    "AsyncIterable",
    "AsyncIterator",
    "Awaitable",
    "ByteString",
    "Callable",
    "Collection",
    "Container",
    "Coroutine",
    "Generator",
    "Hashable",
    "ItemsView",
    "Iterable",
    "Iterator",
    "KeysView",
    "Mapping",
    "MappingView",
    "MutableMapping",
    "MutableSequence",
    "MutableSet",
    "Reversible",
    "Sequence",
    "Set",
    "Sized",
    "ValuesView",
];

pub fn rewrite_collections_abc_imports(
    source: &str,
    _ctx: &HookContext<'_>,
) -> Result<String, HookError> {
    let mut parser = PythonParser::new()?;
    let parsed = parser.parse_checked(source)?;

    let mut rewriter = Rewriter::new(source);
    walk(parsed.root_node(), &mut |node| {
        if NodeKind::of(&node) == NodeKind::ImportFrom {
            rewrite_import(&mut rewriter, &node);
            false
        } else {
            true
        }
    });

    Ok(rewriter.finish()?)
}

fn rewrite_import(rewriter: &mut Rewriter<'_>, node: &Node<'_>) {
    let Some(module) = node.child_by_field_name("module_name") else {
        return;
    };
    // Relative imports (`from .collections import ...`) name something else.
    if module.kind() != "dotted_name" || rewriter.node_text(&module) != "collections" {
        return;
    }

    let mut abc_names: Vec<String> = Vec::new();
    let mut plain_names: Vec<String> = Vec::new();
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        let (base, rendered) = match name.kind() {
            "dotted_name" => {
                let text = rewriter.node_text(&name);
                (text, text.to_owned())
            }
            "aliased_import" => {
                let Some(base) = name.child_by_field_name("name") else {
                    return;
                };
                let Some(alias) = name.child_by_field_name("alias") else {
                    return;
                };
                let base = rewriter.node_text(&base);
                (
                    base,
                    format!("{base} as {}", rewriter.node_text(&alias)),
                )
            }
            _ => return,
        };
        if COLLECTIONS_ABC.contains(&base) {
            abc_names.push(rendered);
        } else {
            plain_names.push(rendered);
        }
    }
    // `from collections import *` has no name children.
    if abc_names.is_empty() {
        return;
    }

    let span = locate(node);
    if span.is_sentinel() {
        return;
    }

    let mut statements = vec![format!(
        "from collections.abc import {}",
        abc_names.join(", ")
    )];
    if !plain_names.is_empty() {
        statements.push(format!("from collections import {}", plain_names.join(", ")));
    }

    let indent = indent_prefix(rewriter.source(), span.start);
    let separator = format!("\n{indent}");
    let replacement = statements.join(separator.as_str());
    if replacement != rewriter.text_at(span) {
        rewriter.record(span, replacement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookContext;

    fn run(source: &str) -> String {
        rewrite_collections_abc_imports(source, &HookContext::empty()).unwrap()
    }

    #[test]
    fn pure_abc_import_moves() {
        assert_eq!(
            run("from collections import Iterable\n"),
            "from collections.abc import Iterable\n"
        );
    }

    #[test]
    fn mixed_import_splits() {
        assert_eq!(
            run("from collections import Counter, Iterable, OrderedDict, Sequence\n"),
            concat!(
                "from collections.abc import Iterable, Sequence\n",
                "from collections import Counter, OrderedDict\n"
            )
        );
    }

    #[test]
    fn plain_import_is_untouched() {
        let source = "from collections import Counter, defaultdict\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn alias_survives_the_split() {
        assert_eq!(
            run("from collections import Mapping as Map, deque\n"),
            concat!(
                "from collections.abc import Mapping as Map\n",
                "from collections import deque\n"
            )
        );
    }

    #[test]
    fn parenthesized_multiline_import_splits() {
        let source = "from collections import (\n\tIterable,\n\tCounter,\n)\n";
        assert_eq!(
            run(source),
            concat!(
                "from collections.abc import Iterable\n",
                "from collections import Counter\n"
            )
        );
    }

    #[test]
    fn indented_import_keeps_its_indentation() {
        let source = "if True:\n\tfrom collections import Counter, Iterable\n";
        let expected = concat!(
            "if True:\n",
            "\tfrom collections.abc import Iterable\n",
            "\tfrom collections import Counter\n",
        );
        assert_eq!(run(source), expected);
    }

    #[test]
    fn other_modules_are_untouched() {
        let source = "from typing import Iterable\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn relative_import_is_untouched() {
        let source = "from .collections import Iterable\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn wildcard_import_is_untouched() {
        let source = "from collections import *\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn already_split_is_stable() {
        let source = "from collections.abc import Iterable\n";
        assert_eq!(run(source), source);
    }
}
