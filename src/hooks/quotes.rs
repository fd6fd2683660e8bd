//! Dynamic quotes: prefer double quotes, use single quotes for empty and
//! single-character strings, and leave anything semantically delicate
//! (prefixed literals, multi-line literals, docstrings) untouched.

use crate::hooks::{HookContext, HookError};
use crate::py::strings::{decode, repr_double, repr_single, split_literal};
use crate::py::{is_docstring, locate, walk, NodeKind, PythonParser};
use crate::rewrite::Rewriter;
use tree_sitter::Node;

pub fn dynamic_quotes(source: &str, _ctx: &HookContext<'_>) -> Result<String, HookError> {
    let mut parser = PythonParser::new()?;
    let parsed = parser.parse_checked(source)?;

    let mut rewriter = Rewriter::new(source);
    walk(parsed.root_node(), &mut |node| {
        if NodeKind::of(&node) == NodeKind::StringLit {
            rewrite_string(&mut rewriter, &node);
            // Never descend into a string: this also leaves every literal
            // nested inside an f-string interpolation alone.
            false
        } else {
            true
        }
    });

    Ok(rewriter.finish()?)
}

fn rewrite_string(rewriter: &mut Rewriter<'_>, node: &Node<'_>) {
    let span = locate(node);
    if span.is_sentinel() {
        return;
    }
    if is_docstring(node) {
        return;
    }

    let text = rewriter.text_at(span);
    let Some(parts) = split_literal(text) else {
        return;
    };
    // Raw, formatted and bytes prefixes change semantics; leave them alone.
    if !parts.prefix.is_empty() {
        return;
    }
    let Some(value) = decode(parts.body) else {
        return;
    };

    // Empty and single-character strings take single quotes.
    let replacement = if value.is_empty() {
        "''".to_owned()
    } else if value.len() == 1 {
        repr_single(&value)
    } else if text.contains('\n') {
        // Multi-line literal.
        return;
    } else if value.contains(&0x0A) || parts.body.contains("\\n") {
        // The value embeds a newline (literal or escaped).
        return;
    } else {
        repr_double(&value)
    };

    if replacement != text {
        rewriter.record(span, replacement);
    }
}
