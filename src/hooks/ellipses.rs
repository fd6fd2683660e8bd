//! Collapse definitions whose whole body is a lone `...` placeholder onto
//! one line, with a single space after the colon.

use crate::hooks::{HookContext, HookError};
use crate::py::{locate_through, sole_ellipsis_body, walk, NodeKind, PythonParser};
use crate::rewrite::Rewriter;
use regex::Regex;
use std::sync::OnceLock;
use tree_sitter::Node;

fn colon_ellipsis() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":\s+\.\.\.").unwrap())
}

pub fn ellipsis_reformat(source: &str, _ctx: &HookContext<'_>) -> Result<String, HookError> {
    if !source.contains("...") {
        return Ok(source.to_owned());
    }

    let mut parser = PythonParser::new()?;
    let parsed = parser.parse_checked(source)?;

    let mut rewriter = Rewriter::new(source);
    walk(parsed.root_node(), &mut |node| {
        if matches!(
            NodeKind::of(&node),
            NodeKind::FunctionDef | NodeKind::ClassDef
        ) {
            squash(&mut rewriter, &node);
        }
        // Descend regardless: nested definitions are squashed independently.
        true
    });

    Ok(rewriter.finish()?)
}

fn squash(rewriter: &mut Rewriter<'_>, def: &Node<'_>) {
    let Some(placeholder) = sole_ellipsis_body(def) else {
        return;
    };
    let span = locate_through(def, &placeholder);
    if span.is_sentinel() {
        return;
    }
    let text = rewriter.text_at(span);
    let squashed = colon_ellipsis().replace_all(text, ": ...");
    if squashed != text {
        rewriter.record(span, squashed.into_owned());
    }
}
