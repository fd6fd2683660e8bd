//! Text-level passes: `noqa` comment normalization, a parse-only syntax
//! check, and blank-line squishing for `.pyi` stub files.

use crate::hooks::{HookContext, HookError};
use crate::py::PythonParser;
use regex::Regex;
use std::sync::OnceLock;

fn noqa_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""""\s+#\s+noqa"#).unwrap())
}

/// Pull a `# noqa` comment that drifted below a closing `"""` back onto
/// the same line, separated by two spaces.
pub fn noqa_reformat(source: &str, _ctx: &HookContext<'_>) -> Result<String, HookError> {
    Ok(noqa_re().replace_all(source, "\"\"\"  # noqa").into_owned())
}

/// Parse the source and fail on a syntax error; the text itself is
/// returned unchanged.
pub fn check_ast(source: &str, _ctx: &HookContext<'_>) -> Result<String, HookError> {
    let mut parser = PythonParser::new()?;
    parser.parse_checked(source)?;
    Ok(source.to_owned())
}

fn def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:# )?(\s*)def( .*\($)?").unwrap())
}

fn deco_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:# )?(\s*)@").unwrap())
}

/// Normalize the vertical layout of a `.pyi` stub file: consecutive
/// same-indent `def` stubs touch, everything else keeps a single blank
/// line before it. Files with any other extension pass through unchanged.
pub fn squish_stubs(source: &str, ctx: &HookContext<'_>) -> Result<String, HookError> {
    let is_stub_file = ctx
        .filename
        .and_then(|filename| filename.extension())
        .is_some_and(|ext| ext == "pyi");
    if !is_stub_file {
        return Ok(source.to_owned());
    }

    let mut out: Vec<String> = Vec::new();
    let mut last_line = String::new();
    // Indent of the innermost multi-line signature seen; empty means
    // top level.
    let mut block_indent = String::new();

    for line in source.split('\n') {
        let line_def = def_re().captures(line);
        let last_def = def_re().captures(&last_line);
        let line_deco = deco_re().captures(line);

        if let Some(caps) = &line_def {
            if caps.get(2).is_some() {
                block_indent = caps[1].to_owned();
            }
        }

        if let Some(last_caps) = &last_def {
            if let Some(caps) = &line_def {
                if caps[1] == last_caps[1] {
                    // Two stubs at the same depth touch.
                    last_line = line.to_owned();
                    out.push(line.to_owned());
                    continue;
                }
            }
            if line.is_empty() {
                block_indent.clear();
                continue;
            }
            if let Some(deco) = &line_deco {
                if deco[1] == last_caps[1] {
                    last_line = line.to_owned();
                    ensure_single_blank(&mut out);
                    out.push(line.to_owned());
                    continue;
                }
            }
            last_line = line.to_owned();
            if block_indent.is_empty() {
                ensure_single_blank(&mut out);
                out.push(String::new());
            }
            out.push(line.to_owned());
            continue;
        }

        if let Some(deco) = &line_deco {
            if !deco[1].is_empty() {
                last_line = line.to_owned();
                ensure_single_blank(&mut out);
                out.push(line.to_owned());
                continue;
            }
        }

        last_line = line.to_owned();
        out.push(line.to_owned());
    }

    ensure_single_blank(&mut out);
    Ok(out.join("\n"))
}

/// Drop trailing blank lines, then leave exactly one.
fn ensure_single_blank(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines.push(String::new());
}
