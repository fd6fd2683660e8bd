//! Reformat overlong parameterized type annotations (`Union[...]`,
//! `Mapping[...]` and friends), breaking one element per line once the
//! rendered form would not fit on the current line.

use crate::config::{GlobalConfig, DEFAULT_INDENT, DEFAULT_LINE_LENGTH};
use crate::hooks::{HookContext, HookError};
use crate::patch::Span;
use crate::py::{locate, NodeKind, PythonParser};
use crate::rewrite::{line_start, Rewriter};
use std::fmt;
use tree_sitter::Node;

/// Subscripted names this pass reformats: the `typing` generics plus the
/// `collections.abc` views that take parameters.
const GENERIC_BASES: &[&str] = &[
    "Union",
    "List",
    "Tuple",
    "Set",
    "Dict",
    "Callable",
    "Optional",
    "Literal",
    "Collection",
    "MutableSet",
    "Mapping",
    "MutableMapping",
    "Sequence",
    "MutableSequence",
    "ByteString",
    "KeysView",
    "ItemsView",
    "ValuesView",
];

/// One element of a subscript's parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Element {
    /// An identifier, dotted name, constant or string.
    Atom(String),
    /// A nested parameterized type.
    Generic(Generic),
    /// A bracketed list, as in `Callable[[int, str], None]`.
    List(Vec<Element>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Generic {
    name: String,
    elements: Vec<Element>,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Atom(text) => f.write_str(text),
            Element::Generic(generic) => generic.fmt(f),
            Element::List(elements) => write!(f, "[{}]", join(elements)),
        }
    }
}

impl fmt::Display for Generic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, join(&self.elements))
    }
}

fn join(elements: &[Element]) -> String {
    elements
        .iter()
        .map(Element::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Generic {
    /// Render, breaking one element per line when the single-line form
    /// would overrun `line_length` from `line_offset`.
    fn format(&self, line_offset: usize, line_length: usize, indent: &str) -> String {
        let flat = self.to_string();
        if line_offset + flat.chars().count() <= line_length {
            return flat;
        }

        let mut lines = vec![format!("{}[", self.name)];
        let last = self.elements.len().saturating_sub(1);
        for (index, element) in self.elements.iter().enumerate() {
            let rendered = match element {
                Element::Generic(nested) => prefix_lines(
                    &nested.format(line_offset + 4, line_length, indent),
                    indent,
                ),
                other => format!("{indent}{other}"),
            };
            if index < last {
                lines.push(format!("{rendered},"));
            } else {
                lines.push(rendered);
            }
        }
        lines.push(format!("{indent}]"));
        lines.join("\n")
    }
}

fn prefix_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a parameterized-type node into a [`Generic`] if its base is one
/// of the recognized names and every element is representable. Returns
/// `None` otherwise, leaving that node untouched.
///
/// The same source text parses two ways: `Union[int, str]` is a
/// `generic_type` in annotation position but a `subscript` in expression
/// position (a type alias assignment); both are handled here.
fn parse_target(node: &Node<'_>, source: &str) -> Option<Generic> {
    let (base, elements) = match node.kind() {
        "subscript" => (
            node.child_by_field_name("value")?,
            parse_subscript_elements(node, source)?,
        ),
        "generic_type" => {
            let base = node.named_child(0)?;
            let params = node.named_child(1)?;
            (base, parse_type_parameter(&params, source)?)
        }
        _ => return None,
    };

    let name = match base.kind() {
        "identifier" => {
            let text = node_text(&base, source);
            if !GENERIC_BASES.contains(&text) {
                return None;
            }
            text.to_owned()
        }
        "attribute" => {
            let object = base.child_by_field_name("object")?;
            let attribute = base.child_by_field_name("attribute")?;
            let module = node_text(&object, source);
            if !matches!(module, "typing" | "typing_extensions")
                || !GENERIC_BASES.contains(&node_text(&attribute, source))
            {
                return None;
            }
            node_text(&base, source).to_owned()
        }
        _ => return None,
    };
    Some(Generic { name, elements })
}

fn parse_subscript_elements(subscript: &Node<'_>, source: &str) -> Option<Vec<Element>> {
    let mut cursor = subscript.walk();
    subscript
        .children_by_field_name("subscript", &mut cursor)
        .map(|child| parse_element(&child, source))
        .collect()
}

/// Elements of a `type_parameter` node. Each child is a `type` wrapper
/// around the actual expression.
fn parse_type_parameter(params: &Node<'_>, source: &str) -> Option<Vec<Element>> {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .map(|child| parse_element(&unwrap_type(child), source))
        .collect()
}

fn unwrap_type(node: Node<'_>) -> Node<'_> {
    if node.kind() == "type" {
        node.named_child(0).unwrap_or(node)
    } else {
        node
    }
}

fn parse_element(node: &Node<'_>, source: &str) -> Option<Element> {
    match node.kind() {
        "identifier" | "attribute" | "none" | "true" | "false" | "integer" | "float"
        | "ellipsis" | "unary_operator" => Some(Element::Atom(node_text(node, source).to_owned())),
        "string" => {
            let text = node_text(node, source);
            let body = crate::py::strings::split_literal(text).map_or(text, |parts| parts.body);
            Some(Element::Atom(format!("\"{body}\"")))
        }
        "list" => {
            let mut cursor = node.walk();
            let elements: Option<Vec<Element>> = node
                .named_children(&mut cursor)
                .map(|child| parse_element(&child, source))
                .collect();
            Some(Element::List(elements?))
        }
        "subscript" => {
            let value = node.child_by_field_name("value")?;
            if !matches!(value.kind(), "identifier" | "attribute") {
                return None;
            }
            Some(Element::Generic(Generic {
                name: node_text(&value, source).to_owned(),
                elements: parse_subscript_elements(node, source)?,
            }))
        }
        "generic_type" => {
            let base = node.named_child(0)?;
            if !matches!(base.kind(), "identifier" | "attribute") {
                return None;
            }
            let params = node.named_child(1)?;
            Some(Element::Generic(Generic {
                name: node_text(&base, source).to_owned(),
                elements: parse_type_parameter(&params, source)?,
            }))
        }
        _ => None,
    }
}

fn node_text<'a>(node: &Node<'_>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

struct Target {
    span: Span,
    generic: Generic,
    in_class: bool,
}

/// Collect reformattable parameterized types. Function bodies (and
/// signatures) are never entered; targets inside a class body remember
/// that fact so their continuation lines pick up an extra indent level.
fn collect(node: Node<'_>, in_class: bool, source: &str, targets: &mut Vec<Target>) {
    match NodeKind::of(&node) {
        NodeKind::FunctionDef => return,
        NodeKind::ClassDef => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect(child, true, source, targets);
            }
            return;
        }
        NodeKind::Subscript | NodeKind::GenericType => {
            if let Some(generic) = parse_target(&node, source) {
                targets.push(Target {
                    span: locate(&node),
                    generic,
                    in_class,
                });
                return;
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, in_class, source, targets);
    }
}

pub fn reformat_generics(source: &str, ctx: &HookContext<'_>) -> Result<String, HookError> {
    let mut parser = PythonParser::new()?;
    let parsed = parser.parse_checked(source)?;

    let indent: String = match ctx.global.and_then(|global| global.indent.clone()) {
        Some(indent) => indent,
        None => ctx
            .kwarg("indent")
            .and_then(|value| value.as_str())
            .unwrap_or(DEFAULT_INDENT)
            .to_owned(),
    };
    let line_length = ctx
        .global
        .map(GlobalConfig::line_length)
        .unwrap_or(DEFAULT_LINE_LENGTH);

    let mut targets = Vec::new();
    collect(parsed.root_node(), false, source, &mut targets);

    let mut rewriter = Rewriter::new(source);
    for target in targets {
        if target.span.is_sentinel() {
            continue;
        }
        let line_offset = source[line_start(source, target.span.start)..target.span.start]
            .chars()
            .count();
        let formatted = target
            .generic
            .format(line_offset, line_length, &indent);
        let replacement = if target.in_class && formatted.contains('\n') {
            // Continuation lines of a class-level annotation sit one more
            // level in than the annotation itself.
            let mut lines = formatted.lines();
            let first = lines.next().unwrap_or_default().to_owned();
            let rest = lines
                .map(|line| format!("{indent}{line}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{first}\n{rest}")
        } else {
            formatted
        };
        if replacement != rewriter.text_at(target.span) {
            rewriter.record(target.span, replacement);
        }
    }

    Ok(rewriter.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookContext;

    fn run(source: &str) -> String {
        reformat_generics(source, &HookContext::empty()).unwrap()
    }

    #[test]
    fn short_annotation_stays_flat() {
        let source = "x: Union[int, str] = 1\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn long_union_breaks_one_element_per_line() {
        let elements: Vec<String> = (0..12).map(|i| format!("TypeNumber{i}")).collect();
        let source = format!("x: Union[{}] = 1\n", elements.join(", "));
        let expected = format!(
            "x: Union[\n{}\n\t] = 1\n",
            elements
                .iter()
                .map(|e| format!("\t{e}"))
                .collect::<Vec<_>>()
                .join(",\n")
        );
        assert_eq!(run(&source), expected);
    }

    #[test]
    fn type_alias_assignment_breaks_like_an_annotation() {
        let elements: Vec<String> = (0..12).map(|i| format!("TypeNumber{i}")).collect();
        let source = format!("MyAlias = Union[{}]\n", elements.join(", "));
        let expected = format!(
            "MyAlias = Union[\n{}\n\t]\n",
            elements
                .iter()
                .map(|e| format!("\t{e}"))
                .collect::<Vec<_>>()
                .join(",\n")
        );
        assert_eq!(run(&source), expected);
    }

    #[test]
    fn nested_generic_breaks_recursively() {
        let inner: Vec<String> = (0..12).map(|i| format!("InnerType{i}")).collect();
        let source = format!("x: Optional[Union[{}]] = None\n", inner.join(", "));
        let result = run(&source);
        assert!(result.starts_with("x: Optional[\n\tUnion[\n"));
        assert!(result.contains("\t\tInnerType0,\n"));
    }

    #[test]
    fn callable_list_parameter_is_preserved() {
        let source = "f: Callable[[int, str], None] = g\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn class_body_annotation_gets_extra_indent() {
        let elements: Vec<String> = (0..12).map(|i| format!("TypeNumber{i}")).collect();
        let source = format!("class C:\n\tx: Union[{}]\n", elements.join(", "));
        let result = run(&source);
        assert!(result.starts_with("class C:\n\tx: Union[\n\t\tTypeNumber0,\n"));
        assert!(result.ends_with("\t\t]\n"));
    }

    #[test]
    fn function_signatures_are_left_alone() {
        let elements: Vec<String> = (0..12).map(|i| format!("TypeNumber{i}")).collect();
        let source = format!(
            "def f(x: Union[{}]) -> None:\n\treturn\n",
            elements.join(", ")
        );
        assert_eq!(run(&source), source);
    }

    #[test]
    fn pep604_union_is_left_alone() {
        let source = format!(
            "x: Dict[str, {}] = {{}}\n",
            (0..12)
                .map(|i| format!("TypeNumber{i}"))
                .collect::<Vec<_>>()
                .join(" | ")
        );
        assert_eq!(run(&source), source);
    }

    #[test]
    fn qualified_typing_name_is_recognized() {
        let source = "x: typing.Union[int, str] = 1\n";
        assert_eq!(run(source), source);
        let elements: Vec<String> = (0..12).map(|i| format!("TypeNumber{i}")).collect();
        let long = format!("x: typing.Union[{}] = 1\n", elements.join(", "));
        assert!(run(&long).starts_with("x: typing.Union[\n\tTypeNumber0,\n"));
    }

    #[test]
    fn custom_line_length_and_indent() {
        let global = GlobalConfig {
            indent: Some("    ".to_owned()),
            line_length: Some(20),
            extra: Default::default(),
        };
        let ctx = HookContext {
            filename: None,
            global: Some(&global),
            args: &[],
            kwargs: None,
        };
        let result =
            reformat_generics("x: Union[SomeLongName, AnotherName] = 1\n", &ctx).unwrap();
        assert_eq!(
            result,
            "x: Union[\n    SomeLongName,\n    AnotherName\n    ] = 1\n"
        );
    }

    #[test]
    fn string_literal_element_is_normalized_to_double_quotes() {
        let elements: Vec<String> = (0..11).map(|i| format!("TypeNumber{i}")).collect();
        let source = format!("x: Union[{}, 'Forward'] = 1\n", elements.join(", "));
        let result = run(&source);
        assert!(result.ends_with("\t\"Forward\"\n\t] = 1\n"));
    }

    #[test]
    fn idempotent() {
        let elements: Vec<String> = (0..12).map(|i| format!("TypeNumber{i}")).collect();
        let source = format!("x: Union[{}] = 1\n", elements.join(", "));
        let once = run(&source);
        assert_eq!(run(&once), once);
    }
}
