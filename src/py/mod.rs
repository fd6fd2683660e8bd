//! Python parsing: the tree-sitter wrapper, the span locator bridging tree
//! nodes to flat byte offsets, and string-literal helpers.

pub mod errors;
pub mod locator;
pub mod parser;
pub mod strings;

pub use errors::ParseError;
pub use locator::{is_docstring, locate, locate_through, sole_ellipsis_body, walk, NodeKind};
pub use parser::{ParsedSource, PythonParser};
