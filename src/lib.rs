//! Remate: a pluggable source-code reformatter for Python.
//!
//! All rewriting compiles down to a single primitive: a byte-span
//! [`Replacement`](patch::Replacement) against the original text. Each
//! configured hook parses the source with tree-sitter, records the spans
//! it wants replaced, and the applier splices them back in one bottom-up
//! pass, leaving every untouched byte exactly as it was.
//!
//! # Architecture
//!
//! - [`patch`]: spans, the replacement ledger, and the splicing applier
//! - [`py`]: the tree-sitter Python wrapper and span locator
//! - [`hooks`]: the built-in rewrite passes and the name registry
//! - [`config`]: the TOML configuration schema and loader
//! - [`pipeline`]: resolving configured hooks and running them over files
//!
//! # Example
//!
//! ```
//! use remate::config::load_from_str;
//! use remate::hooks::Registry;
//! use remate::pipeline::{parse_hooks, Reformatter};
//!
//! let config = load_from_str("[hooks]\ndynamic-quotes = 10\n")?;
//! let hooks = parse_hooks(&config, &Registry::builtin())?;
//!
//! let mut reformatter =
//!     Reformatter::from_source("example.py", hooks, "x = 'hello world'\n".into());
//! assert!(reformatter.run()?);
//! assert_eq!(reformatter.reformatted(), Some("x = \"hello world\"\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod hooks;
pub mod patch;
pub mod pipeline;
pub mod py;
pub mod rewrite;

pub use config::{load_from_path, load_from_str, ConfigError, GlobalConfig, RemateConfig};
pub use hooks::{HookError, HookNotFoundError, Registry};
pub use patch::{PatchError, Replacement, Span};
pub use pipeline::{call_hooks, parse_hooks, Hook, ReformatError, Reformatter};
pub use py::ParseError;
pub use rewrite::Rewriter;
