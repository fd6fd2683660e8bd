//! Configuration: TOML schema, validation, and loading.

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    ExpandedHook, GlobalConfig, HookSpec, RemateConfig, ValidationError, ValidationIssue,
    DEFAULT_INDENT, DEFAULT_LINE_LENGTH, DEFAULT_PRIORITY,
};
