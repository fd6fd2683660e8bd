use crate::hooks::{normalize, Args, Kwargs};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

pub const DEFAULT_PRIORITY: i64 = 10;
pub const DEFAULT_INDENT: &str = "\t";
pub const DEFAULT_LINE_LENGTH: usize = 110;

/// The parsed configuration document: the `[hooks]` table (declaration order
/// preserved) and the `[config]` global settings table.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RemateConfig {
    #[serde(default)]
    pub hooks: IndexMap<String, HookSpec>,
    #[serde(default)]
    pub config: GlobalConfig,
}

impl RemateConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (name, spec) in &self.hooks {
            let normalized = normalize(name);
            if normalized.is_empty() {
                issues.push(ValidationIssue::EmptyHookName);
            } else if !seen.insert(normalized.clone()) {
                issues.push(ValidationIssue::DuplicateHook { name: normalized });
            }

            if let HookSpec::Expanded(expanded) = spec {
                for key in expanded.kwargs.keys() {
                    if key.trim().is_empty() {
                        issues.push(ValidationIssue::EmptyKwargKey {
                            hook: normalize(name),
                        });
                    }
                }
            }
        }

        if let Some(indent) = &self.config.indent {
            if !indent.chars().all(|c| c == ' ' || c == '\t') {
                issues.push(ValidationIssue::InvalidIndent {
                    indent: indent.clone(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// A `[hooks]` entry: either a bare priority integer or the expanded form
/// with priority, positional args and kwargs.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum HookSpec {
    Priority(i64),
    Expanded(ExpandedHook),
}

impl HookSpec {
    pub fn priority(&self) -> i64 {
        match self {
            HookSpec::Priority(priority) => *priority,
            HookSpec::Expanded(expanded) => expanded.priority,
        }
    }

    pub fn args(&self) -> &[serde_json::Value] {
        match self {
            HookSpec::Priority(_) => &[],
            HookSpec::Expanded(expanded) => &expanded.args,
        }
    }

    pub fn kwargs(&self) -> Option<&Kwargs> {
        match self {
            HookSpec::Priority(_) => None,
            HookSpec::Expanded(expanded) => Some(&expanded.kwargs),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExpandedHook {
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub args: Args,
    #[serde(default)]
    pub kwargs: Kwargs,
}

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

/// The `[config]` table: a read-only view handed to hooks that declare the
/// wants-global-config capability. Known keys get typed accessors; anything
/// else is kept in `extra` for hooks to interpret as they wish.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct GlobalConfig {
    #[serde(default)]
    pub indent: Option<String>,
    #[serde(default)]
    pub line_length: Option<usize>,
    #[serde(flatten)]
    pub extra: Kwargs,
}

impl GlobalConfig {
    pub fn indent_unit(&self) -> &str {
        self.indent.as_deref().unwrap_or(DEFAULT_INDENT)
    }

    pub fn line_length(&self) -> usize {
        self.line_length.unwrap_or(DEFAULT_LINE_LENGTH)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyHookName,
    DuplicateHook { name: String },
    EmptyKwargKey { hook: String },
    InvalidIndent { indent: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyHookName => write!(f, "hook with empty name"),
            ValidationIssue::DuplicateHook { name } => {
                write!(f, "hook '{name}' is configured more than once")
            }
            ValidationIssue::EmptyKwargKey { hook } => {
                write!(f, "hook '{hook}' has a kwarg with an empty key")
            }
            ValidationIssue::InvalidIndent { indent } => {
                write!(f, "config.indent must be spaces or tabs, got {indent:?}")
            }
        }
    }
}
