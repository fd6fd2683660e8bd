//! Hook registry and the calling contract shared by every rewrite pass.
//!
//! A hook is a whole-text transformer: full source in, full source out. Tree
//! passes, plain regex passes, and (in principle) external reformatting
//! engines all satisfy the same contract, which is what lets the pipeline
//! compose them freely. Each registered hook carries a capability descriptor
//! saying which optional context it wants injected; the pipeline supplies
//! only what is declared.

pub mod ellipses;
pub mod generics;
pub mod imports;
pub mod quotes;
pub mod stubs;

use crate::config::GlobalConfig;
use crate::patch::PatchError;
use crate::py::ParseError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub type Args = Vec<Value>;
pub type Kwargs = serde_json::Map<String, Value>;

/// Failure inside one hook invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Which optional context a hook wants injected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub wants_filename: bool,
    pub wants_global_config: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        wants_filename: false,
        wants_global_config: false,
    };
    pub const FILENAME: Capabilities = Capabilities {
        wants_filename: true,
        wants_global_config: false,
    };
    pub const GLOBAL_CONFIG: Capabilities = Capabilities {
        wants_filename: false,
        wants_global_config: true,
    };
}

/// Context handed to a hook invocation. `filename` and `global` are `Some`
/// only if the hook's capability descriptor asked for them.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub filename: Option<&'a Path>,
    pub global: Option<&'a GlobalConfig>,
    pub args: &'a [Value],
    pub kwargs: Option<&'a Kwargs>,
}

impl HookContext<'_> {
    pub fn empty() -> HookContext<'static> {
        HookContext {
            filename: None,
            global: None,
            args: &[],
            kwargs: None,
        }
    }

    pub fn kwarg(&self, key: &str) -> Option<&Value> {
        self.kwargs.and_then(|kwargs| kwargs.get(key))
    }
}

/// The hook function contract: full text in, full text out.
pub type HookFn = fn(&str, &HookContext<'_>) -> Result<String, HookError>;

/// A hook implementation with its capability descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Registered {
    pub func: HookFn,
    pub caps: Capabilities,
}

/// Normalize a hook name: lowercase, with runs of `-`, `_` and `.` collapsed
/// to a single hyphen.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !prev_sep {
                out.push('-');
            }
            prev_sep = true;
        } else {
            out.extend(c.to_lowercase());
            prev_sep = false;
        }
    }
    out
}

/// Raised when a configured hook name has no registered implementation.
#[derive(Debug, Clone)]
pub struct HookNotFoundError {
    pub name: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for HookNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no such hook '{}'", self.name)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "; did you mean '{suggestion}'?")?;
        }
        Ok(())
    }
}

impl std::error::Error for HookNotFoundError {}

/// Explicit registration table mapping normalized hook names to
/// implementations. Built once at startup; the pipeline never needs
/// reflection, only this lookup.
#[derive(Default)]
pub struct Registry {
    table: HashMap<String, Registered>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with all built-in passes.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("dynamic-quotes", quotes::dynamic_quotes, Capabilities::NONE);
        registry.register(
            "ellipsis-reformat",
            ellipses::ellipsis_reformat,
            Capabilities::NONE,
        );
        registry.register(
            "collections-import-rewrite",
            imports::rewrite_collections_abc_imports,
            Capabilities::NONE,
        );
        registry.register(
            "reformat-generics",
            generics::reformat_generics,
            Capabilities::GLOBAL_CONFIG,
        );
        registry.register("noqa-reformat", stubs::noqa_reformat, Capabilities::NONE);
        registry.register("check-ast", stubs::check_ast, Capabilities::NONE);
        registry.register("squish-stubs", stubs::squish_stubs, Capabilities::FILENAME);
        registry
    }

    pub fn register(&mut self, name: &str, func: HookFn, caps: Capabilities) {
        self.table.insert(normalize(name), Registered { func, caps });
    }

    /// Look up a hook by (already or not yet normalized) name.
    pub fn get(&self, name: &str) -> Option<Registered> {
        self.table.get(&normalize(name)).copied()
    }

    /// Look up a hook, producing a not-found error with a closest-name
    /// suggestion on failure.
    pub fn resolve(&self, name: &str) -> Result<Registered, HookNotFoundError> {
        let normalized = normalize(name);
        self.get(&normalized).ok_or_else(|| HookNotFoundError {
            suggestion: self.suggest(&normalized),
            name: normalized,
        })
    }

    /// Closest registered name by Jaro-Winkler similarity, if any is close
    /// enough to be a plausible typo.
    pub fn suggest(&self, name: &str) -> Option<String> {
        self.table
            .keys()
            .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
            .filter(|(score, _)| *score >= 0.8)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate.clone())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize("Dynamic_Quotes"), "dynamic-quotes");
        assert_eq!(normalize("noqa..reformat"), "noqa-reformat");
        assert_eq!(normalize("reformat-generics"), "reformat-generics");
    }

    #[test]
    fn builtin_registry_resolves_all_passes() {
        let registry = Registry::builtin();
        for name in [
            "dynamic-quotes",
            "ellipsis-reformat",
            "collections-import-rewrite",
            "reformat-generics",
            "noqa-reformat",
            "check-ast",
            "squish-stubs",
        ] {
            assert!(registry.get(name).is_some(), "missing builtin hook {name}");
        }
    }

    #[test]
    fn lookup_normalizes_names() {
        let registry = Registry::builtin();
        assert!(registry.get("Dynamic_Quotes").is_some());
        assert!(registry.get("ellipsis_reformat").is_some());
    }

    #[test]
    fn unknown_hook_gets_a_suggestion() {
        let registry = Registry::builtin();
        let err = registry.resolve("dynamic-quote").unwrap_err();
        assert_eq!(err.suggestion.as_deref(), Some("dynamic-quotes"));
        assert!(err.to_string().contains("did you mean"));
    }

    #[test]
    fn wildly_wrong_name_gets_no_suggestion() {
        let registry = Registry::builtin();
        let err = registry.resolve("zzzzzzzz").unwrap_err();
        assert!(err.suggestion.is_none());
    }

    #[test]
    fn capability_flags_are_registered() {
        let registry = Registry::builtin();
        assert!(registry.get("squish-stubs").unwrap().caps.wants_filename);
        assert!(
            registry
                .get("reformat-generics")
                .unwrap()
                .caps
                .wants_global_config
        );
        assert_eq!(registry.get("dynamic-quotes").unwrap().caps, Capabilities::NONE);
    }
}
