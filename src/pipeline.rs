//! Running a configured chain of hooks over one file: resolving the
//! configured hook names, ordering by priority, threading the text through
//! each hook, and writing the result back atomically.

use crate::config::{GlobalConfig, RemateConfig};
use crate::hooks::{
    normalize, Args, Capabilities, HookContext, HookError, HookFn, HookNotFoundError, Kwargs,
    Registry,
};
use crate::py::ParseError;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// A configured, resolved hook: the implementation plus everything the
/// configuration said about it.
#[derive(Debug, Clone)]
pub struct Hook {
    pub name: String,
    pub priority: i64,
    args: Args,
    kwargs: Option<Kwargs>,
    func: HookFn,
    caps: Capabilities,
    global: Arc<GlobalConfig>,
}

impl Hook {
    /// Invoke the hook on `source`. Only the capabilities the hook declared
    /// are passed through; everything else stays `None`.
    pub fn call(&self, source: &str, filename: &Path) -> Result<String, HookError> {
        let ctx = HookContext {
            filename: self.caps.wants_filename.then_some(filename),
            global: self.caps.wants_global_config.then_some(&*self.global),
            args: &self.args,
            kwargs: self.kwargs.as_ref(),
        };
        (self.func)(source, &ctx)
    }
}

/// Resolve the configured hook names against `registry` and order the
/// result by ascending priority. Hooks with equal priority keep their
/// declaration order. An unknown name fails the whole resolution.
pub fn parse_hooks(
    config: &RemateConfig,
    registry: &Registry,
) -> Result<Vec<Hook>, HookNotFoundError> {
    let global = Arc::new(config.config.clone());
    let mut hooks = Vec::with_capacity(config.hooks.len());
    for (name, spec) in &config.hooks {
        let registered = registry.resolve(name)?;
        hooks.push(Hook {
            name: normalize(name),
            priority: spec.priority(),
            args: spec.args().to_vec(),
            kwargs: spec.kwargs().cloned(),
            func: registered.func,
            caps: registered.caps,
            global: Arc::clone(&global),
        });
    }
    hooks.sort_by_key(|hook| hook.priority);
    Ok(hooks)
}

/// Thread `source` through `hooks` in order.
pub fn call_hooks(
    hooks: &[Hook],
    source: &str,
    filename: &Path,
) -> Result<String, ReformatError> {
    let mut text = source.to_owned();
    for hook in hooks {
        text = hook
            .call(&text, filename)
            .map_err(|source| ReformatError::Hook {
                filename: filename.to_path_buf(),
                hook: hook.name.clone(),
                source,
            })?;
    }
    Ok(text)
}

#[derive(Error, Debug)]
pub enum ReformatError {
    #[error("{}: hook '{hook}' failed: {source}", filename.display())]
    Hook {
        filename: PathBuf,
        hook: String,
        #[source]
        source: HookError,
    },

    #[error("failed to read {}: {source}", filename.display())]
    Read {
        filename: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", filename.display())]
    Write {
        filename: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReformatError {
    /// Whether this failure is a syntax error in the input file (reported
    /// with its own exit status) rather than an I/O or hook problem.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            ReformatError::Hook {
                source: HookError::Parse(ParseError::Syntax { .. }),
                ..
            }
        )
    }
}

/// One file's reformat run: read, thread through the hooks, normalize the
/// trailing newline, and optionally diff or write back.
#[derive(Debug)]
pub struct Reformatter {
    filename: PathBuf,
    hooks: Vec<Hook>,
    original: String,
    reformatted: Option<String>,
}

impl Reformatter {
    pub fn new(filename: impl Into<PathBuf>, hooks: Vec<Hook>) -> Result<Self, ReformatError> {
        let filename = filename.into();
        let original = fs::read_to_string(&filename).map_err(|source| ReformatError::Read {
            filename: filename.clone(),
            source,
        })?;
        Ok(Self::from_source(filename, hooks, original))
    }

    /// Build a reformatter over in-memory text (`filename` is still used
    /// for messages and filename-aware hooks).
    pub fn from_source(filename: impl Into<PathBuf>, hooks: Vec<Hook>, source: String) -> Self {
        Self {
            filename: filename.into(),
            hooks,
            original: source,
            reformatted: None,
        }
    }

    /// Run every hook. Returns whether the text changed.
    pub fn run(&mut self) -> Result<bool, ReformatError> {
        let text = call_hooks(&self.hooks, &self.original, &self.filename)?;
        let text = ensure_trailing_newline(&text);
        let changed = text != self.original;
        self.reformatted = Some(text);
        Ok(changed)
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// The reformatted text; `None` before [`Reformatter::run`].
    pub fn reformatted(&self) -> Option<&str> {
        self.reformatted.as_deref()
    }

    /// Colorized unified diff between the original and reformatted text.
    pub fn diff(&self) -> String {
        let Some(reformatted) = &self.reformatted else {
            return String::new();
        };
        let mut out = String::new();
        out.push_str(&format!(
            "{}\n",
            format!("--- {} (original)", self.filename.display()).dimmed()
        ));
        out.push_str(&format!(
            "{}\n",
            format!("+++ {} (reformatted)", self.filename.display()).dimmed()
        ));

        let diff = TextDiff::from_lines(&self.original, reformatted);
        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => format!("-{change}").red(),
                ChangeTag::Insert => format!("+{change}").green(),
                ChangeTag::Equal => format!(" {change}").normal(),
            };
            out.push_str(&sign.to_string());
        }
        out
    }

    /// Write the reformatted text back to the file atomically. A no-op if
    /// [`Reformatter::run`] has not produced output yet.
    pub fn write(&self) -> Result<(), ReformatError> {
        let Some(reformatted) = &self.reformatted else {
            return Ok(());
        };
        atomic_write(&self.filename, reformatted.as_bytes()).map_err(|source| {
            ReformatError::Write {
                filename: self.filename.clone(),
                source,
            }
        })
    }
}

/// Drop trailing blank lines and end the text with exactly one newline.
/// Whitespace-only input collapses to the empty string.
fn ensure_trailing_newline(text: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    lines.push("");
    lines.join("\n")
}

/// Atomic file write: tempfile in the same directory + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp = match parent {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    filetime::set_file_mtime(path, filetime::FileTime::now())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_str;

    fn hooks_from(toml: &str) -> Vec<Hook> {
        let config = load_from_str(toml).unwrap();
        parse_hooks(&config, &Registry::builtin()).unwrap()
    }

    #[test]
    fn hooks_sort_by_priority_keeping_declaration_order_for_ties() {
        let hooks = hooks_from(
            "[hooks]\n\
             reformat-generics = 40\n\
             dynamic-quotes = 10\n\
             ellipsis-reformat = 10\n\
             check-ast = 5\n",
        );
        let names: Vec<&str> = hooks.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "check-ast",
                "dynamic-quotes",
                "ellipsis-reformat",
                "reformat-generics"
            ]
        );
    }

    #[test]
    fn unknown_hook_fails_resolution() {
        let config = load_from_str("[hooks]\ndynamic_quoting = 10\n").unwrap();
        let err = parse_hooks(&config, &Registry::builtin()).unwrap_err();
        assert_eq!(err.name, "dynamic-quoting");
        assert_eq!(err.suggestion.as_deref(), Some("dynamic-quotes"));
    }

    #[test]
    fn call_hooks_threads_text_through_the_chain() {
        let hooks = hooks_from(
            "[hooks]\n\
             dynamic-quotes = 10\n\
             ellipsis-reformat = 20\n",
        );
        let source = "x = 'hello world'\ndef f():\n    ...\n";
        let result = call_hooks(&hooks, source, Path::new("example.py")).unwrap();
        assert_eq!(result, "x = \"hello world\"\ndef f(): ...\n");
    }

    #[test]
    fn syntax_error_is_classified() {
        let hooks = hooks_from("[hooks]\ncheck-ast = 10\n");
        let err = call_hooks(&hooks, "def f(:\n", Path::new("bad.py")).unwrap_err();
        assert!(err.is_syntax_error());
        assert!(err.to_string().contains("bad.py"));
    }

    #[test]
    fn run_reports_changed() {
        let hooks = hooks_from("[hooks]\ndynamic-quotes = 10\n");
        let mut reformatter =
            Reformatter::from_source("t.py", hooks, "x = 'hello world'\n".to_owned());
        assert!(reformatter.run().unwrap());
        assert_eq!(
            reformatter.reformatted(),
            Some("x = \"hello world\"\n")
        );
    }

    #[test]
    fn run_reports_unchanged() {
        let hooks = hooks_from("[hooks]\ndynamic-quotes = 10\n");
        let mut reformatter =
            Reformatter::from_source("t.py", hooks, "x = \"hello world\"\n".to_owned());
        assert!(!reformatter.run().unwrap());
    }

    #[test]
    fn trailing_newline_is_normalized() {
        assert_eq!(ensure_trailing_newline("x = 1"), "x = 1\n");
        assert_eq!(ensure_trailing_newline("x = 1\n\n\n"), "x = 1\n");
        assert_eq!(ensure_trailing_newline("x = 1\n"), "x = 1\n");
        assert_eq!(ensure_trailing_newline(""), "");
        assert_eq!(ensure_trailing_newline("\n\n  \n"), "");
    }

    #[test]
    fn write_round_trips_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("module.py");
        fs::write(&path, "x = 'hello world'\n").unwrap();

        let hooks = hooks_from("[hooks]\ndynamic-quotes = 10\n");
        let mut reformatter = Reformatter::new(&path, hooks).unwrap();
        assert!(reformatter.run().unwrap());
        reformatter.write().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "x = \"hello world\"\n");
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = Reformatter::new("/no/such/file.py", Vec::new()).unwrap_err();
        assert!(matches!(err, ReformatError::Read { .. }));
    }
}
