use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use regex::Regex;
use remate::config::load_from_path;
use remate::hooks::Registry;
use remate::pipeline::{parse_hooks, Hook, Reformatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "remate")]
#[command(about = "Configurable, pluggable reformatter for Python source files", long_about = None)]
struct Cli {
    /// Files or directories to reformat. Directories are searched
    /// recursively for `.py` and `.pyi` files.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Configuration file to load hooks and settings from.
    #[arg(short, long, default_value = "remate.toml")]
    config_file: PathBuf,

    /// Glob patterns of file names or paths to skip.
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Report which files would change without writing anything.
    #[arg(long)]
    check: bool,

    /// Suppress diffs and per-file messages.
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output.
    #[arg(long = "no-colour", alias = "no-color")]
    no_colour: bool,
}

// Exit status, strongest wins: syntax errors trump per-file failures,
// which trump "changes made".
const CHANGED: u8 = 1;
const FAILED: u8 = 2;
const SYNTAX_ERROR: u8 = 126;

fn merge_status(current: u8, new: u8) -> u8 {
    match (current, new) {
        (SYNTAX_ERROR, _) | (_, SYNTAX_ERROR) => SYNTAX_ERROR,
        (FAILED, _) | (_, FAILED) => FAILED,
        _ => current.max(new),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_colour {
        colored::control::set_override(false);
    }
    match run(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            eprintln!("{}", format!("{err:#}").red());
            ExitCode::from(FAILED)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let config = load_from_path(&cli.config_file)?;
    let hooks = parse_hooks(&config, &Registry::builtin())?;

    let excludes = compile_excludes(&cli.exclude)?;
    let files = collect_files(&cli.paths, &excludes);
    if files.is_empty() {
        eprintln!("{}", "No Python files to reformat".yellow());
        return Ok(0);
    }

    let mut status = 0u8;
    for file in &files {
        status = merge_status(status, reformat_file(file, hooks.clone(), cli));
    }
    Ok(status)
}

fn reformat_file(file: &Path, hooks: Vec<Hook>, cli: &Cli) -> u8 {
    let mut reformatter = match Reformatter::new(file, hooks) {
        Ok(reformatter) => reformatter,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            return FAILED;
        }
    };
    let changed = match reformatter.run() {
        Ok(changed) => changed,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            return if err.is_syntax_error() {
                SYNTAX_ERROR
            } else {
                FAILED
            };
        }
    };
    if !changed {
        return 0;
    }

    if !cli.quiet {
        if cli.check {
            println!(
                "{}",
                format!("{} would be reformatted", file.display()).yellow()
            );
        } else {
            println!("{}", format!("Reformatting {}", file.display()).yellow());
        }
        print!("{}", reformatter.diff());
    }
    if !cli.check {
        if let Err(err) = reformatter.write() {
            eprintln!("{}", err.to_string().red());
            return FAILED;
        }
    }
    CHANGED
}

fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "py" | "pyi"))
}

fn collect_files(paths: &[PathBuf], excludes: &[Regex]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                let candidate = entry.path();
                if entry.file_type().is_file()
                    && is_python_file(candidate)
                    && !is_excluded(candidate, excludes)
                {
                    files.push(candidate.to_path_buf());
                }
            }
        } else if !is_excluded(path, excludes) {
            files.push(path.clone());
        }
    }
    files.dedup();
    files
}

fn is_excluded(path: &Path, excludes: &[Regex]) -> bool {
    let full = path.to_string_lossy();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    excludes
        .iter()
        .any(|re| re.is_match(&full) || re.is_match(&name))
}

fn compile_excludes(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&glob_to_regex(pattern))
                .with_context(|| format!("invalid exclude pattern '{pattern}'"))
        })
        .collect()
}

/// Translate a shell-style glob into an anchored regex: `*` matches within
/// a path segment, `?` matches one character, everything else is literal.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}
