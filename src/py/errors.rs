use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,

    /// The tree contains ERROR or missing nodes. Line and column are
    /// 1-based; the filename is attached by the pipeline, which is the only
    /// layer that knows it.
    #[error("invalid syntax at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}
