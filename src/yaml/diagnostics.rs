//! Positioned YAML error types

use thiserror::Error;

/// Errors from reading or parsing a YAML file
#[derive(Debug, Error)]
pub enum YamlError {
    #[error(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A YAML syntax or shape error with file position attached
#[derive(Debug, Error)]
#[error("{filename}:{line}:{column}: {message}")]
pub struct YamlSyntaxError {
    pub filename: String,
    /// 1-based line, 0 when the parser gave no location
    pub line: usize,
    /// 1-based column, 0 when the parser gave no location
    pub column: usize,
    pub message: String,
    /// The offending source line, when locatable
    pub snippet: Option<String>,
}

impl YamlSyntaxError {
    /// Build a positioned error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((0, 0));

        let snippet = if line > 0 {
            content.lines().nth(line - 1).map(|l| l.to_string())
        } else {
            None
        };

        Self {
            filename: filename.to_string(),
            line,
            column,
            message: err.to_string(),
            snippet,
        }
    }
}
