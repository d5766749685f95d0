use super::Format;
use thiserror::Error;

/// Input text that does not reduce to the CP2K input grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("unexpected input at line {line}, column {column}: {details}")]
    Unexpected {
        line: usize,
        column: usize,
        details: String,
    },

    #[error("section '&{expected}' closed by '&END {found}' at line {line}")]
    MismatchedEnd {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("section '&{name}' opened at line {line} is never closed")]
    Unclosed { line: usize, name: String },

    #[error("'&END' at line {line} does not close any open section")]
    StrayEnd { line: usize },
}

impl SyntaxError {
    pub fn unexpected(line: usize, column: usize, details: impl Into<String>) -> Self {
        Self::Unexpected {
            line,
            column,
            details: details.into(),
        }
    }

    /// Line the error was detected on.
    pub fn line(&self) -> usize {
        match self {
            Self::Unexpected { line, .. }
            | Self::MismatchedEnd { line, .. }
            | Self::Unclosed { line, .. }
            | Self::StrayEnd { line } => *line,
        }
    }
}

/// A tree that cannot be written back as CP2K input text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("cannot format '{key}': {details}")]
    Shape { key: String, details: String },

    #[error("no value supplied for template placeholder '{{{0}}}'")]
    MissingParameter(String),

    #[error("malformed template placeholder at byte {offset}: {details}")]
    Template { offset: usize, details: String },
}

impl FormatError {
    pub fn shape(key: &str, details: impl Into<String>) -> Self {
        Self::Shape {
            key: key.to_string(),
            details: details.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid CP2K input: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("cannot generate CP2K input: {0}")]
    Format(#[from] FormatError),

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error(
        "frame {frame} declares {declared} atoms but {found} atom entries follow (at line ~{line})"
    )]
    CountMismatch {
        frame: usize,
        line: usize,
        declared: usize,
        found: usize,
    },

    #[error("frame {frame} has no MD step comment ('i = N, time = T, E = E'): {comment:?}")]
    StepComment { frame: usize, comment: String },

    #[error("invalid JSON input tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input dialect: {0}")]
    Dialect(#[from] toml::de::Error),
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }
}
