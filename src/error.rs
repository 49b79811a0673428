//! Error types for the translator.
//!
//! `TranspileError` carries a 1-based source line number and renders as
//! `"Line N: <message>"`, matching the fixed wire format the CLI writes to
//! stderr. `CliError` wraps it alongside the other failure categories so
//! `main` can map each to its exit code without string-sniffing.

use std::fmt;
use std::path::PathBuf;

/// An error raised while scanning or classifying a single source line.
///
/// The three variants correspond to the taxonomy used throughout the
/// translator's design: lexical issues (tabs, bad indentation), structural
/// issues (indent-stack mismatches), and syntactic issues (malformed
/// statements). All three render identically; the split exists so callers
/// can match on error category without parsing the message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranspileError {
    Lexical { line: usize, message: String },
    Structural { line: usize, message: String },
    Syntactic { line: usize, message: String },
}

impl TranspileError {
    pub fn lexical(line: usize, message: impl Into<String>) -> Self {
        TranspileError::Lexical {
            line,
            message: message.into(),
        }
    }

    pub fn structural(line: usize, message: impl Into<String>) -> Self {
        TranspileError::Structural {
            line,
            message: message.into(),
        }
    }

    pub fn syntactic(line: usize, message: impl Into<String>) -> Self {
        TranspileError::Syntactic {
            line,
            message: message.into(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            TranspileError::Lexical { line, .. }
            | TranspileError::Structural { line, .. }
            | TranspileError::Syntactic { line, .. } => *line,
        }
    }

    fn message(&self) -> &str {
        match self {
            TranspileError::Lexical { message, .. }
            | TranspileError::Structural { message, .. }
            | TranspileError::Syntactic { message, .. } => message,
        }
    }
}

impl fmt::Display for TranspileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line(), self.message())
    }
}

impl std::error::Error for TranspileError {}

/// Top-level failure categories, each mapped to a distinct process exit code
/// by the CLI driver (see `main.rs`).
#[derive(Debug)]
pub enum CliError {
    /// Bad CLI arguments or an input file that couldn't be found. Exit 1.
    Arg(String),
    /// Input file not found. Exit 1.
    InputNotFound(PathBuf),
    /// A source parse/transpile error. Exit 2.
    Parse(TranspileError),
    /// Output couldn't be written, or the downstream compiler failed to run
    /// or exited non-zero. Exit 3 (the compile-failure contract from the
    /// spec); I/O failures that precede a downstream compile are also
    /// surfaced here since they block the same step.
    Compile(String),
}

impl CliError {
    /// Exit code contract: 1 = argument/input error, 2 = parse error,
    /// 3 = downstream compile failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Arg(_) | CliError::InputNotFound(_) => 1,
            CliError::Parse(_) => 2,
            CliError::Compile(_) => 3,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Arg(msg) => write!(f, "{}", msg),
            CliError::InputNotFound(_) => write!(f, "Input file not found."),
            CliError::Parse(err) => write!(f, "{}", err),
            CliError::Compile(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<TranspileError> for CliError {
    fn from(err: TranspileError) -> Self {
        CliError::Parse(err)
    }
}
