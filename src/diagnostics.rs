use std::fmt;

use thiserror::Error;

/// Classification of a diagnostic event. Diagnostics are accumulated as
/// data in the session's errors register; they never interrupt execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lex,
    Parse,
    Resolution,
    Runtime,
}

/// A single accumulated diagnostic. Surfaced to the embedding host as plain
/// text: no severity grading, no error codes, no source positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn lex(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Lex, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Parse, message)
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Resolution, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Runtime, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

/// Unified error type for the Brief toolchain. Engine-level problems travel
/// through the errors register as `Diagnostic` values; this enum covers the
/// host-level failures of the binary and REPL.
#[derive(Debug, Error)]
pub enum BriefError {
    #[error("{0}")]
    Diagnostic(#[from] Diagnostic),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BriefError>;
