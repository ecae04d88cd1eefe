use std::io;

use codespan_reporting::diagnostic::Diagnostic;
use thiserror::Error;

use crate::digits::StoreError;
use crate::error::ErrorKind;

/// Failures while reading and validating the wire format.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read input: {0}")]
    Read(#[source] io::Error),

    #[error("malformed input at byte {offset}: {reason}")]
    Malformed { offset: u64, reason: String },

    #[error("input base {0} is outside 2-36")]
    InputBaseOutOfRange(u32),

    #[error("output base {0} is outside 2-36")]
    OutputBaseOutOfRange(u32),

    #[error("digit '{symbol}' at position {position} is not valid in base {base}")]
    InvalidDigitForBase {
        symbol: char,
        position: u64,
        base: u32,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ParseError {
    pub fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        ParseError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Read(_) => ErrorKind::ReadError,
            ParseError::Malformed { .. } => ErrorKind::MalformedInput,
            ParseError::InputBaseOutOfRange(_) => ErrorKind::InputBaseOutOfRange,
            ParseError::OutputBaseOutOfRange(_) => ErrorKind::OutputBaseOutOfRange,
            ParseError::InvalidDigitForBase { .. } => ErrorKind::InvalidDigitForBase,
            ParseError::Store(_) => ErrorKind::OutOfMemory,
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        kind_diagnostic(self.kind(), self.to_string())
    }
}

/// Diagnostic headed by the kind's table message, with the detail as a note.
pub fn kind_diagnostic(kind: ErrorKind, detail: String) -> Diagnostic<usize> {
    Diagnostic::error()
        .with_code(format!("E{:02}", kind.ordinal()))
        .with_message(kind.message())
        .with_notes(vec![detail])
}
