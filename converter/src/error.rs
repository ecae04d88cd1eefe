use std::io;

use codespan_reporting::diagnostic::Diagnostic;
use nsc::ErrorKind;
use nsc::digits::StoreError;
use nsc::parser::ParseError;
use nsc::parser::error::kind_diagnostic;
use thiserror::Error;

/// Any failure of the parse, convert, print pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("conversion ran out of memory: {0}")]
    Store(#[from] StoreError),

    #[error("cannot write output: {0}")]
    Write(#[source] io::Error),
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Parse(error) => error.kind(),
            ConvertError::Store(_) => ErrorKind::OutOfMemory,
            ConvertError::Write(_) => ErrorKind::Unknown,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        self.kind().ordinal()
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        match self {
            ConvertError::Parse(error) => error.to_diagnostic(),
            other => kind_diagnostic(other.kind(), other.to_string()),
        }
    }
}
