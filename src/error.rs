//! Error type. More variants than the five error kinds callers actually
//! need to branch on, but every variant maps onto exactly one of those
//! five kinds via [`LispError::kind`].

use thiserror::Error;

/// The closed set of error kinds. A caller that only cares about category
/// (to decide "abort this form, keep reading the file" vs. something else)
/// should match on `kind()`, not on the `LispError` variant directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Unbound,
    Args,
    Type,
    File,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LispError {
    #[error("unexpected end of input while reading")]
    UnexpectedEof,

    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    #[error("malformed dotted pair: '.' may appear at most once and not as the first element")]
    MalformedDottedPair,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unbound symbol: {0}")]
    Unbound(String),

    #[error("{function}: expected {expected} argument(s), got {actual}")]
    Arity {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual}")]
    WrongType {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("{0} is not callable")]
    NotCallable(String),

    #[error("invalid special form: {0}")]
    InvalidForm(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("file error: {0}")]
    File(String),

    #[error("system error: {0}")]
    System(String),
}

impl LispError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LispError::UnexpectedEof
            | LispError::UnexpectedChar(_)
            | LispError::MalformedDottedPair
            | LispError::UnterminatedString => ErrorKind::Syntax,
            LispError::Unbound(_) => ErrorKind::Unbound,
            LispError::Arity { .. } => ErrorKind::Args,
            LispError::WrongType { .. } | LispError::NotCallable(_) | LispError::InvalidForm(_) => {
                ErrorKind::Type
            }
            LispError::DivisionByZero => ErrorKind::Type,
            LispError::File(_) | LispError::System(_) => ErrorKind::File,
        }
    }

    pub fn arity(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        LispError::Arity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn wrong_type(function: &str, expected: impl Into<String>, actual: &str) -> Self {
        LispError::WrongType {
            function: function.to_string(),
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }
}
