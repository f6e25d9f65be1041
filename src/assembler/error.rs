//! Diagnostics produced while assembling a Hack source file.
//!
//! Every error carries the (1-based) source line it was raised on so the
//! driver can report all of them at once.
use thiserror::Error;

/// The broad class an [`Error`] belongs to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Encoding,
    Resolution,
    Capacity,
}

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    #[error("illegal character '{ch}' on line {line}")]
    IllegalCharacter { ch: char, line: usize },

    #[error("unexpected {found} on line {line}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        line: usize,
    },

    #[error("unexpected end of line {line}, expected {expected}")]
    UnexpectedEndOfLine { expected: &'static str, line: usize },

    #[error("`{expr}` on line {line} is not a valid comp expression")]
    InvalidComp { expr: String, line: usize },

    #[error("literal `{value}` on line {line} is not allowed in a comp expression (only 0, 1 and -1)")]
    InvalidLiteral { value: String, line: usize },

    #[error("address `{value}` on line {line} does not fit in 15 bits")]
    AddressOutOfRange { value: String, line: usize },

    #[error("label `{label}` on line {line} was already defined at ROM address {address}")]
    DuplicateLabel {
        label: String,
        address: u16,
        line: usize,
    },

    #[error("symbol `{symbol}` on line {line} was never resolved")]
    UnresolvedSymbol { symbol: String, line: usize },

    #[error("no free RAM address left for variable `{symbol}` on line {line}")]
    VariableSpaceExhausted { symbol: String, line: usize },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            IllegalCharacter { .. } => ErrorKind::Lexical,
            UnexpectedToken { .. } | UnexpectedEndOfLine { .. } => ErrorKind::Syntax,
            InvalidComp { .. } | InvalidLiteral { .. } | AddressOutOfRange { .. } => {
                ErrorKind::Encoding
            }
            DuplicateLabel { .. } | UnresolvedSymbol { .. } => ErrorKind::Resolution,
            VariableSpaceExhausted { .. } => ErrorKind::Capacity,
        }
    }

    /// The source line the error was raised on.
    pub fn line(&self) -> usize {
        use Error::*;
        match self {
            IllegalCharacter { line, .. }
            | UnexpectedToken { line, .. }
            | UnexpectedEndOfLine { line, .. }
            | InvalidComp { line, .. }
            | InvalidLiteral { line, .. }
            | AddressOutOfRange { line, .. }
            | DuplicateLabel { line, .. }
            | UnresolvedSymbol { line, .. }
            | VariableSpaceExhausted { line, .. } => *line,
        }
    }
}
