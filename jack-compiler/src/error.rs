use std::fmt;
use std::io;

/// Errors surfaced while compiling a Jack class.
#[derive(Debug)]
pub enum JackError {
    Io(io::Error),
    /// A string constant whose closing `"` never arrives on the same line.
    UnterminatedString { line: usize },
    /// A `/*` comment with no matching `*/`.
    UnterminatedComment { line: usize },
    /// An integer constant outside 0..=32767.
    IntOutOfRange { literal: String, line: usize },
    /// A character that starts no Jack token.
    UnexpectedCharacter { character: char, line: usize },
    /// The parser met a token that does not fit the grammar here.
    UnexpectedToken {
        found: String,
        expected: &'static str,
        line: usize,
    },
    /// Input ended in the middle of a construct.
    UnexpectedEof,
    /// An identifier used as a variable without a declaration in scope.
    UnresolvedSymbol { name: String, line: usize },
}

impl std::error::Error for JackError {}

impl fmt::Display for JackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::UnterminatedString { line } => {
                write!(f, "line {line}: unterminated string constant")
            }
            Self::UnterminatedComment { line } => {
                write!(f, "line {line}: unterminated block comment")
            }
            Self::IntOutOfRange { literal, line } => {
                write!(f, "line {line}: integer constant `{literal}` exceeds 32767")
            }
            Self::UnexpectedCharacter { character, line } => {
                write!(f, "line {line}: unexpected character `{character}`")
            }
            Self::UnexpectedToken {
                found,
                expected,
                line,
            } => {
                write!(f, "line {line}: expected {expected}, found {found}")
            }
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnresolvedSymbol { name, line } => {
                write!(f, "line {line}: `{name}` is not defined in this scope")
            }
        }
    }
}

impl From<io::Error> for JackError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
