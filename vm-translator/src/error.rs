use std::fmt;
use std::io;

/// Errors surfaced while translating a VM program.
#[derive(Debug)]
pub enum VmError {
    Io(io::Error),
    /// The first word of a command is not a VM operation.
    UnknownCommand { command: String, line: usize },
    /// A command is missing a required argument.
    MissingArgument { line: usize },
    /// A numeric argument that does not parse as an unsigned index.
    InvalidIndex { argument: String, line: usize },
    /// A segment that does not exist, or an operation the segment does not
    /// support (e.g. `pop constant`).
    SegmentViolation { segment: String, line: usize },
    /// A parser accessor was called in a state that does not support it.
    InvalidState(&'static str),
}

impl std::error::Error for VmError {}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::UnknownCommand { command, line } => {
                write!(f, "line {line}: unknown VM command `{command}`")
            }
            Self::MissingArgument { line } => {
                write!(f, "line {line}: command is missing an argument")
            }
            Self::InvalidIndex { argument, line } => {
                write!(f, "line {line}: `{argument}` is not a valid index")
            }
            Self::SegmentViolation { segment, line } => {
                write!(f, "line {line}: invalid segment use `{segment}`")
            }
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl From<io::Error> for VmError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}
