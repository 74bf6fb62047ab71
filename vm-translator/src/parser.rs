//! Parser module for VM source files.
//!
//! Normalizes the input into non-empty, comment-free lines, then splits
//! each command into at most three whitespace-separated fields:
//! `op [arg1 [arg2]]`. Command classification goes through a compile-time
//! perfect hash map.

use phf::phf_map;

use crate::error::VmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

/// First-word classification for every VM operation.
static COMMAND_TYPES: phf::Map<&'static str, CommandType> = phf_map! {
    "add" => CommandType::Arithmetic,
    "sub" => CommandType::Arithmetic,
    "neg" => CommandType::Arithmetic,
    "eq" => CommandType::Arithmetic,
    "gt" => CommandType::Arithmetic,
    "lt" => CommandType::Arithmetic,
    "and" => CommandType::Arithmetic,
    "or" => CommandType::Arithmetic,
    "not" => CommandType::Arithmetic,
    "shiftleft" => CommandType::Arithmetic,
    "shiftright" => CommandType::Arithmetic,
    "push" => CommandType::Push,
    "pop" => CommandType::Pop,
    "label" => CommandType::Label,
    "goto" => CommandType::Goto,
    "if-goto" => CommandType::If,
    "function" => CommandType::Function,
    "call" => CommandType::Call,
    "return" => CommandType::Return,
};

struct Command {
    number: usize,
    text: String,
}

/// Streaming parser over the commands of one `.vm` file.
pub struct Parser {
    commands: Vec<Command>,
    cursor: usize,
    parts: Vec<String>,
    number: usize,
}

impl Parser {
    /// Prepares a parser over the given source text. Comments (`//` to end
    /// of line) and blank lines are dropped here.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let commands = source
            .lines()
            .enumerate()
            .filter_map(|(index, raw)| {
                let text = raw.find("//").map_or(raw, |pos| &raw[..pos]).trim();
                if text.is_empty() {
                    None
                } else {
                    Some(Command {
                        number: index + 1,
                        text: text.to_string(),
                    })
                }
            })
            .collect();

        Self {
            commands,
            cursor: 0,
            parts: Vec::new(),
            number: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn has_more_commands(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Makes the next command current. Call only while
    /// [`Parser::has_more_commands`] is true.
    #[inline]
    pub fn advance(&mut self) {
        if self.has_more_commands() {
            let command = &self.commands[self.cursor];
            self.number = command.number;
            self.parts.clear();
            self.parts
                .extend(command.text.split_whitespace().map(str::to_string));
            self.cursor += 1;
        }
    }

    /// 1-based source line number of the current command.
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.number
    }

    #[inline]
    pub fn command_type(&self) -> Result<CommandType, VmError> {
        let op = self
            .parts
            .first()
            .ok_or(VmError::InvalidState("no current command"))?;
        COMMAND_TYPES
            .get(op.as_str())
            .copied()
            .ok_or_else(|| VmError::UnknownCommand {
                command: op.clone(),
                line: self.number,
            })
    }

    /// First argument of the current command. For arithmetic commands this
    /// is the operation itself; `return` takes no arguments.
    #[inline]
    pub fn arg1(&self) -> Result<&str, VmError> {
        match self.command_type()? {
            CommandType::Arithmetic => Ok(&self.parts[0]),
            CommandType::Return => Err(VmError::InvalidState("arg1() called on `return`")),
            _ => self
                .parts
                .get(1)
                .map(String::as_str)
                .ok_or(VmError::MissingArgument { line: self.number }),
        }
    }

    /// Second argument: the index of push/pop, the local count of
    /// `function`, the argument count of `call`.
    #[inline]
    pub fn arg2(&self) -> Result<u16, VmError> {
        match self.command_type()? {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                let argument = self
                    .parts
                    .get(2)
                    .ok_or(VmError::MissingArgument { line: self.number })?;
                argument.parse().map_err(|_| VmError::InvalidIndex {
                    argument: argument.clone(),
                    line: self.number,
                })
            }
            _ => Err(VmError::InvalidState(
                "arg2() called on a command without an index",
            )),
        }
    }
}
