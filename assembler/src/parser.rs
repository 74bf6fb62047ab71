//! Parser module for Hack assembly source.
//!
//! Source text is normalized once up front ([`clean_lines`]) and the parser
//! then works zero-copy over the cleaned lines:
//! - All whitespace is stripped before comments are cut, so `D = M  // x`
//!   and `D=M` parse identically
//! - Byte-level command classification (first byte decides A/C/L)
//! - Accessors return slices into the cleaned line, no allocation

use crate::error::AsmError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandType {
    /// `@Xxx` where Xxx is either a symbol or a decimal number
    ACommand,
    /// `dest=comp;jump`
    CCommand,
    /// `(Xxx)` where Xxx is a symbol
    LCommand,
}

/// A cleaned source line together with its 1-based line number in the
/// original file, kept for error reporting.
#[derive(Debug, Clone)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

/// Normalizes raw source into command lines.
///
/// The order matters: every whitespace character is removed first, then the
/// line is truncated at the first `//`. Lines that end up empty are dropped.
#[must_use]
pub fn clean_lines(source: &str) -> Vec<Line> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            let text = match stripped.find("//") {
                Some(pos) => &stripped[..pos],
                None => stripped.as_str(),
            };
            if text.is_empty() {
                None
            } else {
                Some(Line {
                    number: index + 1,
                    text: text.to_string(),
                })
            }
        })
        .collect()
}

/// Streaming parser over cleaned assembly lines.
pub struct Parser<'a> {
    lines: std::slice::Iter<'a, Line>,
    current: &'a str,
    number: usize,
    kind: Option<CommandType>,
}

impl<'a> Parser<'a> {
    #[inline]
    #[must_use]
    pub fn from_lines(lines: &'a [Line]) -> Self {
        Self {
            lines: lines.iter(),
            current: "",
            number: 0,
            kind: None,
        }
    }

    /// Advances to the next command. Returns `false` once the input is
    /// exhausted.
    #[inline]
    pub fn advance(&mut self) -> bool {
        match self.lines.next() {
            Some(line) => {
                self.current = &line.text;
                self.number = line.number;
                self.kind = Some(Self::classify(&line.text));
                true
            }
            None => {
                self.kind = None;
                false
            }
        }
    }

    /// Classifies a command from its first byte. Cleaned lines are never
    /// empty, and all command-introducing characters are ASCII.
    #[inline]
    fn classify(line: &str) -> CommandType {
        match line.as_bytes()[0] {
            b'@' => CommandType::ACommand,
            b'(' => CommandType::LCommand,
            _ => CommandType::CCommand,
        }
    }

    #[inline]
    pub fn command_type(&self) -> Result<CommandType, AsmError> {
        self.kind.ok_or(AsmError::InvalidState("no current command"))
    }

    /// 1-based source line number of the current command.
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.number
    }

    /// Returns the symbol of an A-command (`@Xxx`) or L-command (`(Xxx)`).
    #[inline]
    pub fn symbol(&self) -> Result<&'a str, AsmError> {
        match self.kind {
            Some(CommandType::ACommand) => Ok(&self.current[1..]),
            Some(CommandType::LCommand) => Ok(&self.current[1..self.current.len() - 1]),
            Some(CommandType::CCommand) => {
                Err(AsmError::InvalidState("symbol() called on a C-command"))
            }
            None => Err(AsmError::InvalidState("no current command")),
        }
    }

    /// Returns the dest field of a C-command, empty when absent.
    #[inline]
    pub fn dest(&self) -> Result<&'a str, AsmError> {
        self.require_c("dest() called on a non-C command")?;
        Ok(self.current.find('=').map_or("", |pos| &self.current[..pos]))
    }

    /// Returns the comp field of a C-command.
    #[inline]
    pub fn comp(&self) -> Result<&'a str, AsmError> {
        self.require_c("comp() called on a non-C command")?;
        let start = self.current.find('=').map_or(0, |pos| pos + 1);
        let end = self.current.find(';').unwrap_or(self.current.len());
        Ok(&self.current[start..end])
    }

    /// Returns the jump field of a C-command, empty when absent.
    #[inline]
    pub fn jump(&self) -> Result<&'a str, AsmError> {
        self.require_c("jump() called on a non-C command")?;
        Ok(self
            .current
            .find(';')
            .map_or("", |pos| &self.current[pos + 1..]))
    }

    #[inline]
    fn require_c(&self, msg: &'static str) -> Result<(), AsmError> {
        match self.kind {
            Some(CommandType::CCommand) => Ok(()),
            Some(_) => Err(AsmError::InvalidState(msg)),
            None => Err(AsmError::InvalidState("no current command")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_lines_strips_whitespace_before_comments() {
        // `/ /` only becomes a comment marker after whitespace removal
        let lines = clean_lines("D = M  / / trailing");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "D=M");
    }

    #[test]
    fn test_clean_lines_drops_comments_and_blanks() {
        let lines = clean_lines("// header\n\n   \n@100\n  D=M // inline\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "@100");
        assert_eq!(lines[0].number, 4);
        assert_eq!(lines[1].text, "D=M");
        assert_eq!(lines[1].number, 5);
    }

    #[test]
    fn test_command_classification() {
        assert_eq!(Parser::classify("@100"), CommandType::ACommand);
        assert_eq!(Parser::classify("(LOOP)"), CommandType::LCommand);
        assert_eq!(Parser::classify("D=M"), CommandType::CCommand);
    }

    #[test]
    fn test_parser_advance() {
        let lines = clean_lines("// comment\n\n@100\nD=M // inline comment\n");
        let mut parser = Parser::from_lines(&lines);

        assert!(parser.advance());
        assert_eq!(parser.command_type().unwrap(), CommandType::ACommand);
        assert_eq!(parser.symbol().unwrap(), "100");

        assert!(parser.advance());
        assert_eq!(parser.command_type().unwrap(), CommandType::CCommand);
        assert_eq!(parser.dest().unwrap(), "D");
        assert_eq!(parser.comp().unwrap(), "M");

        assert!(!parser.advance());
        assert!(parser.command_type().is_err());
    }

    #[test]
    fn test_c_command_fields() {
        let lines = clean_lines("MD=D+1;JMP");
        let mut parser = Parser::from_lines(&lines);
        parser.advance();

        assert_eq!(parser.dest().unwrap(), "MD");
        assert_eq!(parser.comp().unwrap(), "D+1");
        assert_eq!(parser.jump().unwrap(), "JMP");
    }

    #[test]
    fn test_c_command_missing_fields() {
        let lines = clean_lines("D;JGT\nM=1");
        let mut parser = Parser::from_lines(&lines);

        parser.advance();
        assert_eq!(parser.dest().unwrap(), "");
        assert_eq!(parser.comp().unwrap(), "D");
        assert_eq!(parser.jump().unwrap(), "JGT");

        parser.advance();
        assert_eq!(parser.dest().unwrap(), "M");
        assert_eq!(parser.comp().unwrap(), "1");
        assert_eq!(parser.jump().unwrap(), "");
    }

    #[test]
    fn test_l_command_symbol() {
        let lines = clean_lines("(LOOP)");
        let mut parser = Parser::from_lines(&lines);
        parser.advance();

        assert_eq!(parser.command_type().unwrap(), CommandType::LCommand);
        assert_eq!(parser.symbol().unwrap(), "LOOP");
    }

    #[test]
    fn test_symbol_on_c_command_is_an_error() {
        let lines = clean_lines("D=M");
        let mut parser = Parser::from_lines(&lines);
        parser.advance();
        assert!(parser.symbol().is_err());
    }

    #[test]
    fn test_inner_whitespace_is_removed() {
        let lines = clean_lines("  M D = D + 1 ; J M P  ");
        let mut parser = Parser::from_lines(&lines);
        parser.advance();
        assert_eq!(parser.dest().unwrap(), "MD");
        assert_eq!(parser.comp().unwrap(), "D+1");
        assert_eq!(parser.jump().unwrap(), "JMP");
    }
}
