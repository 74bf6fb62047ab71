//! Emits VM commands, one per line, to any [`std::io::Write`] sink.

use std::io::Write;

use crate::error::JackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Argument => "argument",
            Self::Local => "local",
            Self::Static => "static",
            Self::This => "this",
            Self::That => "that",
            Self::Pointer => "pointer",
            Self::Temp => "temp",
        }
    }
}

/// VM arithmetic-logic commands, including the shift extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    ShiftLeft,
    ShiftRight,
}

impl Command {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::ShiftLeft => "shiftleft",
            Self::ShiftRight => "shiftright",
        }
    }
}

/// Stateless writer for the VM command surface.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> Result<(), JackError> {
        writeln!(self.out, "push {} {index}", segment.as_str())?;
        Ok(())
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> Result<(), JackError> {
        writeln!(self.out, "pop {} {index}", segment.as_str())?;
        Ok(())
    }

    pub fn write_arithmetic(&mut self, command: Command) -> Result<(), JackError> {
        writeln!(self.out, "{}", command.as_str())?;
        Ok(())
    }

    pub fn write_label(&mut self, label: &str) -> Result<(), JackError> {
        writeln!(self.out, "label {label}")?;
        Ok(())
    }

    pub fn write_goto(&mut self, label: &str) -> Result<(), JackError> {
        writeln!(self.out, "goto {label}")?;
        Ok(())
    }

    pub fn write_if(&mut self, label: &str) -> Result<(), JackError> {
        writeln!(self.out, "if-goto {label}")?;
        Ok(())
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> Result<(), JackError> {
        writeln!(self.out, "call {name} {n_args}")?;
        Ok(())
    }

    pub fn write_function(&mut self, name: &str, n_locals: u16) -> Result<(), JackError> {
        writeln!(self.out, "function {name} {n_locals}")?;
        Ok(())
    }

    pub fn write_return(&mut self) -> Result<(), JackError> {
        writeln!(self.out, "return")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_lines() {
        let mut writer = VmWriter::new(Vec::new());
        writer.write_function("Main.main", 2).unwrap();
        writer.write_push(Segment::Constant, 7).unwrap();
        writer.write_pop(Segment::Local, 0).unwrap();
        writer.write_arithmetic(Command::ShiftLeft).unwrap();
        writer.write_label("WHILE_EXP0").unwrap();
        writer.write_if("WHILE_END0").unwrap();
        writer.write_goto("WHILE_EXP0").unwrap();
        writer.write_call("Math.multiply", 2).unwrap();
        writer.write_return().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            text,
            "function Main.main 2\n\
             push constant 7\n\
             pop local 0\n\
             shiftleft\n\
             label WHILE_EXP0\n\
             if-goto WHILE_END0\n\
             goto WHILE_EXP0\n\
             call Math.multiply 2\n\
             return\n"
        );
    }
}
