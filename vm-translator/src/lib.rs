//! Hack VM translator
//!
//! Lowers the stack-based VM language into Hack assembly in a single
//! streaming pass: each command is classified by [`parser::Parser`] and
//! immediately expanded into an assembly fragment by
//! [`code_writer::CodeWriter`].
//!
//! A translation unit is either one `.vm` file or a whole directory of
//! them. Directory programs get a bootstrap prologue (`SP = 256`, then
//! `call Sys.init 0`); single files do not.
//!
//! ```rust
//! use hack_vm_translator::{translate, SourceUnit};
//!
//! let unit = SourceUnit {
//!     name: "Main".to_string(),
//!     source: "push constant 7\npush constant 8\nadd\n".to_string(),
//! };
//! let asm = translate(&[unit], false).unwrap();
//! assert!(String::from_utf8(asm).unwrap().contains("@SP"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::VmError;
pub use parser::{CommandType, Parser};

use std::io::Write;

/// One `.vm` file: its stem (used to qualify statics and generated labels)
/// and its text.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub name: String,
    pub source: String,
}

/// Translates a VM program into Hack assembly text.
///
/// `bootstrap` is set for directory translations and prepends the
/// `SP = 256; call Sys.init 0` prologue.
pub fn translate(units: &[SourceUnit], bootstrap: bool) -> Result<Vec<u8>, VmError> {
    let mut writer = CodeWriter::new(Vec::with_capacity(16 * 1024));

    if bootstrap {
        writer.write_bootstrap()?;
    }

    for unit in units {
        writer.set_file_name(&unit.name);
        translate_unit(&unit.source, &mut writer)?;
    }

    Ok(writer.into_inner())
}

/// Streams the commands of one file into the writer.
pub fn translate_unit<W: Write>(source: &str, writer: &mut CodeWriter<W>) -> Result<(), VmError> {
    let mut parser = Parser::from_source(source);

    while parser.has_more_commands() {
        parser.advance();
        let line = parser.line_number();

        match parser.command_type()? {
            CommandType::Arithmetic => writer.write_arithmetic(parser.arg1()?, line)?,
            CommandType::Push => writer.write_push(parser.arg1()?, parser.arg2()?, line)?,
            CommandType::Pop => writer.write_pop(parser.arg1()?, parser.arg2()?, line)?,
            CommandType::Label => writer.write_label(parser.arg1()?)?,
            CommandType::Goto => writer.write_goto(parser.arg1()?)?,
            CommandType::If => writer.write_if(parser.arg1()?)?,
            CommandType::Function => writer.write_function(parser.arg1()?, parser.arg2()?)?,
            CommandType::Call => writer.write_call(parser.arg1()?, parser.arg2()?)?,
            CommandType::Return => writer.write_return()?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, source: &str) -> SourceUnit {
        SourceUnit {
            name: name.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_single_file_has_no_bootstrap() {
        let asm = translate(&[unit("Main", "push constant 1\n")], false).unwrap();
        let asm = String::from_utf8(asm).unwrap();
        assert!(!asm.contains("Sys.init"));
    }

    #[test]
    fn test_directory_translation_bootstraps_once() {
        let asm = translate(
            &[
                unit("Main", "function Main.main 0\nreturn\n"),
                unit("Sys", "function Sys.init 0\n"),
            ],
            true,
        )
        .unwrap();
        let asm = String::from_utf8(asm).unwrap();
        assert!(asm.starts_with("// bootstrap\n@256\nD=A\n@SP\nM=D\n"));
        assert_eq!(asm.matches("@Sys.init\n0;JMP").count(), 1);
    }

    #[test]
    fn test_statics_are_qualified_per_file() {
        let asm = translate(
            &[
                unit("A", "push static 0\n"),
                unit("B", "pop static 0\n"),
            ],
            false,
        )
        .unwrap();
        let asm = String::from_utf8(asm).unwrap();
        assert!(asm.contains("@A.0"));
        assert!(asm.contains("@B.0"));
    }

    #[test]
    fn test_translation_error_reports_line() {
        let err = translate(&[unit("Main", "push constant 1\nbogus\n")], false).unwrap_err();
        assert!(matches!(err, VmError::UnknownCommand { line: 2, .. }));
    }

    #[test]
    fn test_generated_labels_never_collide() {
        // Two files, both heavy on comparisons, calls and flow labels
        let body = "push constant 1\npush constant 2\nlt\neq\nlabel LOOP\nif-goto LOOP\n";
        let first = format!("function First.f 0\n{body}call Second.f 0\nreturn\n");
        let second = format!("function Second.f 0\n{body}call First.f 0\nreturn\n");
        let asm = translate(
            &[unit("First", &first), unit("Second", &second)],
            true,
        )
        .unwrap();
        let asm = String::from_utf8(asm).unwrap();

        let mut labels: Vec<&str> = asm
            .lines()
            .filter(|l| l.starts_with('(') && l.ends_with(')'))
            .collect();
        let total = labels.len();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), total);
    }
}
