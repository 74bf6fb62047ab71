//! Jack compiler
//!
//! Compiles the Jack language (the object-oriented layer of the Hack
//! platform) down to VM commands in two cooperating stages:
//! - [`tokenizer`]: character stream to token stream, with single-token
//!   lookahead
//! - [`engine`]: token stream to VM commands, syntax-directed (no syntax
//!   tree), driven by the two-tier [`symbol_table`] and emitting through
//!   [`vm_writer`]
//!
//! The [`xml`] module carries the two debug surfaces: a flat token-stream
//! dump and a nested parse-tree dump.
//!
//! # Example
//!
//! ```rust
//! let vm = jack_compiler::compile_to_vm(
//!     "class Main { function void main() { return; } }",
//! )
//! .unwrap();
//! let text = String::from_utf8(vm).unwrap();
//! assert_eq!(text, "function Main.main 0\npush constant 0\nreturn\n");
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;
pub mod vm_writer;
pub mod xml;

pub use engine::CompilationEngine;
pub use error::JackError;
pub use symbol_table::{Kind, SymbolTable};
pub use token::{Keyword, Token};
pub use tokenizer::Tokenizer;
pub use vm_writer::{Command, Segment, VmWriter};

/// Compiles one Jack class into its VM translation.
pub fn compile_to_vm(source: &str) -> Result<Vec<u8>, JackError> {
    CompilationEngine::compile(source, Vec::with_capacity(4 * 1024))
}
