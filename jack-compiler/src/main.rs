//! Jack compiler command-line entry point.
//!
//! Takes exactly one path. A `Foo.jack` file compiles to a sibling
//! `Foo.vm`; a directory compiles every `.jack` file in it
//! (non-recursive), one `.vm` per class.

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use jack_compiler::JackError;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack | directory>", args[0]);
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(path: &Path) -> Result<(), JackError> {
    for input in collect_inputs(path)? {
        compile_file(&input)?;
    }
    Ok(())
}

fn collect_inputs(path: &Path) -> Result<Vec<PathBuf>, JackError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut inputs: Vec<PathBuf> = fs::read_dir(path)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("jack"))
        })
        .collect();
    inputs.sort();
    Ok(inputs)
}

/// Compiles one class file; the `.vm` output is only written when the
/// whole compilation succeeded.
fn compile_file(input: &Path) -> Result<(), JackError> {
    let source = fs::read_to_string(input)?;
    let vm = jack_compiler::compile_to_vm(&source)?;

    let output = input.with_extension("vm");
    fs::write(&output, vm)?;
    println!("Compiled {} -> {}", input.display(), output.display());
    Ok(())
}
