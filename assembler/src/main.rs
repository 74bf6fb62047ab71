//! Hack assembler command-line entry point.
//!
//! Takes exactly one path. A file is assembled on its own; a directory has
//! every `.asm` file in it assembled (non-recursive). Each `foo.asm`
//! produces a sibling `foo.hack`.

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use hack_assembler::AsmError;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.asm | directory>", args[0]);
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(path: &Path) -> Result<(), AsmError> {
    for input in collect_inputs(path)? {
        assemble_file(&input)?;
    }
    Ok(())
}

/// A file argument is taken as-is; a directory yields its `.asm` files in
/// sorted order.
fn collect_inputs(path: &Path) -> Result<Vec<PathBuf>, AsmError> {
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
                .is_some_and(|ext| ext.eq_ignore_ascii_case("asm"))
        })
        .collect();
    inputs.sort();
    Ok(inputs)
}

/// Assembles one `.asm` file into its `.hack` sibling. The output is only
/// written when the whole translation succeeded.
fn assemble_file(input: &Path) -> Result<(), AsmError> {
    let source = fs::read_to_string(input)?;
    let binary = hack_assembler::assemble(&source)?;

    let output = input.with_extension("hack");
    fs::write(&output, binary)?;
    println!("Assembled {} -> {}", input.display(), output.display());
    Ok(())
}
