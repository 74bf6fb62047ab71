//! VM translator command-line entry point.
//!
//! Takes exactly one path. A `foo.vm` file translates to a sibling
//! `foo.asm`. A directory translates every `.vm` file in it (non-recursive)
//! into a single bootstrapped `<Dir>/<Dir>.asm`.

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use hack_vm_translator::{translate, SourceUnit, VmError};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm | directory>", args[0]);
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(path: &Path) -> Result<(), VmError> {
    let (inputs, output, bootstrap) = plan(path)?;

    let mut units = Vec::with_capacity(inputs.len());
    for input in &inputs {
        units.push(SourceUnit {
            name: stem(input),
            source: fs::read_to_string(input)?,
        });
    }

    let asm = translate(&units, bootstrap)?;
    fs::write(&output, asm)?;
    println!("Translated {} -> {}", path.display(), output.display());
    Ok(())
}

/// Decides the input set, the output file and whether to bootstrap.
fn plan(path: &Path) -> Result<(Vec<PathBuf>, PathBuf, bool), VmError> {
    if !path.is_dir() {
        return Ok((vec![path.to_path_buf()], path.with_extension("asm"), false));
    }

    let mut inputs: Vec<PathBuf> = fs::read_dir(path)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("vm"))
        })
        .collect();
    inputs.sort();

    let dir_name = stem(path);
    let output = path.join(format!("{dir_name}.asm"));
    Ok((inputs, output, true))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Out")
        .to_string()
}
