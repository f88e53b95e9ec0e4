//! Generate CATALOGUE.md from the reference catalogue.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-catalogue
//! ```
//!
//! The generated file is written to `CATALOGUE.md` at the workspace root.

use std::fs;
use std::path::Path;

use abacus_core::{catalogue, docs, Registry};

fn main() {
    println!("Generating CATALOGUE.md...");

    let registry = Registry::new();
    if let Err(e) = catalogue::register_all(&registry) {
        eprintln!("Error building catalogue: {}", e);
        std::process::exit(1);
    }

    let markdown = docs::catalogue_markdown(&registry);
    let output_path = Path::new("CATALOGUE.md");

    match fs::write(output_path, &markdown) {
        Ok(()) => {
            println!("Successfully wrote {} bytes to {}", markdown.len(), output_path.display());
        }
        Err(e) => {
            eprintln!("Error writing file: {}", e);
            std::process::exit(1);
        }
    }
}
